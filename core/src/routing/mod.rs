pub mod deriver;
pub mod matcher;
pub mod parser;
pub mod types;

pub use deriver::{derive_base_path, derive_operation_path, derive_routes};
pub use matcher::{match_path, RouteTable};
pub use parser::{join_paths, parse_http_method, parse_route_pattern};
pub use types::{
    handler, middleware, Convention, Handler, HttpMethod, Middleware, RouteDescriptor, RouteMatch,
    RouteTemplate, Segment,
};

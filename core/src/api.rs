pub use crate::app::{Application, ApplicationBuilder};
pub use crate::controller::{controller_name, Controller, Operation, OperationFn};
pub use crate::dependencies::{Constructor, Lifetime, Resolution, ScopeContext, ServiceKey, ServiceRegistry};
pub use crate::dispatch::{authorize, chain, dispatch};
pub use crate::errors::{error_codes, CometError};
pub use crate::group::RouteGroup;
pub use crate::request::HttpRequest;
pub use crate::response::{HttpResponse, ResponseBody};
pub use crate::routing::{handler, middleware, Handler, HttpMethod, Middleware};
pub use crate::security::{
    jwt_authentication, require_claim, require_role, Claims, Policy, PolicyConfig,
};

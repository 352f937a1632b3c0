pub mod parser;
pub mod types;

pub use parser::{parse_form_body, parse_json_body, parse_query_string, validate_body_size, MAX_BODY_SIZE};
pub use types::HttpRequest;

pub mod serializer;
pub mod types;

pub use serializer::{
    create_response, into_wire_parts, serialize_json_response, serialize_response_body, CONTENT_TYPE,
};
pub use types::{HttpResponse, ResponseBody, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE};

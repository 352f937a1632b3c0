use crate::errors::CometError;
use crate::response::serializer::create_response;
use serde::Serialize;
use std::collections::HashMap;

pub const NOT_FOUND_MESSAGE: &str = "resource not found";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl HttpResponse {
    /// JSON response with `status` and `data` as payload.
    ///
    /// A payload that cannot be represented as JSON turns into a 500.
    pub fn json<T: Serialize>(status: u16, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => create_response(status, ResponseBody::Json(value)),
            Err(err) => {
                log::error!("Failed to serialize response payload: {}", err);
                create_response(500, ResponseBody::Json(serde_json::Value::String(err.to_string())))
            }
        }
    }

    pub fn ok<T: Serialize>(data: T) -> Self {
        Self::json(200, data)
    }

    pub fn created<T: Serialize>(data: T) -> Self {
        Self::json(201, data)
    }

    pub fn bad_request<T: Serialize>(data: T) -> Self {
        Self::json(400, data)
    }

    pub fn unauthorized() -> Self {
        Self::json(401, UNAUTHORIZED_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::json(404, NOT_FOUND_MESSAGE)
    }

    pub fn error<T: Serialize>(data: T) -> Self {
        Self::json(500, data)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl From<CometError> for HttpResponse {
    fn from(err: CometError) -> Self {
        match err.status_code() {
            404 => Self::not_found(),
            401 => Self::unauthorized(),
            status => Self::json(status, err.to_string()),
        }
    }
}

//! Conversion between hyper messages and comet requests/responses.

use comet::errors::{error_codes, CometError};
use comet::request::{validate_body_size, HttpRequest};
use comet::response::{into_wire_parts, HttpResponse};
use comet::routing::HttpMethod;
use comet::Application;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use serde_json::json;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};

const FALLBACK: &[u8] = b"{\"error\":\"internal server error\"}";

/// Builds the request handed to [`Application::handle`].
pub fn into_comet_request(
    parts: &Parts,
    body: Vec<u8>,
    remote: Option<SocketAddr>,
    max_body_size: usize,
) -> Result<HttpRequest, CometError> {
    validate_body_size(&body, max_body_size)?;

    let method: HttpMethod = parts.method.as_str().parse()?;
    let mut request = HttpRequest::new(method, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        request = request.with_query(query);
    }

    for (name, value) in parts.headers.iter() {
        let Ok(value) = value.to_str() else {
            log::debug!("Dropping non-UTF-8 header {}", name);
            continue;
        };
        let combined = match request.header(name.as_str()) {
            Some(previous) => format!("{}, {}", previous, value),
            None => value.to_string(),
        };
        request = request.with_header(name.as_str(), combined);
    }

    if let Some(remote) = remote {
        request = request.with_remote_address(remote.to_string());
    }
    Ok(request.with_body(body))
}

/// Runs the application, turning a panic into a 500.
pub fn dispatch(app: &Application, request: HttpRequest) -> HttpResponse {
    let label = format!("{} {}", request.method, request.path);
    match catch_unwind(AssertUnwindSafe(|| app.handle(request))) {
        Ok(response) => response,
        Err(_) => {
            log::error!("Handler panicked while serving {}", label);
            internal_error()
        }
    }
}

pub fn internal_error() -> HttpResponse {
    HttpResponse::json(500, json!({"error": "internal server error"}))
}

pub fn into_hyper_response(response: HttpResponse) -> Response<Full<Bytes>> {
    let (status, headers, payload) = into_wire_parts(response);

    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => log::warn!("Dropping invalid response header {}", name),
        }
    }

    builder.body(Full::new(Bytes::from(payload))).unwrap_or_else(|e| {
        log::error!("Failed to build response: {}", e);
        fallback_response()
    })
}

/// Error response for requests that never reach the application.
pub fn rejection(err: CometError) -> Response<Full<Bytes>> {
    log::debug!("Rejected request: {}", err);
    into_hyper_response(HttpResponse::from(err))
}

pub fn body_too_large(limit: usize) -> CometError {
    CometError::validation(
        error_codes::BODY_TOO_LARGE,
        format!("Body exceeds limit {}", limit),
    )
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(FALLBACK)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

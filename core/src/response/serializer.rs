use crate::response::types::{HttpResponse, ResponseBody};
use std::collections::HashMap;

pub const CONTENT_TYPE: &str = "Content-Type";

pub fn serialize_json_response(value: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

pub fn create_response(status: u16, body: ResponseBody) -> HttpResponse {
    let mut headers = HashMap::new();
    if let Some(content_type) = content_type(&body) {
        headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
    }

    HttpResponse {
        status_code: status,
        headers,
        body,
    }
}

fn content_type(body: &ResponseBody) -> Option<&'static str> {
    match body {
        ResponseBody::Json(_) => Some("application/json"),
        ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
        ResponseBody::Binary(_) => Some("application/octet-stream"),
        ResponseBody::Empty => None,
    }
}

pub fn serialize_response_body(body: &ResponseBody) -> Vec<u8> {
    match body {
        ResponseBody::Empty => vec![],
        ResponseBody::Json(value) => serialize_json_response(value),
        ResponseBody::Text(text) => text.as_bytes().to_vec(),
        ResponseBody::Binary(data) => data.clone(),
    }
}

/// Splits a response into the (status, headers, payload) triple handed to
/// the transport.
pub fn into_wire_parts(response: HttpResponse) -> (u16, Vec<(String, String)>, Vec<u8>) {
    let payload = serialize_response_body(&response.body);
    let mut headers: Vec<(String, String)> = response.headers.into_iter().collect();
    headers.sort();
    (response.status_code, headers, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_json_response() {
        let response = create_response(200, ResponseBody::Json(json!({"status": "ok"})));

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get(CONTENT_TYPE),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_into_wire_parts() {
        let response = create_response(404, ResponseBody::Json(json!("resource not found")))
            .with_header("X-Request-ID", "7");
        let (status, headers, payload) = into_wire_parts(response);

        assert_eq!(status, 404);
        assert_eq!(payload, br#""resource not found""#);
        assert_eq!(headers.len(), 2);
        assert!(headers.contains(&("X-Request-ID".to_string(), "7".to_string())));
    }
}

use crate::errors::{error_codes, CometError};
use std::collections::HashMap;

/// Default request body limit (10MB).
pub const MAX_BODY_SIZE: usize = 10_485_760;

pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => Some((
                    urlencoding::decode(key).ok()?.into_owned(),
                    urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned(),
                )),
                _ => None,
            }
        })
        .collect()
}

pub fn parse_json_body(data: &[u8]) -> Result<serde_json::Value, CometError> {
    serde_json::from_slice(data).map_err(|e| {
        CometError::validation(error_codes::INVALID_JSON, format!("Invalid JSON: {}", e))
    })
}

pub fn parse_form_body(data: &[u8]) -> Result<HashMap<String, String>, CometError> {
    let body_str = std::str::from_utf8(data).map_err(|e| {
        CometError::validation(
            error_codes::INVALID_UTF8,
            format!("Invalid UTF-8 in form body: {}", e),
        )
    })?;

    Ok(parse_query_string(body_str))
}

pub fn validate_body_size(data: &[u8], max_size: usize) -> Result<(), CometError> {
    if data.len() > max_size {
        return Err(CometError::validation(
            error_codes::BODY_TOO_LARGE,
            format!("Body size {} exceeds limit {}", data.len(), max_size),
        ));
    }
    Ok(())
}

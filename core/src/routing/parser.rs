use crate::errors::{error_codes, CometError};
use crate::routing::types::{HttpMethod, RouteTemplate, Segment, PARAM_MARKER};

/// Parses a `/literal/:param` template.
///
/// The pattern keeps its exact text; splitting happens on `/` so the
/// leading empty segment is part of the template like it is part of
/// every request path.
pub fn parse_route_pattern(pattern: &str) -> Result<RouteTemplate, CometError> {
    if !pattern.starts_with('/') {
        return Err(CometError::registration(
            error_codes::INVALID_ROUTE_PATTERN,
            format!("Route pattern '{}' must start with '/'", pattern),
        ));
    }

    let mut segments = Vec::new();
    let mut param_names: Vec<String> = Vec::new();

    for part in pattern.split('/') {
        match part.strip_prefix(PARAM_MARKER) {
            Some(name) => {
                if name.is_empty() {
                    return Err(CometError::registration(
                        error_codes::INVALID_ROUTE_PATTERN,
                        format!("Unnamed parameter in route pattern '{}'", pattern),
                    ));
                }
                if param_names.iter().any(|existing| existing == name) {
                    return Err(CometError::registration(
                        error_codes::INVALID_ROUTE_PATTERN,
                        format!("Duplicate parameter '{}' in route pattern '{}'", name, pattern),
                    ));
                }
                param_names.push(name.to_string());
                segments.push(Segment::Param(name.to_string()));
            }
            None => segments.push(Segment::Literal(part.to_string())),
        }
    }

    Ok(RouteTemplate {
        pattern: pattern.to_string(),
        segments,
        param_names,
    })
}

/// Joins a base path and a relative route path.
pub fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let joined = match (base.is_empty(), path.is_empty()) {
        (true, true) => String::from("/"),
        (true, false) if path.starts_with('/') => path.to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => base.to_string(),
        (false, false) if path.starts_with('/') => format!("{}{}", base, path),
        (false, false) => format!("{}/{}", base, path),
    };

    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}

pub fn parse_http_method(method: &str) -> Result<HttpMethod, CometError> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(HttpMethod::GET),
        "POST" => Ok(HttpMethod::POST),
        "PUT" => Ok(HttpMethod::PUT),
        "DELETE" => Ok(HttpMethod::DELETE),
        "PATCH" => Ok(HttpMethod::PATCH),
        "HEAD" => Ok(HttpMethod::HEAD),
        "OPTIONS" => Ok(HttpMethod::OPTIONS),
        "TRACE" => Ok(HttpMethod::TRACE),
        _ => Err(CometError::validation(
            error_codes::INVALID_HTTP_METHOD,
            format!("Invalid HTTP method: {}", method),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_pattern() {
        let template = parse_route_pattern("/person").unwrap();
        assert!(!template.is_dynamic());
        assert_eq!(
            template.segments(),
            &[Segment::Literal(String::new()), Segment::Literal("person".to_string())]
        );
    }

    #[test]
    fn test_param_names_match_marker_segments() {
        let template = parse_route_pattern("/person/:id/orders/:order").unwrap();
        assert!(template.is_dynamic());
        assert_eq!(template.param_names(), &["id".to_string(), "order".to_string()]);

        let markers = template
            .segments()
            .iter()
            .filter(|segment| matches!(segment, Segment::Param(_)))
            .count();
        assert_eq!(markers, template.param_names().len());
    }

    #[test]
    fn test_rejects_malformed_patterns() {
        assert!(parse_route_pattern("person").is_err());
        assert!(parse_route_pattern("/person/:").is_err());
        assert!(parse_route_pattern("/person/:id/:id").is_err());
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/person", ""), "/person");
        assert_eq!(join_paths("/person", "/:id"), "/person/:id");
        assert_eq!(join_paths("/person/", "history"), "/person/history");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("", "health"), "/health");
        assert_eq!(join_paths("api", "/health"), "/api/health");
    }

    #[test]
    fn test_parse_http_method() {
        assert_eq!(parse_http_method("get").unwrap(), HttpMethod::GET);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::PATCH);
        assert!(parse_http_method("FETCH").is_err());
    }
}

use crate::dependencies::{ScopeContext, ServiceKey, ServiceRegistry};
use crate::errors::CometError;
use crate::request::parser::{parse_form_body, parse_json_body, parse_query_string};
use crate::routing::HttpMethod;
use crate::security::Claims;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Inbound request as seen by handlers.
///
/// Header names are stored lower-cased. The request also carries the
/// scope of its dispatch, so every resolution made while handling it
/// shares one set of scoped instances.
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub body: Vec<u8>,
    pub user_agent: Option<String>,
    pub remote_address: Option<String>,
    claims: Option<Claims>,
    scope: Option<RequestScope>,
}

/// Registry and scoped cache attached for one dispatch.
struct RequestScope {
    services: Arc<ServiceRegistry>,
    context: ScopeContext,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            path_params: HashMap::new(),
            body: Vec::new(),
            user_agent: None,
            remote_address: None,
            claims: None,
            scope: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "user-agent" {
            self.user_agent = Some(value.clone());
        }
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query_params.extend(parse_query_string(query));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_address(mut self, address: impl Into<String>) -> Self {
        self.remote_address = Some(address.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn set_claims(&mut self, claims: Claims) {
        self.claims = Some(claims);
    }

    /// The dispatch scope, once the request has entered one.
    pub fn scope(&self) -> Option<&ScopeContext> {
        self.scope.as_ref().map(|scope| &scope.context)
    }

    /// Starts the dispatch scope: fresh scoped cache, shared registry.
    pub(crate) fn enter_scope(&mut self, services: Arc<ServiceRegistry>) {
        self.scope = Some(RequestScope {
            services,
            context: ScopeContext::new(),
        });
    }

    pub fn resolve<T>(&mut self) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_keyed::<T>(ServiceKey::Unkeyed)
    }

    pub fn resolve_keyed<T>(&mut self, key: impl Into<ServiceKey>) -> Result<Arc<T>, CometError>
    where
        T: Send + Sync + 'static,
    {
        let key = key.into();
        match self.scope.as_mut() {
            Some(RequestScope { services, context }) => services.resolve_keyed::<T>(key, context),
            None => Err(CometError::DependencyNotFound {
                type_name: std::any::type_name::<T>(),
                key,
            }),
        }
    }

    /// Deserializes the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CometError> {
        let value = parse_json_body(&self.body)?;
        serde_json::from_value(value).map_err(|e| {
            CometError::validation(
                crate::errors::error_codes::INVALID_JSON,
                format!("Invalid JSON: {}", e),
            )
        })
    }

    pub fn form(&self) -> Result<HashMap<String, String>, CometError> {
        parse_form_body(&self.body)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_params", &self.query_params)
            .field("path_params", &self.path_params)
            .field("body_len", &self.body.len())
            .field("scope", &self.scope().map(ScopeContext::id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = HttpRequest::new(HttpMethod::GET, "/")
            .with_header("Authorization", "Bearer abc")
            .with_header("User-Agent", "curl/8.0");

        assert_eq!(request.header("authorization"), Some("Bearer abc"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer abc"));
        assert_eq!(request.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_query_parameters() {
        let request = HttpRequest::new(HttpMethod::GET, "/person").with_query("page=2&q=Ada%20L");
        assert_eq!(request.query("page"), Some("2"));
        assert_eq!(request.query("q"), Some("Ada L"));
    }

    #[test]
    fn test_json_body() {
        #[derive(Deserialize)]
        struct NewPerson {
            name: String,
        }

        let request =
            HttpRequest::new(HttpMethod::POST, "/person").with_body(br#"{"name":"Ada"}"#.to_vec());
        let person: NewPerson = request.json().unwrap();
        assert_eq!(person.name, "Ada");

        let malformed = HttpRequest::new(HttpMethod::POST, "/person").with_body("{name".as_bytes());
        match malformed.json::<NewPerson>() {
            Err(err) => assert_eq!(err.status_code(), 400),
            Ok(_) => panic!("Expected validation failure"),
        }
    }

    #[test]
    fn test_resolve_without_registry_is_not_found() {
        let mut request = HttpRequest::new(HttpMethod::GET, "/");
        assert!(matches!(
            request.resolve::<String>(),
            Err(CometError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn test_scoped_resolution_shares_request_scope() {
        let registry = Arc::new(ServiceRegistry::new());
        registry.register_scoped(|| String::from("per request")).unwrap();

        let mut request = HttpRequest::new(HttpMethod::GET, "/");
        request.enter_scope(Arc::clone(&registry));
        let a = request.resolve::<String>().unwrap();
        let b = request.resolve::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(request.scope().map(ScopeContext::len), Some(1));
    }

    #[test]
    fn test_scope_opens_only_on_dispatch() {
        let registry = Arc::new(ServiceRegistry::new());
        let mut request = HttpRequest::new(HttpMethod::GET, "/");
        assert!(request.scope().is_none());

        let before = ScopeContext::new().id();
        request.enter_scope(Arc::clone(&registry));
        let entered = request.scope().map(ScopeContext::id).unwrap();
        assert!(entered > before);

        request.enter_scope(registry);
        assert_ne!(request.scope().map(ScopeContext::id), Some(entered));
    }
}

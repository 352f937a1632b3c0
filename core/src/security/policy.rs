use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::{handler, Handler};
use crate::security::session::authenticate;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key under which a policy applies to every operation of a controller.
pub const WILDCARD: &str = "*";

pub type Validation = Arc<dyn Fn(Handler, &str) -> Handler + Send + Sync>;

/// An authorization check parameterized by a comparison value.
#[derive(Clone)]
pub struct Policy {
    value: String,
    validation: Validation,
}

impl Policy {
    pub fn new<F>(value: impl Into<String>, validation: F) -> Self
    where
        F: Fn(Handler, &str) -> Handler + Send + Sync + 'static,
    {
        Self {
            value: value.into(),
            validation: Arc::new(validation),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Wraps `next` with this policy's check.
    pub fn apply(&self, next: Handler) -> Handler {
        (self.validation)(next, &self.value)
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy").field("value", &self.value).finish()
    }
}

/// Policies of a controller keyed by operation name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    entries: BTreeMap<String, Vec<Policy>>,
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `policy` to every operation.
    pub fn global(self, policy: Policy) -> Self {
        self.operation(WILDCARD, policy)
    }

    pub fn operation(mut self, name: impl Into<String>, policy: Policy) -> Self {
        self.entries.entry(name.into()).or_default().push(policy);
        self
    }

    pub fn get(&self, name: &str) -> &[Policy] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Wildcard policies followed by the operation's own.
    pub fn resolve(&self, operation: &str) -> Vec<Policy> {
        let mut policies = self.get(WILDCARD).to_vec();
        if operation != WILDCARD {
            policies.extend_from_slice(self.get(operation));
        }
        policies
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

/// Admits requests whose claims carry `role`.
pub fn require_role(role: impl Into<String>) -> Policy {
    Policy::new(role, |next, role| {
        let role = role.to_string();
        guarded(next, move |req| match authenticate(req) {
            Ok(claims) if claims.has_role(&role) => true,
            Ok(_) => {
                log::debug!("Denied {} {}: role {} required", req.method, req.path, role);
                false
            }
            Err(err) => {
                log::debug!("Denied {} {}: {}", req.method, req.path, err);
                false
            }
        })
    })
}

/// Admits requests whose claim `name` equals the policy value.
pub fn require_claim(name: impl Into<String>, value: impl Into<String>) -> Policy {
    let name = name.into();
    Policy::new(value, move |next, expected| {
        let name = name.clone();
        let expected = expected.to_string();
        guarded(next, move |req| match authenticate(req) {
            Ok(claims) => claims.get_str(&name) == Some(expected.as_str()),
            Err(_) => false,
        })
    })
}

fn guarded<F>(next: Handler, admit: F) -> Handler
where
    F: Fn(&mut HttpRequest) -> bool + Send + Sync + 'static,
{
    handler(move |req| {
        if admit(req) {
            next(req)
        } else {
            HttpResponse::unauthorized()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HttpMethod;
    use crate::security::Claims;
    use serde_json::json;

    fn echo() -> Handler {
        handler(|_| HttpResponse::ok("through"))
    }

    #[test]
    fn test_resolve_puts_wildcard_first() {
        let config = PolicyConfig::new()
            .operation("GetById", require_role("admin"))
            .global(require_role("user"));

        let values: Vec<String> = config
            .resolve("GetById")
            .iter()
            .map(|p| p.value().to_string())
            .collect();
        assert_eq!(values, vec!["user", "admin"]);
        assert_eq!(config.resolve("List").len(), 1);
        assert!(PolicyConfig::new().is_empty());
    }

    #[test]
    fn test_require_role() {
        let guarded = require_role("admin").apply(echo());

        let mut anonymous = HttpRequest::new(HttpMethod::GET, "/");
        assert_eq!(guarded(&mut anonymous).status_code, 401);

        let mut user = HttpRequest::new(HttpMethod::GET, "/");
        user.set_claims(Claims::new().with("roles", json!(["user"])));
        assert_eq!(guarded(&mut user).status_code, 401);

        let mut admin = HttpRequest::new(HttpMethod::GET, "/");
        admin.set_claims(Claims::new().with("roles", json!(["user", "admin"])));
        assert_eq!(guarded(&mut admin).status_code, 200);
    }

    #[test]
    fn test_require_claim() {
        let guarded = require_claim("tenant", "acme").apply(echo());

        let mut other = HttpRequest::new(HttpMethod::GET, "/");
        other.set_claims(Claims::new().with("tenant", "globex"));
        assert_eq!(guarded(&mut other).status_code, 401);

        let mut acme = HttpRequest::new(HttpMethod::GET, "/");
        acme.set_claims(Claims::new().with("tenant", "acme"));
        assert_eq!(guarded(&mut acme).status_code, 200);
    }
}

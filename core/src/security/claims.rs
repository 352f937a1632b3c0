use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CLAIM_AUDIENCE: &str = "aud";
pub const CLAIM_EXPIRES_AT: &str = "exp";
pub const CLAIM_ID: &str = "jti";
pub const CLAIM_ISSUED_AT: &str = "iat";
pub const CLAIM_ISSUER: &str = "iss";
pub const CLAIM_NOT_BEFORE: &str = "nbf";
pub const CLAIM_SUBJECT: &str = "sub";
pub const CLAIM_SESSION_ID: &str = "sid";
pub const CLAIM_ROLES: &str = "roles";

/// Token claims as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Numeric claim as whole seconds.
    pub fn get_timestamp(&self, name: &str) -> Option<i64> {
        let value = self.get(name)?;
        value.as_i64().or_else(|| value.as_f64().map(|v| v as i64))
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str(CLAIM_SUBJECT)
    }

    /// Roles from the `roles` claim, either an array or a single string.
    pub fn roles(&self) -> Vec<&str> {
        match self.get(CLAIM_ROLES) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(role)) => vec![role.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| *r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_accept_array_or_string() {
        let many = Claims::new().with(CLAIM_ROLES, json!(["user", "admin"]));
        assert!(many.has_role("admin"));
        assert!(!many.has_role("owner"));

        let single = Claims::new().with(CLAIM_ROLES, "user");
        assert_eq!(single.roles(), vec!["user"]);

        assert!(Claims::new().roles().is_empty());
    }

    #[test]
    fn test_timestamps_accept_floats() {
        let claims = Claims::new()
            .with(CLAIM_EXPIRES_AT, 1_700_000_000)
            .with(CLAIM_NOT_BEFORE, 1_600_000_000.0);
        assert_eq!(claims.get_timestamp(CLAIM_EXPIRES_AT), Some(1_700_000_000));
        assert_eq!(claims.get_timestamp(CLAIM_NOT_BEFORE), Some(1_600_000_000));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let claims = Claims::new().with(CLAIM_SUBJECT, "42");
        assert_eq!(serde_json::to_value(&claims).unwrap(), json!({"sub": "42"}));
        assert_eq!(claims.subject(), Some("42"));
    }
}

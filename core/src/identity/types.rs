use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    /// Seconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
    pub roles: Vec<Role>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|role| role.name.as_str()).collect()
    }
}

/// Password rules enforced by `UserManager::set_password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub minimum_chars: usize,
    pub need_uppercase: bool,
    pub need_lowercase: bool,
    pub need_digits: bool,
    pub need_special_chars: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            minimum_chars: 8,
            need_uppercase: false,
            need_lowercase: false,
            need_digits: false,
            need_special_chars: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub password: PasswordConfig,
    /// New users start inactive until activated.
    pub needs_activation: bool,
}

/// Outcome of a user-management operation with every failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub errors: Vec<String>,
}

impl OperationResult {
    pub fn success() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failure<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            success: false,
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let mut user = User::new("ada", "ada@example.com");
        user.password_hash = "secret".to_string();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "ada@example.com");
    }

    #[test]
    fn test_operation_result() {
        assert!(OperationResult::success().is_success());
        let failed = OperationResult::failure(["too short", "needs a digit"]);
        assert!(!failed.is_success());
        assert_eq!(failed.errors.len(), 2);
    }
}

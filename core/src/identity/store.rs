use crate::errors::{error_codes, CometError};
use crate::identity::types::User;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence boundary for users.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<(), CometError>;

    fn find_by_id(&self, id: &str) -> Option<User>;

    fn find_by_email(&self, email: &str) -> Option<User>;

    /// Overwrites a stored user.
    fn save(&self, user: &User) -> Result<(), CometError>;
}

pub type DynUserStore = Box<dyn UserStore>;

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, user: User) -> Result<(), CometError> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(CometError::validation(
                error_codes::USER_EXISTS,
                format!("User {} already exists", user.id),
            ));
        }
        if users.values().any(|existing| existing.email == user.email) {
            return Err(CometError::validation(
                error_codes::USER_EXISTS,
                format!("Email {} is already taken", user.email),
            ));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    fn save(&self, user: &User) -> Result<(), CometError> {
        match self.users.write().get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(CometError::validation(
                error_codes::USER_NOT_FOUND,
                format!("User {} does not exist", user.id),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            ..User::new(id, email)
        }
    }

    #[test]
    fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        store.insert(user("1", "ada@example.com")).unwrap();

        assert_eq!(store.find_by_id("1").unwrap().email, "ada@example.com");
        assert_eq!(store.find_by_email("ada@example.com").unwrap().id, "1");
        assert!(store.find_by_id("2").is_none());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(user("1", "ada@example.com")).unwrap();
        assert!(store.insert(user("1", "other@example.com")).is_err());
        assert!(store.insert(user("2", "ada@example.com")).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_requires_existing_user() {
        let store = InMemoryUserStore::new();
        let mut ada = user("1", "ada@example.com");
        assert!(store.save(&ada).is_err());

        store.insert(ada.clone()).unwrap();
        ada.is_active = true;
        store.save(&ada).unwrap();
        assert!(store.find_by_id("1").unwrap().is_active);
    }
}

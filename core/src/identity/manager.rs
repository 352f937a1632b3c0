use crate::identity::store::DynUserStore;
use crate::identity::types::{OperationResult, PasswordConfig, Role, User, UserConfig};
use crate::errors::CometError;
use crate::security::jwt::unix_now;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared by every manager. Ids the store already holds are skipped.
static NEXT_USER_ID: AtomicU64 = AtomicU64::new(1);

/// User management surface consumed by the session layer.
pub trait UserManager: Send + Sync {
    /// Stores a new user, assigning an id when it has none.
    fn create(&self, user: &mut User) -> OperationResult;

    fn get_by_email(&self, email: &str) -> Option<User>;

    fn get_by_id(&self, id: &str) -> Option<User>;

    fn set_password(&self, user: &mut User, password: &str) -> OperationResult;

    fn check_password(&self, user: &User, password: &str) -> bool;

    fn add_role(&self, user: &mut User, roles: &[Role]) -> OperationResult;

    fn remove_role(&self, user: &mut User, roles: &[Role]) -> OperationResult;
}

pub type DynUserManager = Box<dyn UserManager>;

pub struct DefaultUserManager {
    config: Arc<UserConfig>,
    store: Arc<DynUserStore>,
}

impl DefaultUserManager {
    pub fn new(config: Arc<UserConfig>, store: Arc<DynUserStore>) -> Self {
        Self { config, store }
    }

    fn next_free_id(&self) -> String {
        loop {
            let id = NEXT_USER_ID.fetch_add(1, Ordering::Relaxed).to_string();
            if self.store.find_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self, user: &mut User) -> OperationResult {
        user.updated_at = unix_now();
        match self.store.save(user) {
            Ok(()) => OperationResult::success(),
            Err(err) => OperationResult::failure([err.to_string()]),
        }
    }
}

impl UserManager for DefaultUserManager {
    fn create(&self, user: &mut User) -> OperationResult {
        if user.id.is_empty() {
            user.id = self.next_free_id();
        }
        let now = unix_now();
        user.created_at = now;
        user.updated_at = now;
        user.is_active = !self.config.needs_activation;

        match self.store.insert(user.clone()) {
            Ok(()) => {
                log::debug!("Created user {}", user.id);
                OperationResult::success()
            }
            Err(err) => OperationResult::failure([err.to_string()]),
        }
    }

    fn get_by_email(&self, email: &str) -> Option<User> {
        self.store.find_by_email(email)
    }

    fn get_by_id(&self, id: &str) -> Option<User> {
        self.store.find_by_id(id)
    }

    fn set_password(&self, user: &mut User, password: &str) -> OperationResult {
        let errors = validate_password(&self.config.password, password);
        if !errors.is_empty() {
            return OperationResult::failure(errors);
        }

        user.password_hash = match hash_password(password) {
            Ok(hash) => hash,
            Err(err) => return OperationResult::failure([err.to_string()]),
        };
        if user.id.is_empty() {
            return OperationResult::success();
        }
        self.persist(user)
    }

    fn check_password(&self, user: &User, password: &str) -> bool {
        verify_password(password, &user.password_hash)
    }

    fn add_role(&self, user: &mut User, roles: &[Role]) -> OperationResult {
        if user.id.is_empty() {
            return OperationResult::failure(["user does not exist"]);
        }
        for role in roles {
            if !user.roles.iter().any(|existing| existing.id == role.id) {
                user.roles.push(role.clone());
            }
        }
        self.persist(user)
    }

    fn remove_role(&self, user: &mut User, roles: &[Role]) -> OperationResult {
        if user.id.is_empty() {
            return OperationResult::failure(["user does not exist"]);
        }
        user.roles
            .retain(|existing| !roles.iter().any(|role| role.id == existing.id));
        self.persist(user)
    }
}

/// Argon2 PHC string of `password` under a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CometError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CometError::Fault {
            message: format!("Password hashing failed: {}", e),
        })
}

/// False for a wrong password and for anything that is not a PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Every rule of `config` that `password` breaks.
pub fn validate_password(config: &PasswordConfig, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.chars().count() < config.minimum_chars {
        errors.push(format!(
            "password must have at least {} characters",
            config.minimum_chars
        ));
    }
    if config.need_digits && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password must have at least one digit".to_string());
    }
    if config.need_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password must have at least a lower case letter".to_string());
    }
    if config.need_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password must have at least an upper case letter".to_string());
    }
    if config.need_special_chars && password.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("password must have at least a special character".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::store::InMemoryUserStore;

    fn manager(config: UserConfig) -> DefaultUserManager {
        let store: DynUserStore = Box::new(InMemoryUserStore::new());
        DefaultUserManager::new(Arc::new(config), Arc::new(store))
    }

    fn strict() -> UserConfig {
        UserConfig {
            password: PasswordConfig {
                minimum_chars: 10,
                need_uppercase: true,
                need_lowercase: true,
                need_digits: true,
                need_special_chars: true,
            },
            needs_activation: true,
        }
    }

    #[test]
    fn test_create_assigns_id_and_activation() {
        let users = manager(strict());
        let mut ada = User::new("ada", "ada@example.com");
        assert!(users.create(&mut ada).is_success());
        assert!(!ada.id.is_empty());
        assert!(!ada.is_active);

        assert_eq!(users.get_by_email("ada@example.com").unwrap().id, ada.id);
        assert!(users.get_by_id(&ada.id).is_some());

        let mut twin = User::new("ada2", "ada@example.com");
        assert!(!users.create(&mut twin).is_success());
    }

    #[test]
    fn test_password_rules_report_every_failure() {
        let errors = validate_password(&strict().password, "abc");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("10"));
        assert!(validate_password(&strict().password, "Str0ng!Password").is_empty());
    }

    #[test]
    fn test_set_and_check_password() {
        let users = manager(UserConfig::default());
        let mut ada = User::new("ada", "ada@example.com");
        users.create(&mut ada);

        assert!(!users.set_password(&mut ada, "short").is_success());
        assert!(users.set_password(&mut ada, "long enough").is_success());
        assert!(users.check_password(&ada, "long enough"));
        assert!(!users.check_password(&ada, "wrong"));

        let stored = users.get_by_id(&ada.id).unwrap();
        assert_eq!(stored.password_hash, ada.password_hash);
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn test_roles() {
        let users = manager(UserConfig::default());
        let admin = Role::new("r1", "admin");
        let editor = Role::new("r2", "editor");

        let mut detached = User::new("ghost", "ghost@example.com");
        assert!(!users.add_role(&mut detached, &[admin.clone()]).is_success());

        let mut ada = User::new("ada", "ada@example.com");
        users.create(&mut ada);
        assert!(users.add_role(&mut ada, &[admin.clone(), editor.clone(), admin.clone()]).is_success());
        assert_eq!(ada.role_names(), vec!["admin", "editor"]);

        assert!(users.remove_role(&mut ada, &[admin]).is_success());
        assert_eq!(users.get_by_id(&ada.id).unwrap().role_names(), vec!["editor"]);
    }

    #[test]
    fn test_same_password_gets_distinct_salted_hashes() {
        let users = manager(UserConfig::default());
        let mut ada = User::new("ada", "ada@example.com");
        let mut grace = User::new("grace", "grace@example.com");
        users.create(&mut ada);
        users.create(&mut grace);

        assert!(users.set_password(&mut ada, "password1").is_success());
        assert!(users.set_password(&mut grace, "password1").is_success());

        assert_ne!(ada.password_hash, grace.password_hash);
        assert!(users.check_password(&ada, "password1"));
        assert!(users.check_password(&grace, "password1"));
    }

    #[test]
    fn test_unparseable_hash_never_verifies() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("abc", "ba7816bf8f01cfea414140de5dae2223"));
    }

    #[test]
    fn test_generated_id_skips_taken_ids() {
        let users = manager(UserConfig::default());
        let next = NEXT_USER_ID.load(Ordering::Relaxed);
        for id in next..next + 16 {
            let mut taken = User::new(format!("user{}", id), format!("user{}@example.com", id));
            taken.id = id.to_string();
            assert!(users.create(&mut taken).is_success());
        }

        let mut ada = User::new("ada", "ada@example.com");
        assert!(users.create(&mut ada).is_success());
        assert_eq!(users.get_by_id(&ada.id).unwrap().email, "ada@example.com");
    }
}

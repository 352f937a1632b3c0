//! Users, roles and the managers that persist them.

pub mod manager;
pub mod store;
pub mod types;

pub use manager::{
    hash_password, validate_password, verify_password, DefaultUserManager, DynUserManager, UserManager,
};
pub use store::{DynUserStore, InMemoryUserStore, UserStore};
pub use types::{OperationResult, PasswordConfig, Permission, Role, User, UserConfig};

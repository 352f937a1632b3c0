//! Authentication and authorization collaborators.
//!
//! Tokens are checked by [`SessionManager`] implementations resolved from
//! the request scope; routes are guarded by [`Policy`] wrappers.

pub mod claims;
pub mod jwt;
pub mod policy;
pub mod session;

pub use claims::Claims;
pub use jwt::{DynJwtProvider, Hs256JwtProvider, JwtConfig, JwtProvider};
pub use policy::{require_claim, require_role, Policy, PolicyConfig, Validation, WILDCARD};
pub use session::{authenticate, jwt_authentication, DynSessionManager, JwtSessionManager, SessionManager};

use crate::dependencies::ServiceRegistry;
use crate::errors::CometError;
use crate::identity::{DefaultUserManager, DynUserManager, DynUserStore, UserConfig, UserStore};
use std::sync::Arc;

/// Registers the token provider, its configuration, the user store and
/// the transient user and session managers built on top of them.
pub fn add_jwt_authentication(
    services: &ServiceRegistry,
    provider: impl JwtProvider + 'static,
    config: JwtConfig,
    user_config: UserConfig,
    store: impl UserStore + 'static,
) -> Result<(), CometError> {
    services.register_singleton(user_config)?;
    services.register_singleton(config)?;
    services.register_singleton(Box::new(provider) as DynJwtProvider)?;
    services.register_singleton(Box::new(store) as DynUserStore)?;

    services.register_transient(|config: Arc<UserConfig>, store: Arc<DynUserStore>| {
        Box::new(DefaultUserManager::new(config, store)) as DynUserManager
    })?;
    services.register_transient(
        |config: Arc<JwtConfig>, provider: Arc<DynJwtProvider>, users: Arc<DynUserManager>| {
            Box::new(JwtSessionManager::new(config, provider, users)) as DynSessionManager
        },
    )?;

    log::debug!("JWT authentication services registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::ScopeContext;
    use crate::identity::InMemoryUserStore;

    #[test]
    fn test_registers_resolvable_session_manager() {
        let services = ServiceRegistry::new();
        add_jwt_authentication(
            &services,
            Hs256JwtProvider::new(),
            JwtConfig {
                secret_key: "k".to_string(),
                ..JwtConfig::default()
            },
            UserConfig::default(),
            InMemoryUserStore::new(),
        )
        .unwrap();

        let mut scope = ScopeContext::new();
        let first = services.resolve::<DynSessionManager>(&mut scope).unwrap();
        let second = services.resolve::<DynSessionManager>(&mut scope).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(services.contains::<DynUserManager>());
    }
}

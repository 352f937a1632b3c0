use crate::errors::CometError;
use crate::identity::{DynUserManager, User};
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::routing::{handler, middleware, Middleware};
use crate::security::claims::{
    Claims, CLAIM_AUDIENCE, CLAIM_EXPIRES_AT, CLAIM_ISSUED_AT, CLAIM_ISSUER,
};
use crate::security::jwt::{unix_now, DynJwtProvider, JwtConfig};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Issues and checks session tokens for requests.
pub trait SessionManager: Send + Sync {
    fn get_token(&self, claims: Claims) -> Result<String, CometError>;

    fn validate(&self, req: &HttpRequest) -> Result<Claims, CometError>;

    /// User behind the request's validated session.
    fn get_user(&self, req: &HttpRequest) -> Result<User, CometError>;
}

pub type DynSessionManager = Box<dyn SessionManager>;

pub struct JwtSessionManager {
    config: Arc<JwtConfig>,
    provider: Arc<DynJwtProvider>,
    users: Arc<DynUserManager>,
}

impl JwtSessionManager {
    pub fn new(
        config: Arc<JwtConfig>,
        provider: Arc<DynJwtProvider>,
        users: Arc<DynUserManager>,
    ) -> Self {
        Self {
            config,
            provider,
            users,
        }
    }
}

impl SessionManager for JwtSessionManager {
    fn get_token(&self, mut claims: Claims) -> Result<String, CometError> {
        let now = unix_now();
        if !claims.contains(CLAIM_ISSUED_AT) {
            claims.insert(CLAIM_ISSUED_AT, now);
        }
        if !self.config.issuer.is_empty() && !claims.contains(CLAIM_ISSUER) {
            claims.insert(CLAIM_ISSUER, self.config.issuer.clone());
        }
        if !self.config.audience.is_empty() && !claims.contains(CLAIM_AUDIENCE) {
            claims.insert(CLAIM_AUDIENCE, self.config.audience.clone());
        }
        if self.config.expiration_secs > 0 && !claims.contains(CLAIM_EXPIRES_AT) {
            claims.insert(CLAIM_EXPIRES_AT, now + self.config.expiration_secs);
        }

        self.provider.generate_token(&claims, &self.config)
    }

    fn validate(&self, req: &HttpRequest) -> Result<Claims, CometError> {
        let token = req
            .header("authorization")
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CometError::Authentication {
                message: "missing bearer token".to_string(),
            })?;

        self.provider.validate_token(token, &self.config)
    }

    fn get_user(&self, req: &HttpRequest) -> Result<User, CometError> {
        let claims = match req.claims() {
            Some(claims) => claims.clone(),
            None => self.validate(req)?,
        };
        let subject = claims.subject().ok_or_else(|| CometError::Authentication {
            message: "session not started".to_string(),
        })?;

        self.users
            .get_by_id(subject)
            .ok_or_else(|| CometError::Authentication {
                message: format!("user {} does not exist", subject),
            })
    }
}

/// Claims of the request, validating its token through the scoped
/// session manager when no middleware has done so yet.
pub fn authenticate(req: &mut HttpRequest) -> Result<Claims, CometError> {
    if let Some(claims) = req.claims() {
        return Ok(claims.clone());
    }

    let manager = req.resolve::<DynSessionManager>()?;
    let claims = manager.validate(req)?;
    req.set_claims(claims.clone());
    Ok(claims)
}

/// Middleware rejecting requests without a valid bearer token.
pub fn jwt_authentication() -> Middleware {
    middleware(|next| {
        handler(move |req| {
            let manager = match req.resolve::<DynSessionManager>() {
                Ok(manager) => manager,
                Err(err) => {
                    log::error!("Failed to resolve session manager: {}", err);
                    return HttpResponse::error("error resolving dependency");
                }
            };

            match manager.validate(req) {
                Ok(claims) => {
                    req.set_claims(claims);
                    next(req)
                }
                Err(err) => {
                    log::debug!("Rejected {} {}: {}", req.method, req.path, err);
                    HttpResponse::unauthorized()
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::ServiceRegistry;
    use crate::identity::{DefaultUserManager, DynUserStore, InMemoryUserStore, UserConfig};
    use crate::routing::HttpMethod;
    use crate::security::claims::CLAIM_SUBJECT;
    use crate::security::jwt::Hs256JwtProvider;

    fn manager() -> JwtSessionManager {
        let store: DynUserStore = Box::new(InMemoryUserStore::new());
        let users: DynUserManager = Box::new(DefaultUserManager::new(
            Arc::new(UserConfig::default()),
            Arc::new(store),
        ));
        let provider: DynJwtProvider = Box::new(Hs256JwtProvider::new());

        JwtSessionManager::new(
            Arc::new(JwtConfig {
                issuer: "comet".to_string(),
                audience: "tests".to_string(),
                expiration_secs: 300,
                secret_key: "session-secret".to_string(),
            }),
            Arc::new(provider),
            Arc::new(users),
        )
    }

    #[test]
    fn test_token_carries_configured_claims() {
        let sessions = manager();
        let token = sessions
            .get_token(Claims::new().with(CLAIM_SUBJECT, "7"))
            .unwrap();

        let req = HttpRequest::new(HttpMethod::GET, "/")
            .with_header("Authorization", format!("Bearer {}", token));
        let claims = sessions.validate(&req).unwrap();

        assert_eq!(claims.subject(), Some("7"));
        assert_eq!(claims.get_str(CLAIM_ISSUER), Some("comet"));
        assert_eq!(claims.get_str(CLAIM_AUDIENCE), Some("tests"));
        assert!(claims.get_timestamp(CLAIM_EXPIRES_AT).is_some());
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let sessions = manager();
        let bare = HttpRequest::new(HttpMethod::GET, "/");
        assert!(sessions.validate(&bare).is_err());

        let basic = HttpRequest::new(HttpMethod::GET, "/").with_header("Authorization", "Basic abc");
        assert!(sessions.validate(&basic).is_err());
    }

    #[test]
    fn test_get_user_for_unknown_subject() {
        let sessions = manager();
        let mut req = HttpRequest::new(HttpMethod::GET, "/");
        req.set_claims(Claims::new().with(CLAIM_SUBJECT, "ghost"));
        assert!(sessions.get_user(&req).is_err());
    }

    #[test]
    fn test_middleware_rejects_and_admits() {
        let registry = Arc::new(ServiceRegistry::new());
        let sessions: DynSessionManager = Box::new(manager());
        let token = sessions
            .get_token(Claims::new().with(CLAIM_SUBJECT, "7"))
            .unwrap();
        registry.register_singleton(sessions).unwrap();

        let protected = (jwt_authentication())(handler(|req| {
            HttpResponse::ok(req.claims().and_then(|c| c.subject()).unwrap_or_default().to_string())
        }));

        let mut anonymous = HttpRequest::new(HttpMethod::GET, "/");
        anonymous.enter_scope(Arc::clone(&registry));
        assert_eq!(protected(&mut anonymous).status_code, 401);

        let mut signed = HttpRequest::new(HttpMethod::GET, "/")
            .with_header("Authorization", format!("Bearer {}", token));
        signed.enter_scope(Arc::clone(&registry));
        let response = protected(&mut signed);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, crate::response::ResponseBody::Json("7".into()));
    }

    #[test]
    fn test_middleware_without_session_manager_is_500() {
        let protected = (jwt_authentication())(handler(|_| HttpResponse::ok("unreachable")));
        let mut req = HttpRequest::new(HttpMethod::GET, "/");
        req.enter_scope(Arc::new(ServiceRegistry::new()));
        assert_eq!(protected(&mut req).status_code, 500);
    }
}

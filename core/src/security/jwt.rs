use crate::errors::{error_codes, CometError};
use crate::security::claims::Claims;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token issuing settings shared by the session manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Written to `iss` and required on validation when set.
    pub issuer: String,
    /// Written to `aud` and required on validation when set.
    pub audience: String,
    /// Token lifetime in seconds; zero issues tokens without `exp`.
    pub expiration_secs: i64,
    pub secret_key: String,
}

pub trait JwtProvider: Send + Sync {
    fn generate_token(&self, claims: &Claims, config: &JwtConfig) -> Result<String, CometError>;

    fn validate_token(&self, token: &str, config: &JwtConfig) -> Result<Claims, CometError>;
}

pub type DynJwtProvider = Box<dyn JwtProvider>;

/// HMAC-SHA256 signed compact tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hs256JwtProvider;

impl Hs256JwtProvider {
    pub fn new() -> Self {
        Self
    }

    fn validation(config: &JwtConfig) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims::<&str>(&[]);
        if !config.issuer.is_empty() {
            validation.set_issuer(&[&config.issuer]);
        }
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[&config.audience]);
        }
        validation
    }
}

impl JwtProvider for Hs256JwtProvider {
    fn generate_token(&self, claims: &Claims, config: &JwtConfig) -> Result<String, CometError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .map_err(|e| CometError::Fault {
            message: format!("Failed to encode token: {}", e),
        })
    }

    fn validate_token(&self, token: &str, config: &JwtConfig) -> Result<Claims, CometError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.secret_key.as_bytes()),
            &Self::validation(config),
        )
        .map_err(|e| invalid_token(&e.to_string()))?;
        Ok(data.claims)
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn invalid_token(reason: &str) -> CometError {
    CometError::Authentication {
        message: format!("{}: {}", error_codes::INVALID_TOKEN, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::claims::{
        CLAIM_AUDIENCE, CLAIM_EXPIRES_AT, CLAIM_ISSUER, CLAIM_NOT_BEFORE, CLAIM_SUBJECT,
    };

    fn config() -> JwtConfig {
        JwtConfig {
            secret_key: "unit-test-secret".to_string(),
            ..JwtConfig::default()
        }
    }

    fn scoped_config() -> JwtConfig {
        JwtConfig {
            issuer: "comet".to_string(),
            audience: "tests".to_string(),
            ..config()
        }
    }

    #[test]
    fn test_issued_token_validates() {
        let provider = Hs256JwtProvider::new();
        let claims = Claims::new()
            .with(CLAIM_SUBJECT, "42")
            .with(CLAIM_EXPIRES_AT, unix_now() + 60);

        let token = provider.generate_token(&claims, &config()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(provider.validate_token(&token, &config()).unwrap(), claims);
    }

    #[test]
    fn test_token_without_expiry_validates() {
        let provider = Hs256JwtProvider::new();
        let claims = Claims::new().with(CLAIM_SUBJECT, "42");
        let token = provider.generate_token(&claims, &config()).unwrap();
        assert_eq!(provider.validate_token(&token, &config()).unwrap(), claims);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let provider = Hs256JwtProvider::new();
        let token = provider
            .generate_token(&Claims::new().with(CLAIM_SUBJECT, "42"), &config())
            .unwrap();

        let other = JwtConfig {
            secret_key: "other-secret".to_string(),
            ..config()
        };
        let err = provider.validate_token(&token, &other).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_spliced_payload_is_rejected() {
        let provider = Hs256JwtProvider::new();
        let mine = provider
            .generate_token(&Claims::new().with(CLAIM_SUBJECT, "42"), &config())
            .unwrap();
        let theirs = provider
            .generate_token(&Claims::new().with(CLAIM_SUBJECT, "1"), &config())
            .unwrap();

        let mine: Vec<&str> = mine.split('.').collect();
        let theirs: Vec<&str> = theirs.split('.').collect();
        let forged = format!("{}.{}.{}", mine[0], theirs[1], mine[2]);

        assert!(provider.validate_token(&forged, &config()).is_err());
    }

    #[test]
    fn test_time_window_is_enforced() {
        let provider = Hs256JwtProvider::new();

        let expired = Claims::new().with(CLAIM_EXPIRES_AT, unix_now() - 10);
        let token = provider.generate_token(&expired, &config()).unwrap();
        assert!(provider.validate_token(&token, &config()).is_err());

        let early = Claims::new().with(CLAIM_NOT_BEFORE, unix_now() + 3600);
        let token = provider.generate_token(&early, &config()).unwrap();
        assert!(provider.validate_token(&token, &config()).is_err());
    }

    #[test]
    fn test_issuer_and_audience_are_checked() {
        let provider = Hs256JwtProvider::new();
        let valid = Claims::new()
            .with(CLAIM_SUBJECT, "42")
            .with(CLAIM_ISSUER, "comet")
            .with(CLAIM_AUDIENCE, "tests");
        let token = provider.generate_token(&valid, &scoped_config()).unwrap();
        assert!(provider.validate_token(&token, &scoped_config()).is_ok());

        let foreign_issuer = valid.clone().with(CLAIM_ISSUER, "elsewhere");
        let token = provider.generate_token(&foreign_issuer, &scoped_config()).unwrap();
        assert!(provider.validate_token(&token, &scoped_config()).is_err());

        let foreign_audience = valid.clone().with(CLAIM_AUDIENCE, "others");
        let token = provider.generate_token(&foreign_audience, &scoped_config()).unwrap();
        assert!(provider.validate_token(&token, &scoped_config()).is_err());

        let anonymous = Claims::new().with(CLAIM_SUBJECT, "42");
        let token = provider.generate_token(&anonymous, &scoped_config()).unwrap();
        assert!(provider.validate_token(&token, &scoped_config()).is_err());
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let provider = Hs256JwtProvider::new();
        assert!(provider.validate_token("", &config()).is_err());
        assert!(provider.validate_token("a.b", &config()).is_err());
        assert!(provider.validate_token("a.b.c.d", &config()).is_err());
    }
}

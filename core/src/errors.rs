use crate::dependencies::ServiceKey;
use crate::routing::HttpMethod;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CometError {
    #[error("DEPENDENCY NOT FOUND: {type_name} (key: {key})")]
    DependencyNotFound {
        type_name: &'static str,
        key: ServiceKey,
    },

    #[error("CIRCULAR DEPENDENCY: {chain}")]
    CircularDependency { chain: String },

    #[error("TYPE MISMATCH: registered instance is not a {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("ROUTE NOT FOUND: {method} {path}")]
    RouteNotFound { method: HttpMethod, path: String },

    #[error("AUTHORIZATION DENIED: {message}")]
    AuthorizationDenied { message: String },

    #[error("AUTHENTICATION ERROR: {message}")]
    Authentication { message: String },

    #[error("VALIDATION ERROR: {code} - {message}")]
    Validation { code: String, message: String },

    #[error("REGISTRATION ERROR: {code} - {message}")]
    Registration { code: String, message: String },

    #[error("UNHANDLED FAULT: {message}")]
    Fault { message: String },
}

impl CometError {
    pub fn validation(code: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn registration(code: &str, message: impl Into<String>) -> Self {
        Self::Registration {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status this error surfaces as at the transport boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } => 404,
            Self::AuthorizationDenied { .. } | Self::Authentication { .. } => 401,
            Self::Validation { .. } => 400,
            _ => 500,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::DependencyNotFound { .. } => error_codes::DEPENDENCY_NOT_FOUND,
            Self::CircularDependency { .. } => error_codes::CIRCULAR_DEPENDENCY,
            Self::TypeMismatch { .. } => error_codes::TYPE_MISMATCH,
            Self::RouteNotFound { .. } => error_codes::ROUTE_NOT_FOUND,
            Self::AuthorizationDenied { .. } => error_codes::AUTHORIZATION_DENIED,
            Self::Authentication { .. } => error_codes::INVALID_TOKEN,
            Self::Validation { code, .. } | Self::Registration { code, .. } => code,
            Self::Fault { .. } => error_codes::UNHANDLED_FAULT,
        }
    }
}

/// Stable error codes carried by `CometError::code`.
pub mod error_codes {
    pub const DEPENDENCY_NOT_FOUND: &str = "COMET_DEPENDENCY_NOT_FOUND";
    pub const CIRCULAR_DEPENDENCY: &str = "COMET_CIRCULAR_DEPENDENCY";
    pub const TYPE_MISMATCH: &str = "COMET_TYPE_MISMATCH";
    pub const ROUTE_NOT_FOUND: &str = "COMET_ROUTE_NOT_FOUND";
    pub const AUTHORIZATION_DENIED: &str = "COMET_AUTHORIZATION_DENIED";
    pub const INVALID_TOKEN: &str = "COMET_INVALID_TOKEN";
    pub const UNHANDLED_FAULT: &str = "COMET_UNHANDLED_FAULT";

    pub const INVALID_JSON: &str = "COMET_VALIDATION_INVALID_JSON";
    pub const INVALID_UTF8: &str = "COMET_VALIDATION_INVALID_UTF8";
    pub const BODY_TOO_LARGE: &str = "COMET_VALIDATION_BODY_TOO_LARGE";
    pub const INVALID_HTTP_METHOD: &str = "COMET_VALIDATION_INVALID_HTTP_METHOD";

    pub const REGISTRY_SEALED: &str = "COMET_REGISTRY_SEALED";
    pub const INVALID_PROVIDER: &str = "COMET_REGISTRATION_INVALID_PROVIDER";
    pub const INVALID_ROUTE_PATTERN: &str = "COMET_REGISTRATION_INVALID_ROUTE_PATTERN";
    pub const DUPLICATE_ROUTE: &str = "COMET_REGISTRATION_DUPLICATE_ROUTE";

    pub const USER_EXISTS: &str = "COMET_IDENTITY_USER_EXISTS";
    pub const USER_NOT_FOUND: &str = "COMET_IDENTITY_USER_NOT_FOUND";
}

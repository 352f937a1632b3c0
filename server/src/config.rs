use crate::error::ServerError;
use comet::request::MAX_BODY_SIZE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const ENV_ADDR: &str = "COMET_ADDR";
pub const ENV_LOG_LEVEL: &str = "COMET_LOG_LEVEL";
pub const ENV_MAX_BODY_SIZE: &str = "COMET_MAX_BODY_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub keep_alive: bool,
    /// Largest accepted request body in bytes.
    pub max_body_size: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            keep_alive: true,
            max_body_size: MAX_BODY_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ServerError> {
        toml::from_str(content)
            .map_err(|e| ServerError::Config(format!("Invalid config format: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ServerError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// File settings (or defaults), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `COMET_*` overrides found through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_ADDR) {
            self.addr = addr;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(size) = lookup(ENV_MAX_BODY_SIZE) {
            self.max_body_size = size.trim().parse().map_err(|e| {
                ServerError::Config(format!("{} must be a byte count: {}", ENV_MAX_BODY_SIZE, e))
            })?;
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        self.addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress {
                addr: self.addr.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert!(config.keep_alive);
        assert_eq!(config.max_body_size, 10_485_760);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            addr = "0.0.0.0:9000"
            keep_alive = false
            "#,
        )
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:9000");
        assert!(!config.keep_alive);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            ServerConfig::from_toml_str("addr = ["),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_ADDR, "127.0.0.1:0"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_MAX_BODY_SIZE, "1024"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.addr, "127.0.0.1:0");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_body_size, 1024);

        let broken = ServerConfig::default()
            .with_overrides(|key| (key == ENV_MAX_BODY_SIZE).then(|| "lots".to_string()));
        assert!(broken.is_err());
    }

    #[test]
    fn test_invalid_address() {
        let config = ServerConfig {
            addr: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }
}

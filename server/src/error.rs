use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("CONFIG ERROR: {0}")]
    Config(String),

    #[error("INVALID ADDRESS: {addr} - {message}")]
    InvalidAddress { addr: String, message: String },

    #[error("BIND ERROR: {addr} - {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("IO ERROR: {0}")]
    Io(#[from] std::io::Error),
}

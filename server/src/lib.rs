//! HTTP/1.1 hosting for comet applications, built on hyper and tokio.

pub mod adapter;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::CometServer;

//! Error types for the gateway client.

use std::path::PathBuf;

/// All errors that can occur while talking to the gateway daemon.
///
/// Daemon failure messages are carried verbatim; nothing is retried or
/// recovered automatically.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("authorization error: {0}")]
    Authorization(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("order error: {0}")]
    Order(String),

    #[error("account error: {0}")]
    Account(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

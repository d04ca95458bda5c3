//! TOML configuration loading and validation.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Market, TradeEnv};

/// Top-level configuration. Every section has defaults, so an empty file (or
/// no file at all) yields a simulated-environment client against a local
/// gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub trading: TradingConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 11111,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub environment: TradeEnv,
    pub market: Market,
    pub account_id: Option<String>,
    pub unlock_code: Option<String>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            environment: TradeEnv::Simulate,
            market: Market::Hk,
            account_id: None,
            unlock_code: None,
        }
    }
}

/// Declared limits. The client does not enforce these; they are carried for
/// callers that pace or time out requests themselves.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_requests_per_second: u32,
    pub order_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_second: 10,
            order_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if self.connection.port == 0 {
            return Err(Error::Config("port must be > 0".into()));
        }
        if self.limits.max_requests_per_second == 0 {
            return Err(Error::Config("max_requests_per_second must be > 0".into()));
        }
        if self.limits.order_timeout_secs == 0 {
            return Err(Error::Config("order_timeout_secs must be > 0".into()));
        }
        if let Some(id) = &self.trading.account_id {
            if id.is_empty() {
                return Err(Error::Config("account_id must not be empty when set".into()));
            }
        }
        if let Some(code) = &self.trading.unlock_code {
            if code.is_empty() {
                return Err(Error::Config("unlock_code must not be empty when set".into()));
            }
        }
        Ok(())
    }

    /// Gateway connection address string.
    pub fn address(&self) -> String {
        format!("{}:{}", self.connection.host, self.connection.port)
    }
}

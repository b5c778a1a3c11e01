use std::net::SocketAddr;

use thiserror::Error;

pub const CONNECTION_VAR: &str = "TODO_DB_CONNECTION";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

const DEFAULT_CONNECTION: &str = "sqlite://todos.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var} `{value}`: {source}")]
    InvalidAddr { var: &'static str, value: String, source: std::net::AddrParseError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Connection string of the document store.
    pub connection: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let connection = lookup(CONNECTION_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONNECTION.to_string());
        let addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { var: BIND_ADDR_VAR, value: addr.clone(), source })?;
        Ok(Self { connection, bind_addr })
    }
}

//! Process configuration.
//!
//! # Responsibility
//! - Read server settings from the environment once at startup.
//! - Apply defaults for anything unset.
//!
//! # Invariants
//! - Loading never touches global state; tests pass their own lookup.
//! - Blank values count as unset.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const BIND_ADDR_VAR: &str = "JOURNAL_BIND_ADDR";
pub const DB_PATH_VAR: &str = "JOURNAL_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "JOURNAL_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "JOURNAL_LOG_DIR";
pub const USER_HEADER_VAR: &str = "JOURNAL_USER_HEADER";
pub const AUTH_SECRET_VAR: &str = "JOURNAL_AUTH_SECRET";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "journal.sqlite3";

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub user_header: String,
    pub auth_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBindAddr { value: String, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBindAddr { value, reason } => {
                write!(f, "{BIND_ADDR_VAR}=`{value}` is not a socket address: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_value = read(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            bind_addr,
            db_path: PathBuf::from(
                read(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            ),
            log_level: read(LOG_LEVEL_VAR)
                .unwrap_or_else(|| journal_core::default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
            user_header: read(USER_HEADER_VAR)
                .unwrap_or_else(|| journal_api::DEFAULT_USER_HEADER.to_string()),
            auth_secret: read(AUTH_SECRET_VAR),
        })
    }
}

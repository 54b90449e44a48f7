//! `printdesk.toml` loading.

use printdesk_docket::DEFAULT_MAX_ATTEMPTS;
use printdesk_store::{DEFAULT_LOCK_POLL_MS, DEFAULT_LOCK_TIMEOUT_MS, LockPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LEDGER_PATH: &str = ".printdesk/ledger.jsonl";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub docket: DocketConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub ledger: PathBuf,
    pub lock_timeout_ms: u64,
    pub lock_poll_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ledger: PathBuf::from(DEFAULT_LEDGER_PATH),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            lock_poll_ms: DEFAULT_LOCK_POLL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocketConfig {
    pub max_attempts: u32,
}

impl Default for DocketConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.lock_poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.lock_poll_ms must be greater than zero".to_string(),
            ));
        }
        if self.docket.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "docket.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy {
            timeout: Duration::from_millis(self.store.lock_timeout_ms),
            poll_interval: Duration::from_millis(self.store.lock_poll_ms),
        }
    }
}

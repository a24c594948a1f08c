//! Gateway configuration with validation.
//!
//! ```toml
//! [chain]
//! title = "local"
//! coin_symbol = "bty"
//! min_tx_fee_rate = 100000
//!
//! [fork.system]
//! ForkTxHeight = 0
//!
//! [fork.sub.para]
//! fork100 = 100
//!
//! [group]
//! max_size = 20
//!
//! [expire]
//! default = "120s"
//! min_duration = "120s"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use chain_forks::{ForkConfig, ForkError, ForkTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Hard upper bound on group size.
pub const MAX_GROUP_SIZE: usize = 20;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Static chain parameters
    pub chain: ChainParams,
    /// Fork overrides and per-title forks
    pub fork: ForkConfig,
    /// Transaction group limits
    pub group: GroupConfig,
    /// Expiry defaults
    pub expire: ExpireConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chain = &self.chain;
        if chain.title.is_empty() || chain.title.contains('-') {
            return Err(ConfigError::Invalid(format!(
                "chain title {:?} must be non-empty and contain no '-'",
                chain.title
            )));
        }
        if chain.coin_exec.is_empty() || chain.coin_symbol.is_empty() {
            return Err(ConfigError::Invalid("coin exec and symbol are required".into()));
        }
        if chain.coin_precision <= 0 || chain.token_precision <= 0 {
            return Err(ConfigError::Invalid("precision must be positive".into()));
        }
        if chain.min_tx_fee_rate < 0 {
            return Err(ConfigError::InvalidFee("min_tx_fee_rate cannot be negative".into()));
        }
        if chain.max_tx_fee < chain.min_tx_fee_rate {
            return Err(ConfigError::InvalidFee(
                "max_tx_fee cannot be below min_tx_fee_rate".into(),
            ));
        }

        if !(2..=MAX_GROUP_SIZE).contains(&self.group.max_size) {
            return Err(ConfigError::InvalidLimit(format!(
                "group.max_size must be within 2..={}",
                MAX_GROUP_SIZE
            )));
        }

        if self.expire.default.is_zero() {
            return Err(ConfigError::Invalid("expire.default cannot be 0".into()));
        }

        Ok(())
    }

    /// Build the fork table for the configured chain title.
    pub fn fork_table(&self) -> Result<ForkTable, ConfigError> {
        self.fork
            .clone()
            .into_table(&self.chain.title)
            .map_err(ConfigError::Fork)
    }
}

/// Static chain parameters, answered locally by `get_chain_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParams {
    /// Chain title (namespace)
    pub title: String,
    /// Executor holding the native coin
    pub coin_exec: String,
    /// Native coin symbol
    pub coin_symbol: String,
    /// Smallest units per coin
    pub coin_precision: i64,
    /// Smallest units per token
    pub token_precision: i64,
    /// Chain ID stamped on built transactions
    pub chain_id: i32,
    /// Fee per started kilobyte
    pub min_tx_fee_rate: i64,
    /// Upper bound on a single transaction's fee
    pub max_tx_fee: i64,
}

impl ChainParams {
    /// Parachain titles start with `user.p.`.
    pub fn is_para(&self) -> bool {
        self.title.starts_with("user.p.")
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            title: chain_forks::DEFAULT_TITLE.to_string(),
            coin_exec: "coins".to_string(),
            coin_symbol: "bty".to_string(),
            coin_precision: 100_000_000,
            token_precision: 100_000_000,
            chain_id: 0,
            min_tx_fee_rate: 100_000,
            max_tx_fee: 1_000_000_000,
        }
    }
}

/// Transaction group limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Largest group the gateway builds or accepts
    pub max_size: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_GROUP_SIZE,
        }
    }
}

/// Expiry applied to transactions built by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpireConfig {
    /// Expiry of built transactions that do not ask for one
    #[serde(with = "humantime_serde")]
    pub default: Duration,
    /// Floor for duration-style expiry expressions
    #[serde(with = "humantime_serde")]
    pub min_duration: Duration,
}

impl Default for ExpireConfig {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(120),
            min_duration: Duration::from_secs(120),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// Invalid fee settings
    #[error("invalid fee: {0}")]
    InvalidFee(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid fork config: {0}")]
    Fork(ForkError),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

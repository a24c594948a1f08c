//! Domain types for the gateway.
//!
//! Configuration, errors, request/response shapes, wallet operations, expiry
//! expressions and locally built executor actions.

pub mod actions;
pub mod config;
pub mod error;
pub mod expire;
pub mod methods;
pub mod types;

// Re-exports for convenience
pub use actions::{ActionBuilder, BuiltAction, CoinsAction, ExecutorRegistry};
pub use config::{
    ChainParams, ConfigError, ExpireConfig, GatewayConfig, GroupConfig, LoggingConfig,
    MAX_GROUP_SIZE,
};
pub use error::{codes, ApiError, ApiResult};
pub use expire::{parse_expire, ExpireSpec};
pub use methods::{WalletCall, WalletOp};
pub use types::*;

//! RPC Gateway - typed client operations for a blockchain node.
//!
//! This crate maps client requests onto the module bus and does the
//! transaction-level work that has to happen at the edge: building and
//! rewriting encoded transactions, chaining transaction groups and answering
//! fork lookups.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           RPC GATEWAY                               │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────────────┐   │
//! │  │                    GatewayDispatcher                         │   │
//! │  │  mempool · chain · account · system · wallet · local         │   │
//! │  └───────┬──────────────────┬────────────────────┬──────────────┘   │
//! │          │                  │                    │                  │
//! │  ┌───────┴──────┐  ┌────────┴───────┐  ┌─────────┴────────┐         │
//! │  │TxGroupBuilder│  │ RawTxRewriter  │  │    ForkTable     │         │
//! │  └──────────────┘  └────────────────┘  └──────────────────┘         │
//! │                             │                                       │
//! │                          TxCodec                                    │
//! └─────────────────────────────┼───────────────────────────────────────┘
//!                               │
//!                          Module Bus
//!                               │
//!     ┌─────────┬───────────┬───┴──────┬─────────┬─────────┐
//!     ▼         ▼           ▼          ▼         ▼         ▼
//!  mempool   wallet    blockchain    store     execs      p2p
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rpc_gateway::{GatewayConfig, GatewayDispatcher};
//! use shared_bus::ChannelModuleBus;
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::load("gateway.toml")?;
//! let forks = Arc::new(config.fork_table()?);
//! let bus = Arc::new(ChannelModuleBus::new());
//! let gateway = GatewayDispatcher::new(&config, forks, bus);
//!
//! let time = gateway.get_server_time().await?;
//! ```
//!
//! # Errors
//!
//! Every operation returns [`ApiResult`]. Local validation fails before the
//! bus is called; bus errors come back as [`ApiError::Downstream`] unchanged.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod group;
pub mod ports;
pub mod rewrite;
pub mod rpc;
pub mod telemetry;

// Re-exports for public API
pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{codes, ApiError, ApiResult};
pub use domain::types::*;
pub use group::{TxGroup, TxGroupBuilder};
pub use ports::{FixedClock, SystemTimeSource, TimeSource};
pub use rewrite::RawTxRewriter;
pub use rpc::GatewayDispatcher;
pub use telemetry::{init_tracing, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

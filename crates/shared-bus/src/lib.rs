//! # Shared Bus - Module Bus Contract
//!
//! The gateway never talks to mempool, wallet, blockchain or any other node
//! module directly. Every forwarded operation is one request/response
//! exchange over the module bus:
//!
//! ```text
//! ┌──────────────┐  send(module, fn, req)  ┌──────────────┐
//! │   Gateway    │ ──────────────────────▶ │  Module Bus  │ ──▶ mempool
//! │              │                         │              │ ──▶ wallet
//! │              │ ◀────────────────────── │              │ ──▶ blockchain ...
//! └──────────────┘   Ok(resp) | BusError   └──────────────┘
//! ```
//!
//! ## Implementations
//!
//! - [`ChannelModuleBus`]: one `tokio::mpsc` queue per registered module,
//!   answers delivered through a `oneshot` per request.
//! - [`RecordingBus`]: records every call and returns programmed responses.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod channel;
pub mod module;
pub mod recording;

// Re-export main types
pub use bus::{codes, BusError, ModuleBus};
pub use channel::{BusRequest, ChannelModuleBus, ModuleHandler};
pub use module::Module;
pub use recording::{RecordedCall, RecordingBus};

/// Requests buffered per module queue before senders wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

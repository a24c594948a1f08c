//! # Chain Forks
//!
//! Resolves the block height at which a named protocol fork activates, per
//! chain title.
//!
//! ## Lifecycle
//!
//! ```text
//! ForkTableBuilder::new(title)      registration phase (single owner, &mut)
//!     .register(..) / .register_system(..)
//!     .build()                      ──▶ ForkTable (immutable, Arc-shared)
//!                                        resolve / resolve_key / is_active
//! ```
//!
//! The split between builder and table is what keeps registration from
//! racing lookups: once a `ForkTable` exists nothing can write to it.
//!
//! ## Key Format
//!
//! External lookups use a single `"title-fork"` string split on the **first**
//! hyphen. Titles are rejected at registration if they contain a hyphen, so
//! fork names are free to contain them. A key without a hyphen is a bare fork
//! name on the default title.

pub mod config;
pub mod error;
pub mod system;
pub mod table;

pub use config::ForkConfig;
pub use error::ForkError;
pub use system::{SystemSchedule, SYSTEM_FORKS};
pub use table::{ForkKey, ForkTable, ForkTableBuilder};

/// Title of a development chain; its system forks activate immediately.
pub const DEFAULT_TITLE: &str = "local";

/// Height reported for forks that are not registered anywhere.
///
/// Compares greater than every real block height, so `height >= resolve(..)`
/// is false for unknown forks.
pub const FORK_NOT_ACTIVATED: i64 = i64::MAX;

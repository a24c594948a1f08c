//! Fork configuration loaded from TOML.
//!
//! ```toml
//! [system]
//! ForkTxHeight = 0
//!
//! [sub.para]
//! fork100 = 100
//! ```
//!
//! Embedded in a larger config file the same tables live under `[fork]`
//! (`[fork.system]`, `[fork.sub.para]`).

use crate::error::ForkError;
use crate::table::{ForkTable, ForkTableBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fork overrides and per-title registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkConfig {
    /// Overrides of the default title's system schedule.
    pub system: BTreeMap<String, i64>,
    /// Per-title fork heights, keyed by title.
    pub sub: BTreeMap<String, BTreeMap<String, i64>>,
}

impl ForkConfig {
    /// Parse a standalone fork config.
    pub fn parse(content: &str) -> Result<Self, ForkError> {
        toml::from_str(content).map_err(|e| ForkError::Parse(e.to_string()))
    }

    /// Register everything into a builder.
    pub fn apply(&self, builder: &mut ForkTableBuilder) -> Result<(), ForkError> {
        for (fork, height) in &self.system {
            builder.register_system(fork, *height)?;
        }
        for (title, forks) in &self.sub {
            for (fork, height) in forks {
                builder.register(title, fork, *height)?;
            }
        }
        Ok(())
    }

    /// Build the fork table of a chain titled `chain_title`.
    pub fn into_table(self, chain_title: &str) -> Result<ForkTable, ForkError> {
        let mut builder = ForkTableBuilder::new(chain_title)?;
        self.apply(&mut builder)?;
        Ok(builder.build())
    }
}

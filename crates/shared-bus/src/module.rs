//! Addressable modules behind the bus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node module reachable over the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Mempool,
    Wallet,
    Blockchain,
    Store,
    P2p,
    Consensus,
    Execs,
    System,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::Mempool,
        Module::Wallet,
        Module::Blockchain,
        Module::Store,
        Module::P2p,
        Module::Consensus,
        Module::Execs,
        Module::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Mempool => "mempool",
            Module::Wallet => "wallet",
            Module::Blockchain => "blockchain",
            Module::Store => "store",
            Module::P2p => "p2p",
            Module::Consensus => "consensus",
            Module::Execs => "execs",
            Module::System => "system",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! # Module Bus Port
//!
//! The single capability the gateway needs from the node: send a request to a
//! named function of a module and await its answer.

use crate::module::Module;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error codes produced by the bus itself, as opposed to codes a module
/// returns about its own failures.
pub mod codes {
    /// No queue is registered for the target module.
    pub const MODULE_UNAVAILABLE: i32 = -32010;
    /// The module accepted the request but dropped it without answering.
    pub const NO_REPLY: i32 = -32011;
    /// The recording bus has no response programmed for the call.
    pub const NOT_PROGRAMMED: i32 = -32012;
}

/// Error returned by a module, or by the bus when delivery fails.
///
/// Compared by value so callers can assert that a downstream error reached
/// them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("module error {code}: {message}")]
pub struct BusError {
    pub code: i32,
    pub message: String,
}

impl BusError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unavailable(module: Module) -> Self {
        Self::new(
            codes::MODULE_UNAVAILABLE,
            format!("module {} is not available", module),
        )
    }

    pub fn no_reply(module: Module, function: &str) -> Self {
        Self::new(
            codes::NO_REPLY,
            format!("{}.{} dropped the request without a reply", module, function),
        )
    }
}

/// Request/response transport to the node's modules.
///
/// Requests and responses are JSON values; call sites serialize their typed
/// request and deserialize the typed response.
#[async_trait]
pub trait ModuleBus: Send + Sync {
    async fn send(
        &self,
        module: Module,
        function: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, BusError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_equality_and_display() {
        let err = BusError::new(-1, "ErrTxExist");
        assert_eq!(err, BusError::new(-1, "ErrTxExist"));
        assert_eq!(err.to_string(), "module error -1: ErrTxExist");
    }

    #[test]
    fn test_unavailable_names_module() {
        let err = BusError::unavailable(Module::Wallet);
        assert_eq!(err.code, codes::MODULE_UNAVAILABLE);
        assert!(err.message.contains("wallet"));
    }
}

//! Executor actions the gateway can build locally.
//!
//! Only the coin executor is built in. Anything else is rejected with
//! [`ApiError::UnsupportedAction`] before the bus is involved.

use super::error::{ApiError, ApiResult};
use super::types::CreateTx;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{check_address, exec_address, TxCodec};
use std::collections::HashMap;

/// Payload and recipient of a built action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltAction {
    pub payload: Vec<u8>,
    pub to: String,
}

/// Builds executor payloads from JSON action parameters.
pub trait ActionBuilder: Send + Sync {
    fn execer(&self) -> &str;

    fn build(&self, action: &str, params: serde_json::Value) -> ApiResult<BuiltAction>;
}

/// Executors known to the gateway, by name.
pub struct ExecutorRegistry {
    builders: HashMap<String, Box<dyn ActionBuilder>>,
}

impl ExecutorRegistry {
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry with the coin executor under `coin_exec`.
    pub fn with_coins(coin_exec: &str) -> Self {
        let mut registry = Self::empty();
        registry.register(CoinsBuilder::new(coin_exec));
        registry
    }

    pub fn register<B: ActionBuilder + 'static>(&mut self, builder: B) {
        self.builders
            .insert(builder.execer().to_string(), Box::new(builder));
    }

    pub fn build(
        &self,
        execer: &str,
        action: &str,
        params: serde_json::Value,
    ) -> ApiResult<BuiltAction> {
        let builder = self.builders.get(execer).ok_or_else(|| {
            ApiError::UnsupportedAction(format!("executor {:?} cannot be built here", execer))
        })?;
        builder.build(action, params)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COINS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsTransfer {
    pub cointoken: String,
    pub amount: i64,
    pub note: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsWithdraw {
    pub cointoken: String,
    pub amount: i64,
    pub note: String,
    pub exec_name: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsTransferToExec {
    pub cointoken: String,
    pub amount: i64,
    pub note: String,
    pub exec_name: String,
    pub to: String,
}

/// Payload of a coin transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinsAction {
    Transfer(AssetsTransfer),
    Withdraw(AssetsWithdraw),
    TransferToExec(AssetsTransferToExec),
}

impl CoinsAction {
    /// Coin action requested by a `create_raw_transaction` call.
    pub fn from_create_tx(create: &CreateTx) -> ApiResult<Self> {
        if create.is_token {
            return Err(ApiError::UnsupportedAction(format!(
                "token {:?} transfers need the token executor",
                create.token_symbol
            )));
        }
        let action = if create.is_withdraw {
            CoinsAction::Withdraw(AssetsWithdraw {
                cointoken: String::new(),
                amount: create.amount,
                note: create.note.clone(),
                exec_name: create.exec_name.clone(),
                to: create.to.clone(),
            })
        } else if !create.exec_name.is_empty() {
            CoinsAction::TransferToExec(AssetsTransferToExec {
                cointoken: String::new(),
                amount: create.amount,
                note: create.note.clone(),
                exec_name: create.exec_name.clone(),
                to: create.to.clone(),
            })
        } else {
            CoinsAction::Transfer(AssetsTransfer {
                cointoken: String::new(),
                amount: create.amount,
                note: create.note.clone(),
                to: create.to.clone(),
            })
        };
        Ok(action)
    }

    /// Validate and produce payload bytes plus the transaction recipient.
    pub fn into_built(self) -> ApiResult<BuiltAction> {
        let to = match &self {
            CoinsAction::Transfer(t) => {
                check_amount(t.amount)?;
                check_address(&t.to).map_err(|e| ApiError::invalid_address(&t.to, e))?;
                t.to.clone()
            }
            CoinsAction::Withdraw(w) => {
                check_amount(w.amount)?;
                exec_recipient(&w.exec_name)?
            }
            CoinsAction::TransferToExec(t) => {
                check_amount(t.amount)?;
                exec_recipient(&t.exec_name)?
            }
        };
        Ok(BuiltAction {
            payload: TxCodec::encode_payload(&self)?,
            to,
        })
    }
}

fn check_amount(amount: i64) -> ApiResult<()> {
    if amount <= 0 {
        return Err(ApiError::invalid_param("amount must be positive"));
    }
    Ok(())
}

fn exec_recipient(exec_name: &str) -> ApiResult<String> {
    if exec_name.is_empty() {
        return Err(ApiError::invalid_param("exec_name is required"));
    }
    Ok(exec_address(exec_name))
}

fn parse_params<T: DeserializeOwned>(action: &str, params: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(params)
        .map_err(|e| ApiError::invalid_param(format!("{} params: {}", action, e)))
}

/// Builder for the coin executor.
pub struct CoinsBuilder {
    execer: String,
}

impl CoinsBuilder {
    pub fn new(execer: &str) -> Self {
        Self {
            execer: execer.to_string(),
        }
    }
}

impl ActionBuilder for CoinsBuilder {
    fn execer(&self) -> &str {
        &self.execer
    }

    fn build(&self, action: &str, params: serde_json::Value) -> ApiResult<BuiltAction> {
        let action = match action {
            "Transfer" => CoinsAction::Transfer(parse_params(action, params)?),
            "Withdraw" => CoinsAction::Withdraw(parse_params(action, params)?),
            "TransferToExec" => CoinsAction::TransferToExec(parse_params(action, params)?),
            other => {
                return Err(ApiError::UnsupportedAction(format!(
                    "{} has no action {:?}",
                    self.execer, other
                )))
            }
        };
        action.into_built()
    }
}

//! # Gateway Dispatcher
//!
//! One async operation per client request kind. Most operations forward the
//! typed request to a fixed `(module, function)` pair on the module bus and
//! hand the typed answer back. A bus error is relayed inside
//! [`ApiError::Downstream`] untouched.
//!
//! Local validation (addresses, hex, group size, expiry expressions) runs
//! before the bus is involved, so a rejected request never reaches a module.
//!
//! Operations are grouped by the module they talk to:
//!
//! | file         | operations                                     |
//! |--------------|------------------------------------------------|
//! | `mempool.rs` | transaction submission, mempool queries        |
//! | `chain.rs`   | blocks, headers, transactions by hash/address  |
//! | `account.rs` | balances                                       |
//! | `system.rs`  | executor/consensus queries, p2p, version       |
//! | `wallet.rs`  | typed wallet operations                        |
//! | `local.rs`   | forks, time, chain config, tx construction     |

mod account;
mod chain;
mod local;
mod mempool;
mod system;
mod wallet;

use crate::domain::actions::ExecutorRegistry;
use crate::domain::config::{ChainParams, ExpireConfig, GatewayConfig};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::expire::parse_expire;
use crate::group::{real_fee, TxGroupBuilder};
use crate::ports::{SystemTimeSource, TimeSource};
use crate::rewrite::RawTxRewriter;
use chain_forks::ForkTable;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_bus::{Module, ModuleBus};
use shared_types::{check_address, Expiry, Transaction};
use std::sync::Arc;
use tracing::debug;

/// Typed client operations over the module bus.
///
/// Holds only shared handles and static parameters; every operation takes
/// `&self` and the dispatcher can be shared across tasks behind an `Arc`.
pub struct GatewayDispatcher {
    bus: Arc<dyn ModuleBus>,
    forks: Arc<ForkTable>,
    clock: Arc<dyn TimeSource>,
    executors: Arc<ExecutorRegistry>,
    chain: ChainParams,
    expire: ExpireConfig,
    groups: TxGroupBuilder,
    rewriter: RawTxRewriter,
}

impl GatewayDispatcher {
    /// Dispatcher over `bus` with the system clock and the coin executor.
    pub fn new(config: &GatewayConfig, forks: Arc<ForkTable>, bus: Arc<dyn ModuleBus>) -> Self {
        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        Self {
            rewriter: RawTxRewriter::new(
                Arc::clone(&forks),
                Arc::clone(&clock),
                config.expire.min_duration,
            ),
            groups: TxGroupBuilder::from_config(config),
            executors: Arc::new(ExecutorRegistry::with_coins(&config.chain.coin_exec)),
            chain: config.chain.clone(),
            expire: config.expire.clone(),
            bus,
            forks,
            clock,
        }
    }

    /// Replace the clock used for server time and expiry anchoring.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.rewriter = RawTxRewriter::new(
            Arc::clone(&self.forks),
            Arc::clone(&clock),
            self.expire.min_duration,
        );
        self.clock = clock;
        self
    }

    /// Replace the executors `create_transaction` can build.
    #[must_use]
    pub fn with_executors(mut self, executors: ExecutorRegistry) -> Self {
        self.executors = Arc::new(executors);
        self
    }

    pub fn forks(&self) -> &ForkTable {
        &self.forks
    }

    pub fn chain(&self) -> &ChainParams {
        &self.chain
    }

    /// Send one typed request and decode the typed answer.
    async fn call<Req, Resp>(&self, module: Module, function: &str, req: &Req) -> ApiResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = serde_json::to_value(req).map_err(|e| {
            ApiError::internal(format!("encode {}.{} request: {}", module, function, e))
        })?;

        debug!(%module, function, "Dispatching to module bus");
        let response = self.bus.send(module, function, request).await?;

        serde_json::from_value(response).map_err(|e| {
            ApiError::internal(format!("decode {}.{} response: {}", module, function, e))
        })
    }

    /// Fill nonce, chain id, expiry and a minimum fee on a built transaction.
    ///
    /// An empty expiry expression uses the configured default duration. A
    /// zero fee becomes the minimum fee for the transaction's size.
    fn format_tx(&self, tx: &mut Transaction, expire: &str, fee_rate: i64) -> ApiResult<()> {
        tx.nonce = rand::thread_rng().gen_range(0..i64::MAX);
        tx.chain_id = self.chain.chain_id;
        tx.set_expiry(self.expiry(expire)?);

        if tx.fee < 0 {
            return Err(ApiError::invalid_param("fee cannot be negative"));
        }
        if tx.fee == 0 {
            tx.fee = real_fee(tx.size(), fee_rate)?;
        }
        if self.chain.max_tx_fee > 0 && tx.fee > self.chain.max_tx_fee {
            return Err(ApiError::invalid_param(format!(
                "fee {} exceeds maximum {}",
                tx.fee, self.chain.max_tx_fee
            )));
        }
        Ok(())
    }

    fn expiry(&self, expire: &str) -> ApiResult<Expiry> {
        let now = self.clock.now();
        if expire.trim().is_empty() {
            let at = now.saturating_add(self.expire.default.as_secs());
            return Ok(Expiry::UnixTime(i64::try_from(at).unwrap_or(i64::MAX)));
        }
        parse_expire(expire, now, self.expire.min_duration, &self.forks)
    }
}

/// Reject a malformed address before dispatch.
fn validate_address(addr: &str) -> ApiResult<()> {
    check_address(addr)
        .map(|_| ())
        .map_err(|e| ApiError::invalid_address(addr, e))
}

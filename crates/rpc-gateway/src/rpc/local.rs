//! Operations answered by the gateway itself.
//!
//! Fork lookup, server time and chain config never touch the bus. The
//! transaction constructors build and encode locally; only
//! `create_no_balance_txs` asks the mempool for a fee rate and the wallet
//! for a signature.

use super::{validate_address, GatewayDispatcher};
use crate::domain::actions::CoinsAction;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::SignRawTxRequest;
use crate::domain::types::*;
use shared_bus::Module;
use shared_types::{exec_address, Transaction, TxCodec};
use tracing::{debug, instrument};

/// Executor of the fee-payer transaction heading a no-balance group.
pub const NO_FEE_EXECER: &str = "none";

/// Payload of the fee-payer transaction.
pub const NO_FEE_PAYLOAD: &[u8] = b"no-fee-transaction";

impl GatewayDispatcher {
    // ═══════════════════════════════════════════════════════════════════════
    // CHAIN PARAMETERS
    // ═══════════════════════════════════════════════════════════════════════

    /// GetFork - activation height for a `title-forkname` key
    ///
    /// Unknown forks answer the not-activated sentinel, not an error.
    #[instrument(skip(self))]
    pub async fn get_fork(&self, req: ReqKey) -> ApiResult<ForkHeight> {
        let height = self
            .forks
            .resolve_key(&req.key)
            .map_err(|e| ApiError::invalid_param(e.to_string()))?;
        Ok(ForkHeight { height })
    }

    /// GetServerTime - local clock, unix seconds
    #[instrument(skip(self))]
    pub async fn get_server_time(&self) -> ApiResult<ServerTime> {
        Ok(ServerTime {
            current_timestamp: i64::try_from(self.clock.now()).unwrap_or(i64::MAX),
        })
    }

    /// GetChainConfig - static chain parameters
    #[instrument(skip(self))]
    pub async fn get_chain_config(&self) -> ApiResult<ChainConfigInfo> {
        let chain = &self.chain;
        Ok(ChainConfigInfo {
            title: chain.title.clone(),
            coin_exec: chain.coin_exec.clone(),
            coin_symbol: chain.coin_symbol.clone(),
            coin_precision: chain.coin_precision,
            token_precision: chain.token_precision,
            chain_id: chain.chain_id,
            min_tx_fee_rate: chain.min_tx_fee_rate,
            max_tx_fee: chain.max_tx_fee,
            max_group_size: self.groups.max_size(),
            is_para: chain.is_para(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTION CONSTRUCTION
    // ═══════════════════════════════════════════════════════════════════════

    /// CreateRawTxGroup - link hex-encoded transactions into one group
    #[instrument(skip(self, req), fields(count = req.txs.len()))]
    pub async fn create_raw_tx_group(&self, req: CreateTransactionGroup) -> ApiResult<Vec<u8>> {
        self.groups.check_size(req.txs.len())?;
        let txs = decode_singles(&req.txs)?;
        Ok(self.groups.build(&txs)?.encode())
    }

    /// ReWriteRawTx - override fee, recipient or expiry of an encoded transaction
    #[instrument(skip(self, req), fields(index = req.index))]
    pub async fn rewrite_raw_tx(&self, req: ReWriteRawTx) -> ApiResult<RawTxData> {
        Ok(RawTxData {
            data: self.rewriter.rewrite(&req)?,
        })
    }

    /// CreateRawTransaction - unsigned coin transfer, withdraw or transfer-to-exec
    #[instrument(skip(self, req), fields(execer = %req.execer, amount = req.amount))]
    pub async fn create_raw_transaction(&self, req: CreateTx) -> ApiResult<Vec<u8>> {
        let execer = if req.execer.is_empty() {
            self.chain.coin_exec.as_str()
        } else {
            req.execer.as_str()
        };
        if execer != self.chain.coin_exec {
            return Err(ApiError::UnsupportedAction(format!(
                "raw transfers are built for {} only, got {:?}",
                self.chain.coin_exec, execer
            )));
        }

        let built = CoinsAction::from_create_tx(&req)?.into_built()?;
        let mut tx = Transaction::new(execer, built.payload);
        tx.to = built.to;
        tx.fee = req.fee;
        self.format_tx(&mut tx, &req.expire, self.chain.min_tx_fee_rate)?;
        Ok(TxCodec::encode(&tx))
    }

    /// CreateTransaction - unsigned transaction for an executor action
    #[instrument(skip(self, req), fields(execer = %req.execer, action = %req.action_name))]
    pub async fn create_transaction(&self, req: CreateTxIn) -> ApiResult<Vec<u8>> {
        let built = self
            .executors
            .build(&req.execer, &req.action_name, req.payload)?;
        let mut tx = Transaction::new(req.execer, built.payload);
        tx.to = built.to;
        self.format_tx(&mut tx, "", self.chain.min_tx_fee_rate)?;
        Ok(TxCodec::encode(&tx))
    }

    /// CreateNoBalanceTxs - group headed by a fee payer so senders need no balance
    ///
    /// The head is a `none`-executor transaction and carries the whole group
    /// fee at the higher of the configured rate and the mempool's suggested
    /// rate. With a `pay_addr` the group is signed through the wallet and the
    /// signed hex is returned.
    #[instrument(skip(self, req), fields(count = req.tx_hexs.len(), pay_addr = %req.pay_addr))]
    pub async fn create_no_balance_txs(&self, req: NoBalanceTxs) -> ApiResult<ReplyString> {
        self.groups.check_size(req.tx_hexs.len() + 1)?;
        let txs = decode_singles(&req.tx_hexs)?;
        if !req.pay_addr.is_empty() {
            validate_address(&req.pay_addr)?;
        }

        let mut payer = Transaction::new(NO_FEE_EXECER, NO_FEE_PAYLOAD);
        payer.to = exec_address(NO_FEE_EXECER);
        self.format_tx(&mut payer, &req.expire, 0)?;

        let total_size: usize = payer.size() + txs.iter().map(Transaction::size).sum::<usize>();
        let proper: ReplyProperFee = self
            .call(
                Module::Mempool,
                "GetProperFee",
                &ReqProperFee {
                    tx_count: (txs.len() + 1) as i32,
                    tx_size: i32::try_from(total_size).unwrap_or(i32::MAX),
                },
            )
            .await?;
        let fee_rate = self.chain.min_tx_fee_rate.max(proper.proper_fee);

        let mut members = Vec::with_capacity(txs.len() + 1);
        members.push(payer);
        members.extend(txs);
        let group = self.groups.clone().with_fee_rate(fee_rate).build(&members)?;
        let tx_hex = TxCodec::to_hex(&group.encode());
        debug!(fee_rate, head_fee = group.members()[0].fee, "No-balance group built");

        if req.pay_addr.is_empty() {
            return Ok(ReplyString { data: tx_hex });
        }

        let signed = self
            .sign_raw_tx(SignRawTxRequest {
                addr: req.pay_addr,
                tx_hex,
                expire: String::new(),
                index: 1,
                fee: 0,
            })
            .await?;
        Ok(ReplyString {
            data: signed.tx_hex,
        })
    }
}

/// Decode hex inputs that must each be one ungrouped-layout transaction.
fn decode_singles(hexes: &[String]) -> ApiResult<Vec<Transaction>> {
    hexes
        .iter()
        .map(|hex| -> ApiResult<Transaction> {
            Ok(TxCodec::decode(&TxCodec::decode_hex_tx(hex)?)?)
        })
        .collect()
}

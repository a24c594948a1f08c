//! Request and response types of gateway operations.
//!
//! Requests are serialized to JSON and forwarded verbatim; responses are
//! deserialized from what the module answered. Shapes a module owns and the
//! gateway never inspects stay as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use shared_types::{Transaction, TxHash};

// ═══════════════════════════════════════════════════════════════════════════════
// COMMON
// ═══════════════════════════════════════════════════════════════════════════════

/// Empty request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqNil {}

/// Generic success/failure reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reply {
    pub is_ok: bool,
    pub msg: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyHash {
    pub hash: TxHash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyHashes {
    pub hashes: Vec<TxHash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqHash {
    pub hash: TxHash,
    /// Return the transaction as received even if still in the mempool.
    pub upgrade: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqHashes {
    pub hashes: Vec<TxHash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqKey {
    pub key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqInt {
    pub height: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Int64 {
    pub data: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqString {
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyString {
    pub data: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyBool {
    pub is_ok: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMPOOL
// ═══════════════════════════════════════════════════════════════════════════════

/// A transaction to be submitted after a delay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayTx {
    pub tx: Transaction,
    /// Block height or unix time at which the delay ends.
    pub end_delay_time: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqGetMempool {
    pub is_all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTxList {
    pub txs: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqProperFee {
    pub tx_count: i32,
    pub tx_size: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyProperFee {
    pub proper_fee: i64,
}

/// Outcome of a batch submission, index-aligned with the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySendTxs {
    /// Acknowledged hash, or the zero hash where submission failed.
    pub hashes: Vec<TxHash>,
    /// `None` where submission succeeded.
    pub errors: Vec<Option<shared_bus::BusError>>,
}

/// Result of a synchronous submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySendTxSync {
    pub hash: TxHash,
    pub detail: Option<TransactionDetail>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCKCHAIN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDetail {
    pub tx: Transaction,
    pub receipt: serde_json::Value,
    pub height: i64,
    pub index: i64,
    pub block_time: i64,
    pub amount: i64,
    pub from_addr: String,
    pub action_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDetails {
    pub txs: Vec<Option<TransactionDetail>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqAddr {
    pub addr: String,
    /// 0: all, 1: sent, 2: received
    pub flag: i32,
    pub count: i32,
    pub direction: i32,
    pub height: i64,
    pub index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTxInfo {
    pub hash: TxHash,
    pub height: i64,
    pub index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTxInfos {
    pub tx_infos: Vec<ReplyTxInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqBlocks {
    pub start: i64,
    pub end: i64,
    pub is_detail: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub version: i64,
    pub parent_hash: TxHash,
    pub tx_hash: TxHash,
    pub state_hash: TxHash,
    pub height: i64,
    pub block_time: i64,
    pub tx_count: i64,
    pub hash: TxHash,
    pub difficulty: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headers {
    pub items: Vec<Header>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockDetails {
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockOverview {
    pub head: Header,
    pub tx_count: i64,
    pub tx_hashes: Vec<TxHash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddrOverview {
    pub reciver: i64,
    pub balance: i64,
    pub tx_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqHeightByTitle {
    pub height: i64,
    pub title: String,
    pub count: i32,
    pub direction: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqParaTxByHeight {
    pub title: String,
    pub items: Vec<i64>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqBalance {
    pub addresses: Vec<String>,
    pub execer: String,
    pub state_hash: String,
    pub asset_exec: String,
    pub asset_symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub currency: i32,
    pub balance: i64,
    pub frozen: i64,
    pub addr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqAllExecBalance {
    pub addr: String,
    pub state_hash: String,
    pub asset_exec: String,
    pub asset_symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecAccount {
    pub execer: String,
    pub account: Account,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllExecBalance {
    pub addr: String,
    pub exec_account: Vec<ExecAccount>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXECUTORS / CONSENSUS / SYSTEM
// ═══════════════════════════════════════════════════════════════════════════════

/// Query forwarded to an executor, the consensus module or the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainExecutor {
    pub driver: String,
    pub func_name: String,
    pub state_hash: String,
    #[serde(with = "shared_types::hex_bytes")]
    pub param: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqRandHash {
    pub exec_name: String,
    pub height: i64,
    pub block_num: i64,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    pub title: String,
    pub app: String,
    pub chain: String,
    pub local_db: String,
    pub chain_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoInfo {
    pub name: String,
    pub type_id: i32,
    pub enable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerList {
    pub peers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeNetInfo {
    pub externaladdr: String,
    pub localaddr: String,
    pub service: bool,
    pub outbounds: i32,
    pub inbounds: i32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOCALLY ANSWERED
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkHeight {
    pub height: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTime {
    pub current_timestamp: i64,
}

/// Static chain parameters as reported to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfigInfo {
    pub title: String,
    pub coin_exec: String,
    pub coin_symbol: String,
    pub coin_precision: i64,
    pub token_precision: i64,
    pub chain_id: i32,
    pub min_tx_fee_rate: i64,
    pub max_tx_fee: i64,
    pub max_group_size: usize,
    pub is_para: bool,
}

/// Hex-encoded transactions to chain into a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTransactionGroup {
    pub txs: Vec<String>,
}

/// Overrides applied by `rewrite_raw_tx`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReWriteRawTx {
    /// Hex of a single transaction or a group.
    pub tx: String,
    /// New recipient; empty keeps the current one.
    pub to: String,
    /// New head fee; 0 keeps the current one.
    pub fee: i64,
    /// Expiry expression; empty keeps the current one.
    pub expire: String,
    /// 0 addresses the whole group (expiry on every member, recipient on the
    /// head), k addresses member k-1.
    pub index: i32,
}

/// Encoded transaction bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTxData {
    #[serde(with = "shared_types::hex_bytes")]
    pub data: Vec<u8>,
}

/// Parameters of a coin transfer built by `create_raw_transaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTx {
    pub to: String,
    pub amount: i64,
    pub fee: i64,
    pub note: String,
    pub is_withdraw: bool,
    pub is_token: bool,
    pub token_symbol: String,
    /// Executor the funds move into or out of, for withdraw and transfer-to-exec.
    pub exec_name: String,
    /// Executor running the transaction; defaults to the coin executor.
    pub execer: String,
    /// Expiry expression; empty uses the configured default.
    pub expire: String,
}

/// Executor-action transaction built by `create_transaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTxIn {
    pub execer: String,
    pub action_name: String,
    pub payload: serde_json::Value,
}

/// Transactions whose fee is paid by a separate fee-payer transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoBalanceTxs {
    pub tx_hexs: Vec<String>,
    /// Address paying the fee; signs the group through the wallet when set.
    pub pay_addr: String,
    /// Expiry expression applied to the fee payer and the group.
    pub expire: String,
}

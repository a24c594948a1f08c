//! Wallet operations.
//!
//! Every wallet operation is a variant of the closed [`WalletOp`] enum and
//! every typed request names its operation through [`WalletCall::OP`]. The
//! route to the bus is an exhaustive `match`, so adding an operation without
//! a route does not compile.

use super::types::{Account, Reply, ReplyHash, ReplyHashes, ReplyString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_bus::Module;

/// Wallet operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletOp {
    GetAccountList,
    GetAccount,
    NewAccount,
    TransactionList,
    ImportPrivkey,
    SendToAddress,
    SetFee,
    SetLabel,
    MergeBalance,
    SetPasswd,
    Lock,
    UnLock,
    GenSeed,
    GetSeed,
    SaveSeed,
    GetWalletStatus,
    DumpPrivkey,
    DumpPrivkeysFile,
    ImportPrivkeysFile,
    SignRawTx,
}

impl WalletOp {
    pub const ALL: [WalletOp; 20] = [
        WalletOp::GetAccountList,
        WalletOp::GetAccount,
        WalletOp::NewAccount,
        WalletOp::TransactionList,
        WalletOp::ImportPrivkey,
        WalletOp::SendToAddress,
        WalletOp::SetFee,
        WalletOp::SetLabel,
        WalletOp::MergeBalance,
        WalletOp::SetPasswd,
        WalletOp::Lock,
        WalletOp::UnLock,
        WalletOp::GenSeed,
        WalletOp::GetSeed,
        WalletOp::SaveSeed,
        WalletOp::GetWalletStatus,
        WalletOp::DumpPrivkey,
        WalletOp::DumpPrivkeysFile,
        WalletOp::ImportPrivkeysFile,
        WalletOp::SignRawTx,
    ];

    /// Bus module and function serving this operation.
    pub fn route(self) -> (Module, &'static str) {
        let function = match self {
            WalletOp::GetAccountList => "WalletGetAccountList",
            WalletOp::GetAccount => "WalletGetAccount",
            WalletOp::NewAccount => "NewAccount",
            WalletOp::TransactionList => "WalletTransactionList",
            WalletOp::ImportPrivkey => "WalletImportPrivkey",
            WalletOp::SendToAddress => "WalletSendToAddress",
            WalletOp::SetFee => "WalletSetFee",
            WalletOp::SetLabel => "WalletSetLabel",
            WalletOp::MergeBalance => "WalletMergeBalance",
            WalletOp::SetPasswd => "WalletSetPasswd",
            WalletOp::Lock => "WalletLock",
            WalletOp::UnLock => "WalletUnLock",
            WalletOp::GenSeed => "GenSeed",
            WalletOp::GetSeed => "GetSeed",
            WalletOp::SaveSeed => "SaveSeed",
            WalletOp::GetWalletStatus => "GetWalletStatus",
            WalletOp::DumpPrivkey => "DumpPrivkey",
            WalletOp::DumpPrivkeysFile => "DumpPrivkeysFile",
            WalletOp::ImportPrivkeysFile => "ImportPrivkeysFile",
            WalletOp::SignRawTx => "SignRawTx",
        };
        (Module::Wallet, function)
    }
}

/// A typed wallet request.
pub trait WalletCall: Serialize + Send + Sync {
    const OP: WalletOp;
    type Response: DeserializeOwned;
}

macro_rules! wallet_call {
    ($($req:ty => $op:ident -> $resp:ty;)*) => {
        $(
            impl WalletCall for $req {
                const OP: WalletOp = WalletOp::$op;
                type Response = $resp;
            }
        )*
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAccountListRequest {
    pub without_balance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAccountRequest {
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAccountRequest {
    pub label: String,
    /// Address kind to derive, 0 for normal.
    pub address_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionListRequest {
    pub from_tx: String,
    pub count: i32,
    pub direction: i32,
    pub mode: i32,
    pub send_recv_flag: i32,
    pub address: String,
}

/// Carries a private key; never log its contents.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPrivkeyRequest {
    pub privkey: String,
    pub label: String,
    pub address_id: i32,
}

impl std::fmt::Debug for ImportPrivkeyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPrivkeyRequest")
            .field("label", &self.label)
            .field("address_id", &self.address_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendToAddressRequest {
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub note: String,
    pub is_token: bool,
    pub token_symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetFeeRequest {
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetLabelRequest {
    pub addr: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeBalanceRequest {
    pub to: String,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetPasswdRequest {
    pub old_pass: String,
    pub new_pass: String,
}

impl std::fmt::Debug for SetPasswdRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetPasswdRequest").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRequest {}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnLockRequest {
    pub passwd: String,
    /// Seconds until the wallet locks again, 0 for never.
    pub timeout: i64,
    pub wallet_or_ticket: bool,
}

impl std::fmt::Debug for UnLockRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnLockRequest")
            .field("timeout", &self.timeout)
            .field("wallet_or_ticket", &self.wallet_or_ticket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenSeedRequest {
    /// 0: English, 1: Chinese
    pub lang: i32,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetSeedRequest {
    pub passwd: String,
}

impl std::fmt::Debug for GetSeedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetSeedRequest").finish_non_exhaustive()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSeedRequest {
    pub seed: String,
    pub passwd: String,
}

impl std::fmt::Debug for SaveSeedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveSeedRequest").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetWalletStatusRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpPrivkeyRequest {
    pub addr: String,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpPrivkeysFileRequest {
    pub file_name: String,
    pub passwd: String,
}

impl std::fmt::Debug for DumpPrivkeysFileRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpPrivkeysFileRequest")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPrivkeysFileRequest {
    pub file_name: String,
    pub passwd: String,
}

impl std::fmt::Debug for ImportPrivkeysFileRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPrivkeysFileRequest")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Sign a raw transaction or group held by the wallet's key for `addr`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignRawTxRequest {
    pub addr: String,
    pub tx_hex: String,
    pub expire: String,
    /// 0 signs every group member, k signs member k-1.
    pub index: i32,
    pub fee: i64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESPONSES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletAccount {
    pub acc: Account,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletAccounts {
    pub wallets: Vec<WalletAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletTxDetails {
    pub tx_details: Vec<serde_json::Value>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySeed {
    pub seed: String,
}

impl std::fmt::Debug for ReplySeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySeed").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletStatus {
    pub is_wallet_lock: bool,
    pub is_auto_mining: bool,
    pub is_has_seed: bool,
    pub is_ticket_lock: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySignRawTx {
    pub tx_hex: String,
}

wallet_call! {
    GetAccountListRequest => GetAccountList -> WalletAccounts;
    GetAccountRequest => GetAccount -> WalletAccount;
    NewAccountRequest => NewAccount -> WalletAccount;
    TransactionListRequest => TransactionList -> WalletTxDetails;
    ImportPrivkeyRequest => ImportPrivkey -> WalletAccount;
    SendToAddressRequest => SendToAddress -> ReplyHash;
    SetFeeRequest => SetFee -> Reply;
    SetLabelRequest => SetLabel -> WalletAccount;
    MergeBalanceRequest => MergeBalance -> ReplyHashes;
    SetPasswdRequest => SetPasswd -> Reply;
    LockRequest => Lock -> Reply;
    UnLockRequest => UnLock -> Reply;
    GenSeedRequest => GenSeed -> ReplySeed;
    GetSeedRequest => GetSeed -> ReplySeed;
    SaveSeedRequest => SaveSeed -> Reply;
    GetWalletStatusRequest => GetWalletStatus -> WalletStatus;
    DumpPrivkeyRequest => DumpPrivkey -> ReplyString;
    DumpPrivkeysFileRequest => DumpPrivkeysFile -> Reply;
    ImportPrivkeysFileRequest => ImportPrivkeysFile -> Reply;
    SignRawTxRequest => SignRawTx -> ReplySignRawTx;
}

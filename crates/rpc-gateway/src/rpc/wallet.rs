//! Wallet operations.
//!
//! Every named operation goes through [`GatewayDispatcher::wallet`], which
//! takes the route from the request type's [`WalletCall::OP`].

use super::{validate_address, GatewayDispatcher};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::*;
use crate::domain::types::{Reply, ReplyHash, ReplyHashes, ReplyString};
use tracing::instrument;

impl GatewayDispatcher {
    /// Send a typed wallet request to the bus function its operation routes to.
    pub async fn wallet<C: WalletCall>(&self, req: &C) -> ApiResult<C::Response> {
        let (module, function) = C::OP.route();
        self.call(module, function, req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCOUNTS
    // ═══════════════════════════════════════════════════════════════════════

    #[instrument(skip(self))]
    pub async fn get_account_list(&self, req: GetAccountListRequest) -> ApiResult<WalletAccounts> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, req: GetAccountRequest) -> ApiResult<WalletAccount> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn new_account(&self, req: NewAccountRequest) -> ApiResult<WalletAccount> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn wallet_tx_list(&self, req: TransactionListRequest) -> ApiResult<WalletTxDetails> {
        if !req.address.is_empty() {
            validate_address(&req.address)?;
        }
        self.wallet(&req).await
    }

    /// ImportPrivkey - add a key to the wallet
    #[instrument(skip(self, req), fields(label = %req.label))]
    pub async fn import_privkey(&self, req: ImportPrivkeyRequest) -> ApiResult<WalletAccount> {
        if req.privkey.is_empty() {
            return Err(ApiError::invalid_param("privkey is required"));
        }
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn set_label(&self, req: SetLabelRequest) -> ApiResult<WalletAccount> {
        validate_address(&req.addr)?;
        if req.label.is_empty() {
            return Err(ApiError::invalid_param("label is required"));
        }
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn dump_privkey(&self, req: DumpPrivkeyRequest) -> ApiResult<ReplyString> {
        validate_address(&req.addr)?;
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn dump_privkeys_file(&self, req: DumpPrivkeysFileRequest) -> ApiResult<Reply> {
        if req.file_name.is_empty() {
            return Err(ApiError::invalid_param("file_name is required"));
        }
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn import_privkeys_file(&self, req: ImportPrivkeysFileRequest) -> ApiResult<Reply> {
        if req.file_name.is_empty() {
            return Err(ApiError::invalid_param("file_name is required"));
        }
        self.wallet(&req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSFERS
    // ═══════════════════════════════════════════════════════════════════════

    /// SendToAddress - transfer from a wallet account
    #[instrument(skip(self))]
    pub async fn send_to_address(&self, req: SendToAddressRequest) -> ApiResult<ReplyHash> {
        validate_address(&req.from)?;
        validate_address(&req.to)?;
        if req.amount <= 0 {
            return Err(ApiError::invalid_param("amount must be positive"));
        }
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn set_tx_fee(&self, req: SetFeeRequest) -> ApiResult<Reply> {
        if req.amount < 0 {
            return Err(ApiError::invalid_param("fee cannot be negative"));
        }
        self.wallet(&req).await
    }

    /// MergeBalance - move every account's balance to one address
    #[instrument(skip(self))]
    pub async fn merge_balance(&self, req: MergeBalanceRequest) -> ApiResult<ReplyHashes> {
        validate_address(&req.to)?;
        self.wallet(&req).await
    }

    /// SignRawTx - sign one member (or all) of an encoded transaction
    #[instrument(skip(self, req), fields(addr = %req.addr, index = req.index))]
    pub async fn sign_raw_tx(&self, req: SignRawTxRequest) -> ApiResult<ReplySignRawTx> {
        validate_address(&req.addr)?;
        shared_types::TxCodec::decode_hex_tx(&req.tx_hex)?;
        self.wallet(&req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOCK AND SEED
    // ═══════════════════════════════════════════════════════════════════════

    #[instrument(skip(self))]
    pub async fn set_passwd(&self, req: SetPasswdRequest) -> ApiResult<Reply> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn lock(&self) -> ApiResult<Reply> {
        self.wallet(&LockRequest {}).await
    }

    #[instrument(skip(self))]
    pub async fn unlock(&self, req: UnLockRequest) -> ApiResult<Reply> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn gen_seed(&self, req: GenSeedRequest) -> ApiResult<ReplySeed> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn get_seed(&self, req: GetSeedRequest) -> ApiResult<ReplySeed> {
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn save_seed(&self, req: SaveSeedRequest) -> ApiResult<Reply> {
        if req.seed.split_whitespace().count() < 12 {
            return Err(ApiError::invalid_param("seed needs at least 12 words"));
        }
        self.wallet(&req).await
    }

    #[instrument(skip(self))]
    pub async fn get_wallet_status(&self) -> ApiResult<WalletStatus> {
        self.wallet(&GetWalletStatusRequest {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::dispatcher;
    use super::*;
    use serde_json::json;
    use shared_bus::{BusError, Module, RecordingBus};
    use shared_types::pubkey_to_address;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_wallet_ops_route_to_their_function() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(Module::Wallet, "WalletLock", json!({ "is_ok": true, "msg": "" }));
        bus.respond(
            Module::Wallet,
            "GetWalletStatus",
            json!({ "is_wallet_lock": true, "is_auto_mining": false, "is_has_seed": true, "is_ticket_lock": true }),
        );

        let dispatcher = dispatcher(Arc::clone(&bus));
        assert!(dispatcher.lock().await.unwrap().is_ok);
        assert!(dispatcher.get_wallet_status().await.unwrap().is_wallet_lock);

        let functions: Vec<_> = bus.calls().into_iter().map(|c| c.function).collect();
        assert_eq!(functions, vec!["WalletLock", "GetWalletStatus"]);
        assert!(bus.calls().iter().all(|c| c.module == Module::Wallet));
    }

    #[tokio::test]
    async fn test_send_to_address_validates() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = dispatcher(Arc::clone(&bus));
        let from = pubkey_to_address(&[1u8; 33]);

        let bad_to = SendToAddressRequest {
            from: from.clone(),
            to: "nope".into(),
            amount: 10,
            ..Default::default()
        };
        assert!(matches!(
            dispatcher.send_to_address(bad_to).await,
            Err(ApiError::InvalidAddress { .. })
        ));

        let zero = SendToAddressRequest {
            from,
            to: pubkey_to_address(&[2u8; 33]),
            amount: 0,
            ..Default::default()
        };
        assert!(matches!(
            dispatcher.send_to_address(zero).await,
            Err(ApiError::InvalidParam(_))
        ));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_wallet_error_relayed() {
        let bus = Arc::new(RecordingBus::new());
        let locked = BusError::new(-20, "wallet is locked");
        bus.fail(Module::Wallet, "WalletSendToAddress", locked.clone());

        let req = SendToAddressRequest {
            from: pubkey_to_address(&[1u8; 33]),
            to: pubkey_to_address(&[2u8; 33]),
            amount: 10,
            ..Default::default()
        };
        assert_eq!(
            dispatcher(bus).send_to_address(req).await.unwrap_err(),
            ApiError::Downstream(locked)
        );
    }

    #[tokio::test]
    async fn test_generic_wallet_call() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(Module::Wallet, "GenSeed", json!({ "seed": "a b c" }));

        let seed = dispatcher(Arc::clone(&bus))
            .wallet(&GenSeedRequest { lang: 1 })
            .await
            .unwrap();
        assert_eq!(seed.seed, "a b c");
        assert_eq!(bus.calls()[0].request["lang"], json!(1));
    }
}

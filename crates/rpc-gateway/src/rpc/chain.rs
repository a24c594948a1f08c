//! Blockchain queries.

use super::{validate_address, GatewayDispatcher};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::*;
use shared_bus::Module;
use shared_types::TxCodec;
use tracing::instrument;

impl GatewayDispatcher {
    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// QueryTransaction - transaction detail with its receipt
    #[instrument(skip(self))]
    pub async fn query_transaction(&self, req: ReqHash) -> ApiResult<TransactionDetail> {
        self.call(Module::Blockchain, "QueryTx", &req).await
    }

    /// GetHexTxByHash - encoded transaction as `0x` hex
    #[instrument(skip(self))]
    pub async fn get_hex_tx_by_hash(&self, req: ReqHash) -> ApiResult<ReplyString> {
        let detail: TransactionDetail = self.call(Module::Blockchain, "QueryTx", &req).await?;
        Ok(ReplyString {
            data: TxCodec::to_hex(&TxCodec::encode(&detail.tx)),
        })
    }

    /// GetTxByAddr - transactions touching an address
    #[instrument(skip(self))]
    pub async fn get_transaction_by_addr(&self, req: ReqAddr) -> ApiResult<ReplyTxInfos> {
        validate_address(&req.addr)?;
        self.call(Module::Blockchain, "GetTransactionByAddr", &req).await
    }

    /// GetTxByHashes - details of several transactions; unknown hashes yield `None`
    #[instrument(skip(self, req), fields(count = req.hashes.len()))]
    pub async fn get_transaction_by_hashes(&self, req: ReqHashes) -> ApiResult<TransactionDetails> {
        self.call(Module::Blockchain, "GetTransactionByHash", &req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BLOCKS
    // ═══════════════════════════════════════════════════════════════════════

    /// GetBlocks - blocks in `start..=end`
    #[instrument(skip(self))]
    pub async fn get_blocks(&self, req: ReqBlocks) -> ApiResult<BlockDetails> {
        check_range(&req)?;
        self.call(Module::Blockchain, "GetBlocks", &req).await
    }

    /// GetLastHeader - header of the chain tip
    #[instrument(skip(self))]
    pub async fn get_last_header(&self) -> ApiResult<Header> {
        self.call(Module::Blockchain, "GetLastHeader", &ReqNil {}).await
    }

    /// GetHeaders - headers in `start..=end`
    #[instrument(skip(self))]
    pub async fn get_headers(&self, req: ReqBlocks) -> ApiResult<Headers> {
        check_range(&req)?;
        self.call(Module::Blockchain, "GetHeaders", &req).await
    }

    /// GetBlockOverview - header plus transaction hashes of one block
    #[instrument(skip(self))]
    pub async fn get_block_overview(&self, req: ReqHash) -> ApiResult<BlockOverview> {
        self.call(Module::Blockchain, "GetBlockOverview", &req).await
    }

    /// GetBlockHash - hash of the block at a height
    #[instrument(skip(self))]
    pub async fn get_block_hash(&self, req: ReqInt) -> ApiResult<ReplyHash> {
        if req.height < 0 {
            return Err(ApiError::invalid_param("height cannot be negative"));
        }
        self.call(Module::Blockchain, "GetBlockHash", &req).await
    }

    /// GetLastBlockSequence - latest block sequence number
    #[instrument(skip(self))]
    pub async fn get_last_block_sequence(&self) -> ApiResult<Int64> {
        self.call(Module::Blockchain, "GetLastBlockSequence", &ReqNil {}).await
    }

    /// GetBlockByHashes - full blocks by hash
    #[instrument(skip(self, req), fields(count = req.hashes.len()))]
    pub async fn get_block_by_hashes(&self, req: ReqHashes) -> ApiResult<BlockDetails> {
        self.call(Module::Blockchain, "GetBlockByHashes", &req).await
    }

    /// GetSequenceByHash - sequence number of a block
    #[instrument(skip(self))]
    pub async fn get_sequence_by_hash(&self, req: ReqHash) -> ApiResult<Int64> {
        self.call(Module::Blockchain, "GetSequenceByHash", &req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SYNC STATUS
    // ═══════════════════════════════════════════════════════════════════════

    /// IsSync - whether the node caught up with its peers
    #[instrument(skip(self))]
    pub async fn is_sync(&self) -> ApiResult<ReplyBool> {
        self.call(Module::Blockchain, "IsSync", &ReqNil {}).await
    }

    /// IsNtpClockSync - whether the local clock agrees with NTP
    #[instrument(skip(self))]
    pub async fn is_ntp_clock_sync(&self) -> ApiResult<ReplyBool> {
        self.call(Module::Blockchain, "IsNtpClockSync", &ReqNil {}).await
    }

    /// GetAddrOverview - received total, balance and tx count of an address
    #[instrument(skip(self))]
    pub async fn get_addr_overview(&self, req: ReqAddr) -> ApiResult<AddrOverview> {
        validate_address(&req.addr)?;
        self.call(Module::Blockchain, "GetAddrOverview", &req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PARACHAIN
    // ═══════════════════════════════════════════════════════════════════════

    /// LoadParaTxByTitle - block heights carrying transactions of a parachain
    #[instrument(skip(self))]
    pub async fn load_para_tx_by_title(
        &self,
        req: ReqHeightByTitle,
    ) -> ApiResult<serde_json::Value> {
        if req.title.is_empty() {
            return Err(ApiError::invalid_param("title is required"));
        }
        self.call(Module::Blockchain, "LoadParaTxByTitle", &req).await
    }

    /// GetParaTxByHeight - parachain transactions at the given heights
    #[instrument(skip(self))]
    pub async fn get_para_tx_by_height(
        &self,
        req: ReqParaTxByHeight,
    ) -> ApiResult<serde_json::Value> {
        if req.title.is_empty() {
            return Err(ApiError::invalid_param("title is required"));
        }
        if req.items.is_empty() {
            return Err(ApiError::invalid_param("at least one height is required"));
        }
        self.call(Module::Blockchain, "GetParaTxByHeight", &req).await
    }
}

fn check_range(req: &ReqBlocks) -> ApiResult<()> {
    if req.start < 0 || req.end < req.start {
        return Err(ApiError::invalid_param(format!(
            "invalid block range {}..={}",
            req.start, req.end
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::dispatcher;
    use super::*;
    use serde_json::json;
    use shared_bus::RecordingBus;
    use shared_types::{pubkey_to_address, Transaction};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hex_tx_by_hash_encodes_locally() {
        let bus = Arc::new(RecordingBus::new());
        let tx = Transaction::new("coins", vec![4, 5, 6]);
        let detail = TransactionDetail {
            tx: tx.clone(),
            height: 10,
            ..Default::default()
        };
        bus.respond(
            Module::Blockchain,
            "QueryTx",
            serde_json::to_value(&detail).unwrap(),
        );

        let reply = dispatcher(Arc::clone(&bus))
            .get_hex_tx_by_hash(ReqHash {
                hash: tx.hash(),
                upgrade: false,
            })
            .await
            .unwrap();
        assert_eq!(reply.data, TxCodec::to_hex(&TxCodec::encode(&tx)));
    }

    #[tokio::test]
    async fn test_address_checked_before_dispatch() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = dispatcher(Arc::clone(&bus));
        let req = ReqAddr {
            addr: "1BadAddress".into(),
            ..Default::default()
        };

        assert!(matches!(
            dispatcher.get_transaction_by_addr(req.clone()).await,
            Err(ApiError::InvalidAddress { .. })
        ));
        assert!(matches!(
            dispatcher.get_addr_overview(req).await,
            Err(ApiError::InvalidAddress { .. })
        ));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_addr_overview_forwards_valid_address() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(
            Module::Blockchain,
            "GetAddrOverview",
            json!({ "reciver": 10, "balance": 4, "tx_count": 2 }),
        );

        let addr = pubkey_to_address(&[3u8; 33]);
        let overview = dispatcher(Arc::clone(&bus))
            .get_addr_overview(ReqAddr {
                addr: addr.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(overview.tx_count, 2);
        assert_eq!(bus.calls()[0].request["addr"], json!(addr));
    }

    #[tokio::test]
    async fn test_block_range_validated() {
        let bus = Arc::new(RecordingBus::new());
        let result = dispatcher(Arc::clone(&bus))
            .get_blocks(ReqBlocks {
                start: 10,
                end: 5,
                is_detail: false,
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidParam(_))));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_is_sync() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(Module::Blockchain, "IsSync", json!({ "is_ok": true }));
        assert!(dispatcher(bus).is_sync().await.unwrap().is_ok);
    }
}

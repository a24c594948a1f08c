//! Executor, consensus, p2p and node queries.

use super::GatewayDispatcher;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::*;
use shared_bus::Module;
use shared_types::TxCodec;
use tracing::instrument;

/// Query function of the random-number executor query.
const RAND_NUM_FUNC: &str = "RandNumHash";

impl GatewayDispatcher {
    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    /// QueryChain - read-only query against an executor
    #[instrument(skip(self, req), fields(driver = %req.driver, func = %req.func_name))]
    pub async fn query_chain(&self, req: ChainExecutor) -> ApiResult<serde_json::Value> {
        check_executor(&req)?;
        self.call(Module::Execs, "Query", &req).await
    }

    /// QueryRandNum - random hash derived from recent blocks
    #[instrument(skip(self))]
    pub async fn query_rand_num(&self, req: ReqRandHash) -> ApiResult<ReplyHash> {
        if req.exec_name.is_empty() {
            return Err(ApiError::invalid_param("exec_name is required"));
        }
        let query = ChainExecutor {
            driver: req.exec_name.clone(),
            func_name: RAND_NUM_FUNC.to_string(),
            state_hash: String::new(),
            param: TxCodec::encode_payload(&req)?,
        };
        self.call(Module::Execs, "Query", &query).await
    }

    /// QueryConsensus - query against the consensus module
    #[instrument(skip(self, req), fields(driver = %req.driver, func = %req.func_name))]
    pub async fn query_consensus(&self, req: ChainExecutor) -> ApiResult<serde_json::Value> {
        check_executor(&req)?;
        self.call(Module::Consensus, "Query", &req).await
    }

    /// ExecWallet - wallet-side query of an executor plugin
    #[instrument(skip(self, req), fields(driver = %req.driver, func = %req.func_name))]
    pub async fn exec_wallet(&self, req: ChainExecutor) -> ApiResult<serde_json::Value> {
        check_executor(&req)?;
        self.call(Module::Wallet, "ExecWallet", &req).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // NODE
    // ═══════════════════════════════════════════════════════════════════════

    /// GetPeerInfo - connected peers
    #[instrument(skip(self))]
    pub async fn get_peer_info(&self) -> ApiResult<PeerList> {
        self.call(Module::P2p, "PeerInfo", &ReqNil {}).await
    }

    /// NetInfo - addresses and connection counts of this node
    #[instrument(skip(self))]
    pub async fn net_info(&self) -> ApiResult<NodeNetInfo> {
        self.call(Module::P2p, "GetNetInfo", &ReqNil {}).await
    }

    /// Version - node and chain versions
    #[instrument(skip(self))]
    pub async fn version(&self) -> ApiResult<VersionInfo> {
        self.call(Module::System, "Version", &ReqNil {}).await
    }

    /// GetCryptoList - signature schemes the node knows
    #[instrument(skip(self))]
    pub async fn get_crypto_list(&self) -> ApiResult<Vec<CryptoInfo>> {
        self.call(Module::System, "GetCryptoList", &ReqNil {}).await
    }
}

fn check_executor(req: &ChainExecutor) -> ApiResult<()> {
    if req.driver.is_empty() || req.func_name.is_empty() {
        return Err(ApiError::invalid_param("driver and func_name are required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::dispatcher;
    use super::*;
    use serde_json::json;
    use shared_bus::RecordingBus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_query_chain_routes_to_execs() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(Module::Execs, "Query", json!({ "count": 3 }));

        let req = ChainExecutor {
            driver: "ticket".into(),
            func_name: "TicketInfos".into(),
            ..Default::default()
        };
        let reply = dispatcher(Arc::clone(&bus)).query_chain(req).await.unwrap();
        assert_eq!(reply, json!({ "count": 3 }));
        assert_eq!(bus.calls_to(Module::Execs, "Query").len(), 1);
    }

    #[tokio::test]
    async fn test_query_requires_driver() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = dispatcher(Arc::clone(&bus));
        assert!(matches!(
            dispatcher.query_consensus(ChainExecutor::default()).await,
            Err(ApiError::InvalidParam(_))
        ));
        assert!(matches!(
            dispatcher.exec_wallet(ChainExecutor::default()).await,
            Err(ApiError::InvalidParam(_))
        ));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rand_num_wraps_request() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(
            Module::Execs,
            "Query",
            json!({ "hash": shared_types::TxHash([9; 32]) }),
        );

        let reply = dispatcher(Arc::clone(&bus))
            .query_rand_num(ReqRandHash {
                exec_name: "ticket".into(),
                height: 100,
                block_num: 5,
                hash: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(reply.hash, shared_types::TxHash([9; 32]));

        let call = &bus.calls()[0];
        assert_eq!(call.request["driver"], json!("ticket"));
        assert_eq!(call.request["func_name"], json!(RAND_NUM_FUNC));
    }

    #[tokio::test]
    async fn test_node_queries() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(
            Module::System,
            "Version",
            json!({ "title": "local", "app": "1.0", "chain": "1.0", "local_db": "1.0", "chain_id": 0 }),
        );
        bus.respond(
            Module::System,
            "GetCryptoList",
            json!([{ "name": "secp256k1", "type_id": 1, "enable": true }]),
        );

        let dispatcher = dispatcher(Arc::clone(&bus));
        assert_eq!(dispatcher.version().await.unwrap().title, "local");
        assert_eq!(dispatcher.get_crypto_list().await.unwrap()[0].name, "secp256k1");
    }
}

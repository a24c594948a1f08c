//! Mempool operations.

use super::GatewayDispatcher;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::*;
use shared_bus::Module;
use shared_types::{Transaction, TxHash};
use tracing::{debug, instrument};

impl GatewayDispatcher {
    // ═══════════════════════════════════════════════════════════════════════
    // SUBMISSION
    // ═══════════════════════════════════════════════════════════════════════

    /// SendTransaction - submit one transaction to the mempool
    #[instrument(skip(self, tx), fields(hash = %tx.hash()))]
    pub async fn send_transaction(&self, tx: Transaction) -> ApiResult<ReplyHash> {
        self.call(Module::Mempool, "SendTx", &tx).await
    }

    /// SendTransactionSync - submit, then look the transaction up once
    ///
    /// `detail` is `None` when the chain does not know the transaction yet.
    #[instrument(skip(self, tx), fields(hash = %tx.hash()))]
    pub async fn send_transaction_sync(&self, tx: Transaction) -> ApiResult<ReplySendTxSync> {
        let sent: ReplyHash = self.call(Module::Mempool, "SendTx", &tx).await?;

        let query = ReqHash {
            hash: sent.hash,
            upgrade: false,
        };
        let detail = match self
            .call::<_, TransactionDetail>(Module::Blockchain, "QueryTx", &query)
            .await
        {
            Ok(detail) => Some(detail),
            Err(ApiError::Downstream(e)) => {
                debug!(hash = %sent.hash, error = %e, "Transaction not yet queryable");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(ReplySendTxSync {
            hash: sent.hash,
            detail,
        })
    }

    /// SendTransactions - submit a batch, one mempool call per transaction
    ///
    /// Answers carry one entry per input in input order. A transaction the
    /// mempool rejected gets a zero hash and its error.
    #[instrument(skip(self, txs), fields(count = txs.len()))]
    pub async fn send_transactions(&self, txs: Vec<Transaction>) -> ApiResult<ReplySendTxs> {
        let mut reply = ReplySendTxs {
            hashes: Vec::with_capacity(txs.len()),
            errors: Vec::with_capacity(txs.len()),
        };

        for tx in &txs {
            match self.call::<_, ReplyHash>(Module::Mempool, "SendTx", tx).await {
                Ok(sent) => {
                    reply.hashes.push(sent.hash);
                    reply.errors.push(None);
                }
                Err(ApiError::Downstream(e)) => {
                    reply.hashes.push(TxHash::ZERO);
                    reply.errors.push(Some(e));
                }
                Err(e) => return Err(e),
            }
        }

        let rejected = reply.errors.iter().filter(|e| e.is_some()).count();
        debug!(accepted = txs.len() - rejected, rejected, "Batch submitted");
        Ok(reply)
    }

    /// SendDelayTransaction - submit a transaction released at a later time or height
    #[instrument(skip(self, delay), fields(end = delay.end_delay_time))]
    pub async fn send_delay_transaction(&self, delay: DelayTx) -> ApiResult<ReplyHash> {
        if delay.end_delay_time <= 0 {
            return Err(ApiError::invalid_param("end_delay_time must be positive"));
        }
        self.call(Module::Mempool, "SendDelayTx", &delay).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    /// GetMempool - pending transactions
    #[instrument(skip(self))]
    pub async fn get_mempool(&self, req: ReqGetMempool) -> ApiResult<ReplyTxList> {
        self.call(Module::Mempool, "GetMempool", &req).await
    }

    /// GetLastMempool - most recently accepted transactions
    #[instrument(skip(self))]
    pub async fn get_last_mempool(&self) -> ApiResult<ReplyTxList> {
        self.call(Module::Mempool, "GetLastMempool", &ReqNil {}).await
    }

    /// GetProperFee - fee rate suggested by the mempool
    #[instrument(skip(self))]
    pub async fn get_proper_fee(&self, req: ReqProperFee) -> ApiResult<ReplyProperFee> {
        self.call(Module::Mempool, "GetProperFee", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::dispatcher;
    use super::*;
    use serde_json::json;
    use shared_bus::{BusError, RecordingBus};
    use std::sync::Arc;

    fn tx(nonce: i64) -> Transaction {
        Transaction {
            nonce,
            ..Transaction::new("coins", vec![nonce as u8])
        }
    }

    fn ack_hash(bus: &RecordingBus) {
        bus.respond_with(Module::Mempool, "SendTx", |req| {
            let tx: Transaction = serde_json::from_value(req.clone())
                .map_err(|e| BusError::new(-1, e.to_string()))?;
            Ok(json!({ "hash": tx.hash() }))
        });
    }

    #[tokio::test]
    async fn test_send_transaction() {
        let bus = Arc::new(RecordingBus::new());
        ack_hash(&bus);

        let reply = dispatcher(Arc::clone(&bus))
            .send_transaction(tx(1))
            .await
            .unwrap();
        assert_eq!(reply.hash, tx(1).hash());
        assert_eq!(bus.calls_to(Module::Mempool, "SendTx").len(), 1);
    }

    #[tokio::test]
    async fn test_send_transactions_partial_failure() {
        let bus = Arc::new(RecordingBus::new());
        let error = BusError::new(-5, "duplicate transaction");
        bus.respond_once(Module::Mempool, "SendTx", Ok(json!({ "hash": tx(0).hash() })));
        bus.respond_once(Module::Mempool, "SendTx", Err(error.clone()));
        bus.respond_once(Module::Mempool, "SendTx", Ok(json!({ "hash": tx(2).hash() })));

        let reply = dispatcher(Arc::clone(&bus))
            .send_transactions(vec![tx(0), tx(1), tx(2)])
            .await
            .unwrap();
        assert_eq!(reply.hashes, vec![tx(0).hash(), TxHash::ZERO, tx(2).hash()]);
        assert_eq!(reply.errors, vec![None, Some(error), None]);
    }

    #[tokio::test]
    async fn test_send_transaction_sync_without_detail() {
        let bus = Arc::new(RecordingBus::new());
        ack_hash(&bus);
        bus.fail(Module::Blockchain, "QueryTx", BusError::new(-2, "not found"));

        let reply = dispatcher(Arc::clone(&bus))
            .send_transaction_sync(tx(3))
            .await
            .unwrap();
        assert_eq!(reply.hash, tx(3).hash());
        assert!(reply.detail.is_none());

        let query = &bus.calls_to(Module::Blockchain, "QueryTx")[0];
        assert_eq!(query.request["hash"], json!(tx(3).hash()));
    }

    #[tokio::test]
    async fn test_delay_tx_validated_locally() {
        let bus = Arc::new(RecordingBus::new());
        let result = dispatcher(Arc::clone(&bus))
            .send_delay_transaction(DelayTx {
                tx: tx(1),
                end_delay_time: 0,
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidParam(_))));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_proper_fee_forwards_request() {
        let bus = Arc::new(RecordingBus::new());
        bus.respond(Module::Mempool, "GetProperFee", json!({ "proper_fee": 123 }));

        let reply = dispatcher(Arc::clone(&bus))
            .get_proper_fee(ReqProperFee {
                tx_count: 2,
                tx_size: 300,
            })
            .await
            .unwrap();
        assert_eq!(reply.proper_fee, 123);
        assert_eq!(bus.calls()[0].request, json!({ "tx_count": 2, "tx_size": 300 }));
    }
}

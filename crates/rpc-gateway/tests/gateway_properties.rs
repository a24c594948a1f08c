//! # Gateway Integration Tests
//!
//! End-to-end properties of the dispatcher, exercised through its public
//! operations against the recording bus and against the channel bus with a
//! served mempool.

use std::sync::Arc;

use async_trait::async_trait;
use chain_forks::{ForkConfig, ForkTable, ForkTableBuilder, DEFAULT_TITLE};
use rpc_gateway::domain::methods::{DumpPrivkeyRequest, LockRequest, WalletCall, WalletOp};
use rpc_gateway::{
    ApiError, CreateTransactionGroup, CreateTxIn, FixedClock, GatewayConfig, GatewayDispatcher,
    ReWriteRawTx, ReqBalance, ReqKey, TxGroup,
};
use serde_json::json;
use shared_bus::{BusError, ChannelModuleBus, Module, ModuleHandler, RecordingBus};
use shared_types::{pubkey_to_address, Transaction, TxCodec};

const NOW: u64 = 1_700_000_000;

fn gateway(bus: Arc<RecordingBus>) -> GatewayDispatcher {
    let config = GatewayConfig::default();
    let forks = Arc::new(config.fork_table().unwrap());
    GatewayDispatcher::new(&config, forks, bus).with_clock(Arc::new(FixedClock::new(NOW)))
}

fn tx(nonce: i64, fee: i64) -> Transaction {
    Transaction {
        execer: b"coins".to_vec(),
        payload: nonce.to_le_bytes().to_vec(),
        fee,
        nonce,
        to: pubkey_to_address(&[nonce as u8; 33]),
        ..Default::default()
    }
}

fn hex(tx: &Transaction) -> String {
    TxCodec::to_hex(&TxCodec::encode(tx))
}

// =============================================================================
// GROUPS
// =============================================================================

#[tokio::test]
async fn test_group_needs_two_members() {
    let bus = Arc::new(RecordingBus::new());
    let gateway = gateway(Arc::clone(&bus));

    let empty = gateway
        .create_raw_tx_group(CreateTransactionGroup { txs: vec![] })
        .await;
    assert_eq!(empty.unwrap_err(), ApiError::GroupTooSmall { count: 0 });

    let single = gateway
        .create_raw_tx_group(CreateTransactionGroup {
            txs: vec![hex(&tx(1, 0))],
        })
        .await;
    assert_eq!(single.unwrap_err(), ApiError::GroupTooSmall { count: 1 });
    assert_eq!(bus.call_count(), 0);
}

#[tokio::test]
async fn test_group_links_survive_encoding() {
    let gateway = gateway(Arc::new(RecordingBus::new()));

    for n in [2usize, 3, 7, 20] {
        let txs = (0..n as i64).map(|i| hex(&tx(i, 0))).collect();
        let bytes = gateway
            .create_raw_tx_group(CreateTransactionGroup { txs })
            .await
            .unwrap();

        let group = TxGroup::decode(&bytes).unwrap();
        let members = group.members();
        assert_eq!(members.len(), n);
        for i in 0..n - 1 {
            assert_eq!(members[i].next, Some(members[i + 1].hash()));
        }
        for member in members {
            assert_eq!(member.header, Some(members[0].hash()));
        }
    }
}

#[tokio::test]
async fn test_group_fee_lands_on_head() {
    let gateway = gateway(Arc::new(RecordingBus::new()));

    let zero_fees = gateway
        .create_raw_tx_group(CreateTransactionGroup {
            txs: vec![hex(&tx(1, 0)), hex(&tx(2, 0)), hex(&tx(3, 0))],
        })
        .await
        .unwrap();
    let group = TxGroup::decode(&zero_fees).unwrap();
    assert!(group.members().iter().all(|member| member.fee == 0));

    let paid = gateway
        .create_raw_tx_group(CreateTransactionGroup {
            txs: vec![hex(&tx(1, 0)), hex(&tx(2, 300)), hex(&tx(3, 700))],
        })
        .await
        .unwrap();
    let group = TxGroup::decode(&paid).unwrap();
    let fees: Vec<_> = group.members().iter().map(|member| member.fee).collect();
    assert_eq!(fees, vec![1_000, 0, 0]);
}

#[tokio::test]
async fn test_default_fee_rate_does_not_raise_group_fee() {
    assert!(GatewayConfig::default().chain.min_tx_fee_rate > 0);
    let gateway = gateway(Arc::new(RecordingBus::new()));

    for (members, expected) in [
        ([tx(1, 0), tx(2, 0), tx(3, 0)], vec![0, 0, 0]),
        ([tx(1, 10), tx(2, 0), tx(3, 5)], vec![15, 0, 0]),
    ] {
        let bytes = gateway
            .create_raw_tx_group(CreateTransactionGroup {
                txs: members.iter().map(hex).collect(),
            })
            .await
            .unwrap();
        let group = TxGroup::decode(&bytes).unwrap();
        let fees: Vec<_> = group.members().iter().map(|member| member.fee).collect();
        assert_eq!(fees, expected);
    }
}

// =============================================================================
// REWRITE
// =============================================================================

#[tokio::test]
async fn test_rewrite_changes_bytes_and_reflects_overrides() {
    let gateway = gateway(Arc::new(RecordingBus::new()));
    let original = TxCodec::encode(&tx(1, 100));
    let to = pubkey_to_address(&[42u8; 33]);

    let reply = gateway
        .rewrite_raw_tx(ReWriteRawTx {
            tx: TxCodec::to_hex(&original),
            fee: 5_000,
            to: to.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_ne!(reply.data, original);

    let decoded = TxCodec::decode(&reply.data).unwrap();
    assert_eq!(decoded.fee, 5_000);
    assert_eq!(decoded.to, to);
}

#[tokio::test]
async fn test_rewrite_inside_group_keeps_links() {
    let gateway = gateway(Arc::new(RecordingBus::new()));
    let group = gateway
        .create_raw_tx_group(CreateTransactionGroup {
            txs: vec![hex(&tx(1, 0)), hex(&tx(2, 0))],
        })
        .await
        .unwrap();

    let reply = gateway
        .rewrite_raw_tx(ReWriteRawTx {
            tx: TxCodec::to_hex(&group),
            expire: "600s".into(),
            index: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_ne!(reply.data, group);

    let rewritten = TxGroup::decode(&reply.data).unwrap();
    assert_eq!(rewritten.members()[1].expire, NOW as i64 + 600);
}

// =============================================================================
// FORKS
// =============================================================================

#[tokio::test]
async fn test_registered_title_fork_resolves() {
    let mut builder = ForkTableBuilder::local();
    builder.register("para", "fork100", 100).unwrap();
    let forks: ForkTable = builder.build();
    assert_eq!(forks.resolve("para", "fork100"), 100);
    assert_eq!(forks.resolve(DEFAULT_TITLE, "ForkBlockHash"), 1);

    let config = GatewayConfig::default();
    let gateway = GatewayDispatcher::new(
        &config,
        Arc::new(forks),
        Arc::new(RecordingBus::new()),
    );
    let height = gateway
        .get_fork(ReqKey {
            key: "para-fork100".into(),
        })
        .await
        .unwrap();
    assert_eq!(height.height, 100);
}

#[tokio::test]
async fn test_forks_from_config() {
    let fork = ForkConfig::parse(
        r#"
        [system]
        ForkTxHeight = 10

        [sub.para]
        fork100 = 100
        "#,
    )
    .unwrap();
    let config = GatewayConfig {
        fork,
        ..GatewayConfig::default()
    };
    let forks = Arc::new(config.fork_table().unwrap());
    let gateway = GatewayDispatcher::new(&config, forks, Arc::new(RecordingBus::new()));

    let key = |key: &str| ReqKey { key: key.into() };
    assert_eq!(gateway.get_fork(key("local-ForkTxHeight")).await.unwrap().height, 10);
    assert_eq!(gateway.get_fork(key("para-fork100")).await.unwrap().height, 100);
}

// =============================================================================
// DISPATCH
// =============================================================================

#[tokio::test]
async fn test_invalid_address_never_reaches_bus() {
    let bus = Arc::new(RecordingBus::new());
    let gateway = gateway(Arc::clone(&bus));

    let result = gateway
        .get_balance(ReqBalance {
            addresses: vec!["1NotAnAddress".into()],
            execer: "coins".into(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidAddress { .. })));

    let result = gateway
        .dump_privkey(DumpPrivkeyRequest {
            addr: "0xabc".into(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidAddress { .. })));

    assert!(bus.calls().is_empty());
}

#[tokio::test]
async fn test_send_transactions_preserves_order() {
    let bus = Arc::new(RecordingBus::new());
    bus.respond_with(Module::Mempool, "SendTx", |req| {
        let tx: Transaction =
            serde_json::from_value(req.clone()).map_err(|e| BusError::new(-1, e.to_string()))?;
        Ok(json!({ "hash": tx.hash() }))
    });

    let txs: Vec<_> = (0..10).map(|i| tx(i, 0)).collect();
    let reply = gateway(Arc::clone(&bus))
        .send_transactions(txs.clone())
        .await
        .unwrap();

    let expected: Vec<_> = txs.iter().map(Transaction::hash).collect();
    assert_eq!(reply.hashes, expected);
    assert!(reply.errors.iter().all(Option::is_none));
    assert_eq!(bus.calls_to(Module::Mempool, "SendTx").len(), 10);
}

#[tokio::test]
async fn test_downstream_error_is_relayed_unchanged() {
    let bus = Arc::new(RecordingBus::new());
    let error = BusError::new(-13, "ErrTxExpire");
    bus.fail(Module::Mempool, "SendTx", error.clone());

    let result = gateway(Arc::clone(&bus)).send_transaction(tx(1, 0)).await;
    assert_eq!(result.unwrap_err(), ApiError::Downstream(error));
}

#[tokio::test]
async fn test_wallet_operations_use_their_route() {
    let bus = Arc::new(RecordingBus::new());
    let (module, function) = WalletOp::Lock.route();
    bus.respond(module, function, json!({ "is_ok": true, "msg": "" }));

    let reply = gateway(Arc::clone(&bus))
        .wallet(&LockRequest {})
        .await
        .unwrap();
    assert!(reply.is_ok);
    assert_eq!(bus.calls()[0].module, Module::Wallet);
    assert_eq!(bus.calls()[0].function, function);
    assert_eq!(<LockRequest as WalletCall>::OP, WalletOp::Lock);
}

#[tokio::test]
async fn test_unknown_executor_is_unsupported() {
    let bus = Arc::new(RecordingBus::new());
    let result = gateway(Arc::clone(&bus))
        .create_transaction(CreateTxIn {
            execer: "evm".into(),
            action_name: "Deploy".into(),
            payload: json!({}),
        })
        .await;
    assert!(matches!(result, Err(ApiError::UnsupportedAction(_))));
    assert_eq!(bus.call_count(), 0);
}

// =============================================================================
// CHANNEL BUS
// =============================================================================

/// Mempool stand-in that acknowledges every transaction with its hash.
struct AckMempool;

#[async_trait]
impl ModuleHandler for AckMempool {
    async fn handle(
        &self,
        function: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, BusError> {
        match function {
            "SendTx" => {
                let tx: Transaction = serde_json::from_value(request)
                    .map_err(|e| BusError::new(-1, e.to_string()))?;
                Ok(json!({ "hash": tx.hash() }))
            }
            other => Err(BusError::new(-2, format!("unsupported {}", other))),
        }
    }
}

#[tokio::test]
async fn test_dispatch_over_channel_bus() {
    let bus = Arc::new(ChannelModuleBus::new());
    let _mempool = bus.serve(Module::Mempool, AckMempool);

    let config = GatewayConfig::default();
    let forks = Arc::new(config.fork_table().unwrap());
    let gateway = GatewayDispatcher::new(&config, forks, bus);

    let tx = tx(7, 0);
    let reply = gateway.send_transaction(tx.clone()).await.unwrap();
    assert_eq!(reply.hash, tx.hash());

    let unavailable = gateway.get_last_header().await.unwrap_err();
    assert_eq!(
        unavailable,
        ApiError::Downstream(BusError::unavailable(Module::Blockchain))
    );
}

//! Balance queries against the state store.

use super::{validate_address, GatewayDispatcher};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::*;
use shared_bus::Module;
use tracing::instrument;

impl GatewayDispatcher {
    /// GetBalance - balances of several addresses in one executor
    ///
    /// Every address is checked before the store is asked; one bad address
    /// rejects the whole request.
    #[instrument(skip(self, req), fields(count = req.addresses.len(), execer = %req.execer))]
    pub async fn get_balance(&self, req: ReqBalance) -> ApiResult<Vec<Account>> {
        if req.addresses.is_empty() {
            return Err(ApiError::invalid_param("at least one address is required"));
        }
        if req.execer.is_empty() {
            return Err(ApiError::invalid_param("execer is required"));
        }
        for addr in &req.addresses {
            validate_address(addr)?;
        }
        self.call(Module::Store, "GetBalance", &req).await
    }

    /// GetAllExecBalance - balance of one address across every executor
    #[instrument(skip(self))]
    pub async fn get_all_exec_balance(&self, req: ReqAllExecBalance) -> ApiResult<AllExecBalance> {
        validate_address(&req.addr)?;
        self.call(Module::Store, "GetAllExecBalance", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::dispatcher;
    use super::*;
    use serde_json::json;
    use shared_bus::{BusError, RecordingBus};
    use shared_types::pubkey_to_address;
    use std::sync::Arc;

    fn balance_req(addresses: Vec<String>) -> ReqBalance {
        ReqBalance {
            addresses,
            execer: "coins".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_address_never_reaches_store() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = dispatcher(Arc::clone(&bus));

        let good = pubkey_to_address(&[1u8; 33]);
        for bad in ["", "xyz", "0x1234", "1BadAddress"] {
            let result = dispatcher
                .get_balance(balance_req(vec![good.clone(), bad.to_string()]))
                .await;
            assert!(
                matches!(result, Err(ApiError::InvalidAddress { .. })),
                "{:?}",
                bad
            );
        }
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let bus = Arc::new(RecordingBus::new());
        let dispatcher = dispatcher(Arc::clone(&bus));

        assert!(matches!(
            dispatcher.get_balance(balance_req(vec![])).await,
            Err(ApiError::InvalidParam(_))
        ));
        let no_execer = ReqBalance {
            execer: String::new(),
            ..balance_req(vec![pubkey_to_address(&[1u8; 33])])
        };
        assert!(matches!(
            dispatcher.get_balance(no_execer).await,
            Err(ApiError::InvalidParam(_))
        ));
        assert_eq!(bus.call_count(), 0);
    }

    #[tokio::test]
    async fn test_balance_forwarded() {
        let bus = Arc::new(RecordingBus::new());
        let addr = pubkey_to_address(&[1u8; 33]);
        bus.respond(
            Module::Store,
            "GetBalance",
            json!([{ "currency": 0, "balance": 500, "frozen": 0, "addr": addr }]),
        );

        let accounts = dispatcher(Arc::clone(&bus))
            .get_balance(balance_req(vec![addr.clone()]))
            .await
            .unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, 500);
        assert_eq!(bus.calls()[0].request["addresses"], json!([addr]));
    }

    #[tokio::test]
    async fn test_store_error_relayed() {
        let bus = Arc::new(RecordingBus::new());
        let error = BusError::new(-3, "state hash not found");
        bus.fail(Module::Store, "GetAllExecBalance", error.clone());

        let result = dispatcher(Arc::clone(&bus))
            .get_all_exec_balance(ReqAllExecBalance {
                addr: pubkey_to_address(&[1u8; 33]),
                ..Default::default()
            })
            .await;
        assert_eq!(result.unwrap_err(), ApiError::Downstream(error));
    }
}

//! # Channel Module Bus
//!
//! Production bus: every registered module owns an mpsc queue of
//! [`BusRequest`]s, each carrying a oneshot sender for its answer.

use crate::bus::{BusError, ModuleBus};
use crate::module::Module;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// One request delivered to a module queue.
#[derive(Debug)]
pub struct BusRequest {
    /// Correlation ID for logs.
    pub id: Uuid,
    pub module: Module,
    pub function: String,
    pub payload: serde_json::Value,
    reply: oneshot::Sender<Result<serde_json::Value, BusError>>,
}

impl BusRequest {
    /// Answer the request. Returns false if the caller is gone.
    pub fn reply(self, result: Result<serde_json::Value, BusError>) -> bool {
        self.reply.send(result).is_ok()
    }
}

/// Async request handler for a module served by [`ChannelModuleBus::serve`].
#[async_trait]
pub trait ModuleHandler: Send + Sync + 'static {
    async fn handle(
        &self,
        function: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, BusError>;
}

/// Bus routing each module to its own tokio queue.
pub struct ChannelModuleBus {
    routes: RwLock<HashMap<Module, mpsc::Sender<BusRequest>>>,
    capacity: usize,
}

impl ChannelModuleBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a module and return the receiving end of its queue.
    ///
    /// Registering a module again replaces its queue; requests already queued
    /// on the old one stay there.
    pub fn register(&self, module: Module) -> mpsc::Receiver<BusRequest> {
        let (tx, rx) = mpsc::channel(self.capacity);
        if self.routes.write().insert(module, tx).is_some() {
            warn!(module = %module, "Module queue replaced");
        }
        debug!(module = %module, "Module registered on bus");
        rx
    }

    pub fn unregister(&self, module: Module) -> bool {
        self.routes.write().remove(&module).is_some()
    }

    pub fn is_registered(&self, module: Module) -> bool {
        self.routes.read().contains_key(&module)
    }

    /// Register a module and answer its queue with `handler` on a tokio task.
    pub fn serve<H: ModuleHandler>(&self, module: Module, handler: H) -> JoinHandle<()> {
        let mut rx = self.register(module);
        let handler = Arc::new(handler);
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let result = handler
                    .handle(&request.function, request.payload.clone())
                    .await;
                let id = request.id;
                if !request.reply(result) {
                    debug!(module = %module, request_id = %id, "Caller dropped before reply");
                }
            }
            debug!(module = %module, "Module queue closed");
        })
    }

    fn route(&self, module: Module) -> Option<mpsc::Sender<BusRequest>> {
        self.routes.read().get(&module).cloned()
    }
}

impl Default for ChannelModuleBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleBus for ChannelModuleBus {
    async fn send(
        &self,
        module: Module,
        function: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, BusError> {
        let Some(route) = self.route(module) else {
            warn!(module = %module, function, "No queue registered for module");
            return Err(BusError::unavailable(module));
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let id = Uuid::now_v7();
        let envelope = BusRequest {
            id,
            module,
            function: function.to_string(),
            payload: request,
            reply: reply_tx,
        };

        if route.send(envelope).await.is_err() {
            warn!(module = %module, function, "Module queue dropped");
            return Err(BusError::unavailable(module));
        }
        debug!(request_id = %id, module = %module, function, "Sent bus request");

        match reply_rx.await {
            Ok(result) => {
                debug!(
                    request_id = %id,
                    module = %module,
                    function,
                    ok = result.is_ok(),
                    "Received bus reply"
                );
                result
            }
            Err(_) => Err(BusError::no_reply(module, function)),
        }
    }
}

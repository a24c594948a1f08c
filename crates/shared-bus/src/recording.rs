//! # Recording Bus
//!
//! In-process fake of [`ModuleBus`]: keeps a log of every call and answers
//! from responses programmed per `(module, function)`.
//!
//! One-shot responses are consumed first, in the order they were queued;
//! after that the sticky responder for the pair answers. Calls with neither
//! fail with [`codes::NOT_PROGRAMMED`].

use crate::bus::{codes, BusError, ModuleBus};
use crate::module::Module;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

type Responder =
    Arc<dyn Fn(&serde_json::Value) -> Result<serde_json::Value, BusError> + Send + Sync>;

/// A call observed by the recording bus.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub module: Module,
    pub function: String,
    pub request: serde_json::Value,
}

#[derive(Default)]
pub struct RecordingBus {
    calls: Mutex<Vec<RecordedCall>>,
    once: Mutex<HashMap<(Module, String), VecDeque<Result<serde_json::Value, BusError>>>>,
    sticky: Mutex<HashMap<(Module, String), Responder>>,
}

impl RecordingBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `module.function` with `response`.
    pub fn respond(&self, module: Module, function: &str, response: serde_json::Value) {
        self.respond_with(module, function, move |_| Ok(response.clone()));
    }

    /// Always fail `module.function` with `error`.
    pub fn fail(&self, module: Module, function: &str, error: BusError) {
        self.respond_with(module, function, move |_| Err(error.clone()));
    }

    /// Answer `module.function` by computing from the request.
    pub fn respond_with<F>(&self, module: Module, function: &str, responder: F)
    where
        F: Fn(&serde_json::Value) -> Result<serde_json::Value, BusError> + Send + Sync + 'static,
    {
        self.sticky
            .lock()
            .insert((module, function.to_string()), Arc::new(responder));
    }

    /// Queue a single answer for the next call to `module.function`.
    pub fn respond_once(
        &self,
        module: Module,
        function: &str,
        response: Result<serde_json::Value, BusError>,
    ) {
        self.once
            .lock()
            .entry((module, function.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, module: Module, function: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.module == module && call.function == function)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl ModuleBus for RecordingBus {
    async fn send(
        &self,
        module: Module,
        function: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, BusError> {
        self.calls.lock().push(RecordedCall {
            module,
            function: function.to_string(),
            request: request.clone(),
        });

        let key = (module, function.to_string());
        if let Some(queued) = self.once.lock().get_mut(&key).and_then(VecDeque::pop_front) {
            return queued;
        }

        // Clone out so the responder runs without holding the lock.
        let responder = self.sticky.lock().get(&key).cloned();
        match responder {
            Some(responder) => responder(&request),
            None => Err(BusError::new(
                codes::NOT_PROGRAMMED,
                format!("no response programmed for {}.{}", module, function),
            )),
        }
    }
}

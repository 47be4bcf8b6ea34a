//! In-process bus source fed from a paired [`BusPublisher`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Arrival, BusSnapshot, BusSource, Router, ServiceCall, SourceError};

type Handler = Box<dyn Fn(&Value) -> Result<Value, String> + Send>;
type Handlers = Arc<Mutex<HashMap<String, Handler>>>;

/// Sending half of a [`ChannelSource`]; clone it freely across tasks
#[derive(Clone)]
pub struct BusPublisher {
    snapshots: mpsc::UnboundedSender<BusSnapshot>,
    router: Router,
    handlers: Handlers,
}

impl BusPublisher {
    pub fn publish_snapshot(&self, snapshot: BusSnapshot) -> Result<(), SourceError> {
        self.snapshots.send(snapshot).map_err(|_| SourceError::Disconnected)
    }

    /// Publish one message. Returns whether a subscriber received it.
    pub fn publish(&self, topic: &str, type_name: &str, value: Value) -> bool {
        let size = serde_json::to_vec(&value).map(|bytes| bytes.len() as u64).unwrap_or(0);
        self.router.deliver(Arrival {
            topic: topic.to_string(),
            value,
            type_name: type_name.to_string(),
            size,
            publisher: None,
            received_at: Instant::now(),
        })
    }

    /// Deliver a fully formed arrival, e.g. with an explicit size or
    /// publisher
    pub fn publish_arrival(&self, arrival: Arrival) -> bool {
        self.router.deliver(arrival)
    }

    /// Answer calls to `service` with `handler`, replacing any earlier one
    pub fn advertise_service<F>(&self, service: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, String> + Send + 'static,
    {
        debug!(%service, "Advertised service");
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), Box::new(handler));
    }
}

pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<BusSnapshot>,
    router: Router,
    handlers: Handlers,
    description: String,
    last_error: Option<String>,
}

impl ChannelSource {
    pub fn create(description: &str) -> (BusPublisher, ChannelSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = Router::new();
        let handlers: Handlers = Arc::default();
        let publisher = BusPublisher {
            snapshots: tx,
            router: router.clone(),
            handlers: handlers.clone(),
        };
        let source = ChannelSource {
            receiver: rx,
            router,
            handlers,
            description: format!("channel: {}", description),
            last_error: None,
        };
        (publisher, source)
    }
}

impl BusSource for ChannelSource {
    fn poll(&mut self) -> Option<BusSnapshot> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.last_error = Some(SourceError::Disconnected.to_string());
                    break;
                }
            }
        }
        latest
    }

    fn router(&self) -> &Router {
        &self.router
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }

    /// Handlers run inline, so the call is answered before it is returned
    fn call_service(&self, service: &str, request: Value) -> Result<ServiceCall, SourceError> {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let handler =
            handlers.get(service).ok_or_else(|| SourceError::UnknownService(service.to_string()))?;
        let (reply, call) = ServiceCall::new(service);
        let _ = reply.send(handler(&request));
        Ok(call)
    }
}

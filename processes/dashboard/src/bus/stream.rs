//! Stream-based bus source.
//!
//! Reads newline-delimited JSON [`BusEvent`]s from an async byte stream,
//! such as a TCP connection to a bridge on the bus, and writes service
//! calls back as [`Request`] lines.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::call::Reply;
use super::{Arrival, BusSnapshot, BusSource, Router, ServiceCall, SourceError};

/// One line of the event stream
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusEvent {
    Snapshot(BusSnapshot),
    Message(MessageEvent),
    Response(ResponseEvent),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    pub topic: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    pub value: Value,
    /// Serialized size; the JSON line length is used when absent
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub publisher: Option<String>,
}

/// Answer to a [`Request::Call`] with the same id
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEvent {
    pub id: u64,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResponseEvent {
    fn into_reply(self) -> Reply {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

/// One line written back to the bridge
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Call { id: u64, service: String, request: Value },
}

type SharedError = Arc<Mutex<Option<String>>>;
type PendingCalls = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

fn set_error(slot: &SharedError, error: Option<String>) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = error;
}

/// A bus source fed by a background task reading an async stream.
///
/// Only the newest snapshot is kept for [`BusSource::poll`], so a slow
/// poller never stalls the reader; messages go straight to the router as
/// they are read.
pub struct StreamSource {
    snapshots: watch::Receiver<Option<BusSnapshot>>,
    calls: mpsc::UnboundedSender<Request>,
    pending: PendingCalls,
    next_id: AtomicU64,
    description: String,
    router: Router,
    last_error: SharedError,
}

impl StreamSource {
    /// Spawn the reader and writer tasks. Must be called within a tokio
    /// runtime.
    pub fn spawn<R, W>(reader: R, writer: W, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (call_tx, call_rx) = mpsc::unbounded_channel();
        let router = Router::new();
        let pending: PendingCalls = Arc::default();
        let last_error: SharedError = Arc::new(Mutex::new(None));

        tokio::spawn(read_events(
            reader,
            snapshot_tx,
            router.clone(),
            pending.clone(),
            last_error.clone(),
        ));
        tokio::spawn(write_calls(writer, call_rx, pending.clone(), last_error.clone()));

        Self {
            snapshots: snapshot_rx,
            calls: call_tx,
            pending,
            next_id: AtomicU64::new(0),
            description: format!("stream: {}", description),
            router,
            last_error,
        }
    }
}

async fn read_events<R>(
    reader: R,
    snapshots: watch::Sender<Option<BusSnapshot>>,
    router: Router,
    pending: PendingCalls,
    last_error: SharedError,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                set_error(&last_error, Some(SourceError::Closed.to_string()));
                break;
            }
            Ok(_) if line.trim().is_empty() => {}
            Ok(read) => match serde_json::from_str::<BusEvent>(line.trim()) {
                Ok(BusEvent::Snapshot(snapshot)) => {
                    set_error(&last_error, None);
                    if snapshots.send(Some(snapshot)).is_err() {
                        debug!("Snapshot receiver dropped, stopping stream reader");
                        break;
                    }
                }
                Ok(BusEvent::Message(message)) => {
                    router.deliver(Arrival {
                        topic: message.topic,
                        value: message.value,
                        type_name: message.type_name,
                        size: message.size.unwrap_or(read as u64),
                        publisher: message.publisher,
                        received_at: Instant::now(),
                    });
                }
                Ok(BusEvent::Response(response)) => {
                    let reply = pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&response.id);
                    match reply {
                        Some(reply) => {
                            let _ = reply.send(response.into_reply());
                        }
                        None => debug!(id = response.id, "Response for an unknown call"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed bus event");
                    set_error(&last_error, Some(SourceError::from(e).to_string()));
                }
            },
            Err(e) => {
                set_error(&last_error, Some(SourceError::from(e).to_string()));
                break;
            }
        }
    }

    // No answer can arrive any more
    pending.lock().unwrap_or_else(PoisonError::into_inner).clear();
}

async fn write_calls<W>(
    mut writer: W,
    mut calls: mpsc::UnboundedReceiver<Request>,
    pending: PendingCalls,
    last_error: SharedError,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(request) = calls.recv().await {
        let Request::Call { id, .. } = &request;
        let id = *id;
        if let Err(e) = send_request(&mut writer, &request).await {
            warn!(id, error = %e, "Cannot send service call");
            pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&id);
            set_error(&last_error, Some(e.to_string()));
        }
    }
}

async fn send_request<W>(writer: &mut W, request: &Request) -> Result<(), SourceError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(request)?;
    line.push(b'\n');
    writer.write_all(&line).await.map_err(SourceError::Write)?;
    writer.flush().await.map_err(SourceError::Write)
}

impl BusSource for StreamSource {
    fn poll(&mut self) -> Option<BusSnapshot> {
        let latest = {
            let current = self.snapshots.borrow_and_update();
            if current.has_changed() {
                current.clone()
            } else {
                None
            }
        };

        // The reader has stopped
        if latest.is_none() && self.snapshots.has_changed().is_err() {
            let mut error = self.last_error.lock().unwrap_or_else(PoisonError::into_inner);
            if error.is_none() {
                *error = Some(SourceError::Disconnected.to_string());
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
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn call_service(&self, service: &str, request: Value) -> Result<ServiceCall, SourceError> {
        // Nothing would read the response
        if self.snapshots.has_changed().is_err() {
            return Err(SourceError::Disconnected);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, call) = ServiceCall::new(service);
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).insert(id, reply);

        let request = Request::Call {
            id,
            service: service.to_string(),
            request,
        };
        if self.calls.send(request).is_err() {
            self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&id);
            return Err(SourceError::Disconnected);
        }
        debug!(id, %service, "Sent service call");
        Ok(call)
    }
}

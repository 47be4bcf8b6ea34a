use serde_json::Value;
use tokio::sync::oneshot;

use super::SourceError;

/// Response body, or the error text reported by the provider
pub(crate) type Reply = Result<Value, String>;

/// An in-flight service call, polled from the UI loop
#[derive(Debug)]
pub struct ServiceCall {
    service: String,
    receiver: oneshot::Receiver<Reply>,
}

impl ServiceCall {
    pub(crate) fn new(service: &str) -> (oneshot::Sender<Reply>, Self) {
        let (tx, rx) = oneshot::channel();
        let call = Self {
            service: service.to_string(),
            receiver: rx,
        };
        (tx, call)
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// The response once it has arrived, `None` while still pending.
    ///
    /// A call whose reply side went away without answering reports
    /// [`SourceError::Disconnected`].
    pub fn try_response(&mut self) -> Option<Result<Value, SourceError>> {
        match self.receiver.try_recv() {
            Ok(Ok(value)) => Some(Ok(value)),
            Ok(Err(message)) => Some(Err(SourceError::Service(message))),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(SourceError::Disconnected)),
        }
    }
}

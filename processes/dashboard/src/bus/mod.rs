//! Bus data sources.
//!
//! A [`BusSource`] supplies periodic [`BusSnapshot`]s of the master state
//! (topics, services, nodes and the TF forest) and pushes message arrivals
//! for subscribed topics through its [`Router`]. Sources that can reach
//! the bus also answer service calls.

mod call;
mod channel;
mod file;
mod router;
mod stream;

use std::collections::BTreeMap;
use std::time::Instant;

use roswatch_common::{Forest, Transform, TreeNode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub use call::ServiceCall;
pub use channel::{BusPublisher, ChannelSource};
pub use file::FileSource;
pub use router::{Router, Subscription};
pub use stream::StreamSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    #[error("write error: {0}")]
    Write(std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service call failed: {0}")]
    Service(String),

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("this source cannot call services")]
    CallsUnsupported,

    #[error("connection closed")]
    Closed,

    #[error("source disconnected")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameCustom {
    #[serde(rename = "nodeUri", default)]
    pub node_uri: Option<String>,
}

/// One coordinate frame as published in the TF forest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<FrameNode>,
    #[serde(default)]
    pub custom: FrameCustom,
    /// Parent frame to this frame
    #[serde(default)]
    pub transform: Transform,
}

/// Payload of a frame in the decorated TF forest
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    /// Resolved name of the publishing node
    pub publisher: Option<String>,
    pub transform: Transform,
}

/// Master state at one point in time
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusSnapshot {
    pub topics: Vec<TopicInfo>,
    /// Topic to publishing node names
    pub publishers: BTreeMap<String, Vec<String>>,
    /// Topic to subscribing node names
    pub subscribers: BTreeMap<String, Vec<String>>,
    /// Service to providing node names
    pub services: BTreeMap<String, Vec<String>>,
    /// Service to request template; absent or empty means no input
    pub service_requests: BTreeMap<String, Value>,
    /// Node URI to node name
    pub nodes: BTreeMap<String, String>,
    pub tf: Vec<FrameNode>,
}

impl BusSnapshot {
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    pub fn topic_type(&self, topic: &str) -> Option<&str> {
        self.topics.iter().find(|t| t.name == topic).map(|t| t.type_name.as_str())
    }

    pub fn publishers_of(&self, topic: &str) -> &[String] {
        self.publishers.get(topic).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn subscribers_of(&self, topic: &str) -> &[String] {
        self.subscribers.get(topic).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn providers_of(&self, service: &str) -> &[String] {
        self.services.get(service).map(Vec::as_slice).unwrap_or_default()
    }

    /// Request template of a service that cannot be called with an empty
    /// request
    pub fn required_input(&self, service: &str) -> Option<&Value> {
        self.service_requests.get(service).filter(|template| match template {
            Value::Null => false,
            Value::Object(fields) => !fields.is_empty(),
            _ => true,
        })
    }

    pub fn node_name(&self, uri: &str) -> Option<&str> {
        self.nodes.get(uri).map(String::as_str)
    }

    /// The TF forest with each frame's publisher URI resolved to a node name
    pub fn frame_forest(&self) -> Forest<FrameInfo> {
        self.tf.iter().map(|frame| self.decorate(frame)).collect()
    }

    fn decorate(&self, frame: &FrameNode) -> TreeNode<FrameInfo> {
        let publisher = frame
            .custom
            .node_uri
            .as_deref()
            .map(|uri| self.node_name(uri).unwrap_or(uri).to_string());
        frame.children.iter().fold(
            TreeNode::new(
                frame.name.clone(),
                FrameInfo {
                    publisher,
                    transform: frame.transform,
                },
            ),
            |node, child| node.with_child(self.decorate(child)),
        )
    }
}

/// One message delivered on a subscribed topic
#[derive(Debug, Clone)]
pub struct Arrival {
    pub topic: String,
    pub value: Value,
    pub type_name: String,
    /// Serialized size in bytes
    pub size: u64,
    /// URI of the publishing node, when the transport reports it
    pub publisher: Option<String>,
    pub received_at: Instant,
}

/// Source of bus snapshots and message arrivals
pub trait BusSource: Send {
    /// Latest snapshot since the previous poll, if any
    fn poll(&mut self) -> Option<BusSnapshot>;

    /// Router that arrivals for this source are delivered through
    fn router(&self) -> &Router;

    fn description(&self) -> &str;

    /// Last error, cleared once the source recovers
    fn error(&self) -> Option<String>;

    fn subscribe(&self, topic: &str) -> Subscription {
        self.router().subscribe(topic)
    }

    /// Start a service call; the response is collected from the returned
    /// handle
    fn call_service(&self, _service: &str, _request: Value) -> Result<ServiceCall, SourceError> {
        Err(SourceError::CallsUnsupported)
    }
}

/// Owns the source and the most recent snapshot taken from it
pub struct BusState {
    source: Box<dyn BusSource>,
    snapshot: BusSnapshot,
    last_updated: Option<Instant>,
    last_error: Option<String>,
}

impl BusState {
    pub fn new(source: Box<dyn BusSource>) -> Self {
        info!(source = source.description(), "Using bus source");
        Self {
            source,
            snapshot: BusSnapshot::default(),
            last_updated: None,
            last_error: None,
        }
    }

    /// Poll the source once. On failure the previous snapshot is kept and
    /// the error is recorded.
    pub fn refresh(&mut self) -> bool {
        match self.source.poll() {
            Some(snapshot) => {
                self.snapshot = snapshot;
                self.last_updated = Some(Instant::now());
                self.last_error = None;
                true
            }
            None => {
                let error = self.source.error();
                if error.is_some() && error != self.last_error {
                    warn!(error = error.as_deref(), "Bus source unavailable");
                }
                self.last_error = error;
                false
            }
        }
    }

    pub fn current_snapshot(&self) -> &BusSnapshot {
        &self.snapshot
    }

    pub fn subscribe(&self, topic: &str) -> Subscription {
        self.source.subscribe(topic)
    }

    pub fn call_service(&self, service: &str, request: Value) -> Result<ServiceCall, SourceError> {
        info!(%service, "Calling service");
        self.source.call_service(service, request)
    }

    pub fn description(&self) -> &str {
        self.source.description()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    /// Node name for a URI, falling back to the URI itself
    pub fn node_name<'a>(&'a self, uri: &'a str) -> &'a str {
        self.snapshot.node_name(uri).unwrap_or(uri)
    }
}

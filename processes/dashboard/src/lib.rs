//! # roswatch
//!
//! A terminal dashboard for a ROS-style message bus.
//!
//! The dashboard browses the topic namespace as a collapsible tree, watches
//! a single topic's latest message with windowed Hz and KB/s statistics,
//! lists services and their providers, browses the TF frame forest and
//! echoes the transform between two frames.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a JSON snapshot file
//! roswatch --file bus.json
//!
//! # Read snapshots and messages from a bridge speaking NDJSON over TCP
//! roswatch --connect localhost:9090
//!
//! # Print the topic tree and exit
//! roswatch --file bus.json --dump topics
//! ```
//!
//! ### As a library with a channel source
//!
//! ```ignore
//! use roswatch::{App, ChannelSource, DashboardConfig};
//!
//! let (publisher, source) = ChannelSource::create("in-process");
//! let app = App::new(Box::new(source), DashboardConfig::default());
//!
//! // Elsewhere, feed the dashboard:
//! // publisher.publish_snapshot(snapshot)?;
//! // publisher.publish("/odom", "nav_msgs/Odometry", value);
//! ```

pub mod app;
pub mod bus;
pub mod cadence;
pub mod configuration;
pub mod dump;
pub mod events;
pub mod format;
pub mod ui;
pub mod views;

pub use app::{App, Menu};
pub use bus::{
    Arrival, BusPublisher, BusSnapshot, BusSource, BusState, ChannelSource, FileSource,
    ServiceCall, SourceError, StreamSource,
};
pub use configuration::{DashboardConfig, Overrides};
pub use dump::{dump_lines, DumpTarget};

//! Error types for the roswatch core

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("rolling window capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unknown frame '{0}'")]
    UnknownFrame(String),

    #[error("frames '{from}' and '{to}' are not connected")]
    Disconnected { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;

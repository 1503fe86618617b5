//! Error types

use thiserror::Error;

/// Errors raised by the timer itself, never by the timed work
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("unknown time unit `{0}` (expected one of: sec, milis, nano)")]
    UnknownUnit(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimerError>;

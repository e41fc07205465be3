//! Error taxonomy
//!
//! Per-unit synthesis failures (`RateLimited`, `SynthesisFailed`) are
//! recoverable and never fatal to a session; `ProtocolViolation` terminates
//! the session; `Internal` terminates the session but never the process.

use thiserror::Error;

/// Errors shared across the parse pipeline and the streaming engine.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Document or file unknown.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream extraction produced nothing.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Provider backpressure. Recoverable per unit.
    #[error("synthesis rate limited")]
    RateLimited,

    /// Provider error other than rate limiting. Degraded to silence.
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Malformed or missing session configuration. Fatal to the session.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Unexpected fault. Logged with context, session closed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

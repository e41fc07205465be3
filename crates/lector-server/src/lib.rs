//! Lector server
//!
//! HTTP endpoints for upload and parse, and the WebSocket stream
//! orchestrator that turns a resolved document into a live audio stream.

pub mod extract;
pub mod http;
pub mod state;
pub mod stream;

pub use http::create_router;
pub use state::AppState;
pub use stream::{
    ClientMessage, FrameSink, MarkStatus, ServerMessage, SessionConfig, SessionEnd,
    StreamSession,
};

use axum::http::StatusCode;
use lector_core::CoreError;

/// Map pipeline errors to HTTP status codes.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound(_) | CoreError::ExtractionFailed(_) => StatusCode::NOT_FOUND,
        CoreError::ProtocolViolation(_) => StatusCode::BAD_REQUEST,
        CoreError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        CoreError::SynthesisFailed(_) | CoreError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

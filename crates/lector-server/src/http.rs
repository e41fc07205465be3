//! HTTP endpoints
//!
//! REST API for upload and parse, plus the WebSocket stream route.

use std::path::{Path, PathBuf};

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use lector_core::{CoreError, Document, Page};
use lector_layout::{build_reading_order, ClassifierConfig, GeometryClassifier};
use lector_text::{apply_profile, normalize_blocks, RuleSegmenter};

use crate::extract::load_pages;
use crate::state::AppState;
use crate::status_for;
use crate::stream::ws_handler;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/parse", post(parse))
        .route("/api/stream", get(ws_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Pipeline error carried to an HTTP response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] CoreError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    file_id: String,
}

/// Accept a page dump from the extraction collaborator and assign it a file
/// identifier for later parse requests.
async fn upload(
    State(state): State<AppState>,
    Json(pages): Json<Vec<Page>>,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload_dir = PathBuf::from(&state.settings.paths.upload_dir);
    std::fs::create_dir_all(&upload_dir).map_err(CoreError::from)?;

    let file_id = Uuid::new_v4().to_string();
    let payload = serde_json::to_vec(&pages)
        .map_err(|e| CoreError::Internal(format!("serialize page dump: {e}")))?;
    std::fs::write(upload_dir.join(format!("{file_id}.json")), payload)
        .map_err(CoreError::from)?;

    tracing::info!(file_id = %file_id, pages = pages.len(), "Stored page dump");
    Ok(Json(UploadResponse { file_id }))
}

/// Parse request
#[derive(Debug, Deserialize)]
struct ParseRequest {
    file_id: String,
    #[serde(default = "default_profile")]
    profile: String,
    #[serde(default)]
    include_captions: bool,
}

fn default_profile() -> String {
    "academic".to_string()
}

/// Run the full resolution pipeline and register the document for streaming.
async fn parse(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<Document>, ApiError> {
    let document = resolve_document(&state, &request)?;
    let document = state.store.insert(document);
    tracing::info!(
        doc_id = %document.id,
        blocks = document.blocks.len(),
        order = document.reading_order.len(),
        "Resolved document"
    );
    Ok(Json((*document).clone()))
}

/// Classify, normalize, apply the reading profile, and resolve order.
fn resolve_document(state: &AppState, request: &ParseRequest) -> Result<Document, CoreError> {
    let pages = load_pages(Path::new(&state.settings.paths.upload_dir), &request.file_id)?;

    let classifier = GeometryClassifier::new(ClassifierConfig {
        column_min_spacing_ratio: state.settings.layout.column_min_spacing_ratio,
        header_footer_height_ratio: state.settings.layout.header_footer_height_ratio,
    });
    let mut blocks = classifier.classify(&pages);
    normalize_blocks(&mut blocks, &RuleSegmenter);
    apply_profile(&mut blocks, &request.profile, request.include_captions);
    let reading_order = build_reading_order(&blocks);

    Ok(Document {
        id: request.file_id.clone(),
        blocks,
        reading_order,
    })
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

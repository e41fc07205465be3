//! Extraction boundary
//!
//! Raw page and glyph extraction from a document file is an external
//! collaborator. Its output contract is a JSON page dump: a list of pages
//! with dimensions and per-block bounding boxes plus reconstructed text,
//! written to the upload directory under the file identifier. An empty page
//! list means extraction failed or the file is missing and surfaces as
//! not-found.

use std::path::Path;

use lector_core::{CoreError, Page, Result};

/// Load the extracted pages for an uploaded file.
pub fn load_pages(upload_dir: &Path, file_id: &str) -> Result<Vec<Page>> {
    let path = upload_dir.join(format!("{file_id}.json"));
    if !path.exists() {
        return Err(CoreError::NotFound(format!("no upload for file id {file_id}")));
    }

    let bytes = std::fs::read(&path)
        .map_err(|e| CoreError::ExtractionFailed(format!("{}: {e}", path.display())))?;
    let pages: Vec<Page> = serde_json::from_slice(&bytes)
        .map_err(|e| CoreError::ExtractionFailed(format!("invalid page dump: {e}")))?;

    if pages.is_empty() {
        return Err(CoreError::NotFound(format!(
            "extraction produced no pages for file id {file_id}"
        )));
    }

    tracing::info!(file_id, pages = pages.len(), "Loaded extracted pages");
    Ok(pages)
}

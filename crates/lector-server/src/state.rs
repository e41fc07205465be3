//! Application state
//!
//! Shared across all handlers: configuration, the document store, the speech
//! cache, and the synthesis provider. Sessions share only these; cursor
//! state stays session-local.

use std::sync::Arc;

use lector_config::Settings;
use lector_core::DocumentStore;
use lector_tts::{SpeechCache, SynthesisProvider};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<DocumentStore>,
    pub cache: Arc<SpeechCache>,
    pub provider: Arc<dyn SynthesisProvider>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        cache: SpeechCache,
        provider: Arc<dyn SynthesisProvider>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            store: Arc::new(DocumentStore::new()),
            cache: Arc::new(cache),
            provider,
        }
    }
}

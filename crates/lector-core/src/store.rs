//! Document store
//!
//! Process-wide registry mapping a document identifier to its resolved
//! document. The join point between the parse pipeline and the streaming
//! engine. Entries are created by parse requests and never pruned in this
//! version; a new parse for the same identifier is a full overwrite. Sessions
//! hold an `Arc<Document>` snapshot, so an overwrite never affects a session
//! that already resolved its document.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::document::Document;

/// Shared, read-mostly document registry.
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the document under its own identifier.
    pub fn insert(&self, document: Document) -> Arc<Document> {
        let doc = Arc::new(document);
        let mut documents = self.documents.write();
        if documents.insert(doc.id.clone(), doc.clone()).is_some() {
            tracing::info!(doc_id = %doc.id, "Overwrote stored document");
        }
        doc
    }

    /// Resolve a snapshot of the document for the given identifier.
    pub fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.documents.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

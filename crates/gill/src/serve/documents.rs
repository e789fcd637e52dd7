//! Open document tracking.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_lsp::lsp_types::Url;

/// Snapshot of an open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub version: i32,
    pub language_id: String,
    /// Buffer has edits not yet saved to disk.
    pub dirty: bool,
    /// Which open of the URI this is; closing and reopening gets a new one.
    pub generation: u64,
}

impl Document {
    /// Path used to label diagnostics for this document.
    pub fn label(uri: &Url) -> PathBuf {
        uri.to_file_path()
            .unwrap_or_else(|_| PathBuf::from(uri.path()))
    }
}

/// Documents the client has open, keyed by URI.
#[derive(Default)]
pub struct DocumentStore {
    docs: Mutex<HashMap<Url, Document>>,
    opens: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, text: String, version: i32, language_id: String) {
        let generation = self.opens.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().insert(
            uri,
            Document {
                text,
                version,
                language_id,
                dirty: false,
                generation,
            },
        );
    }

    /// Replace the text of an open document. Unknown URIs are ignored.
    pub fn change(&self, uri: &Url, text: String, version: i32) {
        if let Some(doc) = self.lock().get_mut(uri) {
            doc.text = text;
            doc.version = version;
            doc.dirty = true;
        }
    }

    /// Mark a document saved, taking the saved text when the client sent it.
    pub fn saved(&self, uri: &Url, text: Option<String>) {
        if let Some(doc) = self.lock().get_mut(uri) {
            if let Some(text) = text {
                doc.text = text;
            }
            doc.dirty = false;
        }
    }

    pub fn close(&self, uri: &Url) -> Option<Document> {
        self.lock().remove(uri)
    }

    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.lock().get(uri).cloned()
    }

    /// Whether `snapshot` still describes the open document at `uri`.
    ///
    /// False once the document was edited, or closed and opened again.
    pub fn is_current(&self, uri: &Url, snapshot: &Document) -> bool {
        self.lock()
            .get(uri)
            .is_some_and(|d| d.version == snapshot.version && d.generation == snapshot.generation)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Url, Document>> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether gill should handle a document at all.
pub fn is_fish_document(uri: &Url, language_id: &str) -> bool {
    language_id == "fish" || uri.path().ends_with(".fish")
}

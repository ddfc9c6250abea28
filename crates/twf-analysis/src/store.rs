//! Thread-safe URI -> `Document` store (§4.5).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use twf_common::{ParseError, ResolveError};
use twf_parser::ast::File;
use twf_parser::parser::parse_tolerant;

use crate::resolver::resolve;

/// A single document's latest text plus the lex/parse/resolve artifacts
/// derived from it. Effectively immutable after construction: `open` and
/// `update` build a fresh `Document` rather than mutating one in place, so
/// a query that already holds an `Arc<Document>` never observes a
/// partially-updated tree (§5).
#[derive(Debug)]
pub struct Document {
    pub uri: String,
    pub text: String,
    pub file: File,
    pub parse_errors: Vec<ParseError>,
    pub resolve_errors: Vec<ResolveError>,
}

impl Document {
    fn analyze(uri: String, text: String) -> Self {
        let (mut file, parse_errors) = parse_tolerant(&text);
        let resolve_errors = resolve(&mut file);
        Document {
            uri,
            text,
            file,
            parse_errors,
            resolve_errors,
        }
    }

    /// Whether this document currently has any parse or resolve errors.
    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty() || !self.resolve_errors.is_empty()
    }
}

/// Maps document URIs to their latest analysis snapshot under a
/// reader-writer lock: `open`/`update`/`close` take the exclusive side just
/// long enough to re-analyze and swap in a new `Document`; every editor
/// query takes the shared side to clone out an `Arc` and then reads it
/// lock-free.
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze `text` and publish it as the document at `uri`. Open and
    /// update share this implementation: both fully re-analyze (§4.5 calls
    /// for synchronous re-analysis on every write, with no incremental
    /// re-lexing/parsing in scope).
    pub fn open(&self, uri: impl Into<String>, text: impl Into<String>) -> Arc<Document> {
        self.update(uri, text)
    }

    pub fn update(&self, uri: impl Into<String>, text: impl Into<String>) -> Arc<Document> {
        let uri = uri.into();
        let doc = Arc::new(Document::analyze(uri.clone(), text.into()));
        self.documents.write().unwrap().insert(uri, doc.clone());
        doc
    }

    pub fn close(&self, uri: &str) {
        self.documents.write().unwrap().remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<Arc<Document>> {
        self.documents.read().unwrap().get(uri).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_get_round_trips() {
        let store = DocumentStore::new();
        store.open("file:///a.twf", "workflow A():\n    return\n");
        let doc = store.get("file:///a.twf").unwrap();
        assert_eq!(doc.file.definitions.len(), 1);
        assert!(!doc.has_errors());
    }

    #[test]
    fn update_replaces_the_snapshot() {
        let store = DocumentStore::new();
        let first = store.open("file:///a.twf", "workflow A():\n    return\n");
        let second = store.update("file:///a.twf", "workflow A():\n    activity Missing()\n");
        assert_eq!(first.file.definitions[0].name(), "A");
        assert!(second.has_errors());
        assert_eq!(store.get("file:///a.twf").unwrap().resolve_errors.len(), 1);
    }

    #[test]
    fn close_removes_the_document() {
        let store = DocumentStore::new();
        store.open("file:///a.twf", "workflow A():\n    return\n");
        store.close("file:///a.twf");
        assert!(store.get("file:///a.twf").is_none());
    }

    #[test]
    fn unknown_uri_returns_none() {
        let store = DocumentStore::new();
        assert!(store.get("file:///missing.twf").is_none());
    }
}

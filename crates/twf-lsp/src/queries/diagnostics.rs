//! Parse/resolve errors -> LSP diagnostics (§4.7).

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};

use twf_analysis::Document;

use crate::pos::point_range;

/// One diagnostic per parse error and per resolve error, each at the
/// error's own position with severity `error` and `source = "twf"`.
pub fn diagnostics_for(doc: &Document) -> Vec<Diagnostic> {
    let mut out = Vec::with_capacity(doc.parse_errors.len() + doc.resolve_errors.len());
    for err in &doc.parse_errors {
        out.push(make(err.position, &err.message));
    }
    for err in &doc.resolve_errors {
        out.push(make(err.position, &err.message));
    }
    out
}

fn make(position: twf_common::Position, message: &str) -> Diagnostic {
    Diagnostic {
        range: point_range(position),
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some("twf".to_string()),
        message: message.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_analysis::DocumentStore;

    #[test]
    fn one_diagnostic_per_resolve_error() {
        let store = DocumentStore::new();
        let doc = store.open("file:///a.twf", "workflow A():\n    activity Missing()\n");
        let diags = diagnostics_for(&doc);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "undefined activity: Missing");
        assert_eq!(diags[0].source.as_deref(), Some("twf"));
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let store = DocumentStore::new();
        let doc = store.open("file:///a.twf", "workflow A():\n    return\n");
        assert!(diagnostics_for(&doc).is_empty());
    }
}

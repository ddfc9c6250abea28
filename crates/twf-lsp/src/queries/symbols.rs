//! `textDocument/documentSymbol` (§4.7).

use tower_lsp::lsp_types::{DocumentSymbol, Position as LspPosition, Range, SymbolKind};

use twf_common::Position;
use twf_parser::ast::*;

use crate::pos::{last_line_of_statements, last_line_of_workflow, name_range, to_lsp};

pub fn document_symbols(file: &File) -> Vec<DocumentSymbol> {
    file.definitions.iter().map(definition_symbol).collect()
}

fn definition_symbol(def: &Definition) -> DocumentSymbol {
    match def {
        Definition::Workflow(w) => workflow_symbol(w),
        Definition::Activity(a) => activity_symbol(a),
    }
}

fn workflow_symbol(w: &WorkflowDef) -> DocumentSymbol {
    let mut children = Vec::new();
    for s in &w.signals {
        children.push(handler_symbol(&s.name, s.position, s.name_position, SymbolKind::EVENT, s.body.as_deref()));
    }
    for q in &w.queries {
        children.push(handler_symbol(&q.name, q.position, q.name_position, SymbolKind::METHOD, q.body.as_deref()));
    }
    for u in &w.updates {
        children.push(handler_symbol(&u.name, u.position, u.name_position, SymbolKind::METHOD, u.body.as_deref()));
    }
    make_symbol(&w.name, w.position, w.name_position, last_line_of_workflow(w), SymbolKind::FUNCTION, Some(children))
}

fn activity_symbol(a: &ActivityDef) -> DocumentSymbol {
    let last_line = last_line_of_statements(&a.body, a.position.line);
    make_symbol(&a.name, a.position, a.name_position, last_line, SymbolKind::FUNCTION, None)
}

fn handler_symbol(
    name: &str,
    position: Position,
    name_position: Position,
    kind: SymbolKind,
    body: Option<&[Statement]>,
) -> DocumentSymbol {
    let last_line = body.map_or(position.line, |b| last_line_of_statements(b, position.line));
    make_symbol(name, position, name_position, last_line, kind, None)
}

fn make_symbol(
    name: &str,
    position: Position,
    name_position: Position,
    last_line: u32,
    kind: SymbolKind,
    children: Option<Vec<DocumentSymbol>>,
) -> DocumentSymbol {
    let start = to_lsp(position);
    let range = Range::new(start, LspPosition::new(last_line - 1, u32::MAX));
    #[allow(deprecated)]
    DocumentSymbol {
        name: name.to_string(),
        detail: None,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: name_range(name_position, name),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn workflow_symbol_nests_signals_queries_updates() {
        let src = "workflow A():\n    signal Cancel():\n    query Status() -> (int):\n    update Bump():\n    return\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty(), "{errors:?}");
        let symbols = document_symbols(&file);
        assert_eq!(symbols.len(), 1);
        let w = &symbols[0];
        assert_eq!(w.name, "A");
        assert_eq!(w.kind, SymbolKind::FUNCTION);
        let children = w.children.as_ref().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].kind, SymbolKind::EVENT);
        assert_eq!(children[1].kind, SymbolKind::METHOD);
        assert_eq!(children[2].kind, SymbolKind::METHOD);
    }

    #[test]
    fn activity_symbol_has_no_children() {
        let (file, errors) = parse_tolerant("activity A():\n    return\n");
        assert!(errors.is_empty());
        let symbols = document_symbols(&file);
        assert_eq!(symbols[0].kind, SymbolKind::FUNCTION);
        assert!(symbols[0].children.is_none());
    }

    #[test]
    fn full_range_reaches_last_nested_line() {
        let src = "workflow A():\n    if (x):\n        return 1\n    return 2\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let symbols = document_symbols(&file);
        assert_eq!(symbols[0].range.end.line, 3);
    }
}

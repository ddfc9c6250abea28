//! `textDocument/rename` and `textDocument/prepareRename` (§4.7).

use std::collections::HashMap;

use tower_lsp::lsp_types::{Position as LspPosition, PrepareRenameResponse, TextEdit, Url, WorkspaceEdit};

use twf_analysis::traversal::{node_at_line, name_of_node};
use twf_parser::ast::File;

use crate::pos::line_from_lsp;
use crate::queries::references::references;

/// Confirms the cursor sits over a renameable name and reports its span,
/// so the editor can seed the rename input box.
pub fn prepare_rename(file: &File, position: LspPosition) -> Option<PrepareRenameResponse> {
    let node = node_at_line(file, line_from_lsp(position))?;
    let (name, _kind) = name_of_node(file, &node)?;
    Some(PrepareRenameResponse::RangeWithPlaceholder {
        range: crate::pos::name_range(node.position(), &name),
        placeholder: name,
    })
}

/// Renames every reference to (and the declaration of) the definition
/// under the cursor, via the same resolution-pointer walk as
/// [`references`].
pub fn rename(uri: &Url, file: &File, position: LspPosition, new_name: &str) -> Option<WorkspaceEdit> {
    let locations = references(uri, file, position, true)?;
    if locations.is_empty() {
        return None;
    }
    let edits = locations
        .into_iter()
        .map(|loc| TextEdit {
            range: loc.range,
            new_text: new_name.to_string(),
        })
        .collect();
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);
    Some(WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position as LspPosition;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn rename_rewrites_declaration_and_every_call_site() {
        let src = "workflow A():\n    activity Greet()\n    activity Greet()\nactivity Greet():\n    return\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        resolve(&mut file);
        let uri = Url::parse("file:///a.twf").unwrap();
        let edit = rename(&uri, &file, LspPosition::new(3, 10), "SayHello").unwrap();
        let edits = edit.changes.unwrap().remove(&uri).unwrap();
        assert_eq!(edits.len(), 3);
        assert!(edits.iter().all(|e| e.new_text == "SayHello"));
    }

    #[test]
    fn prepare_rename_reports_name_span() {
        let (file, errors) = parse_tolerant("workflow A():\n    return\n");
        assert!(errors.is_empty());
        let response = prepare_rename(&file, LspPosition::new(0, 0)).unwrap();
        match response {
            PrepareRenameResponse::RangeWithPlaceholder { placeholder, .. } => assert_eq!(placeholder, "A"),
            _ => panic!("expected range with placeholder"),
        }
    }
}

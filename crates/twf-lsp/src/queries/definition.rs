//! `textDocument/definition` (§4.7).

use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position as LspPosition, Url};

use twf_analysis::traversal::{node_at_line, Node};
use twf_parser::ast::*;

use crate::pos::{line_from_lsp, name_range};

/// Jumps from a call/await-target reference to its resolved definition's
/// name span. Returns `None` for unresolved references and for nodes that
/// are not references at all (e.g. the definition header itself).
pub fn goto_definition(uri: &Url, file: &File, position: LspPosition) -> Option<GotoDefinitionResponse> {
    let node = node_at_line(file, line_from_lsp(position))?;
    let target = def_id_of_node(&node)?;
    let def = file.definitions.get(target)?;
    Some(GotoDefinitionResponse::Scalar(Location {
        uri: uri.clone(),
        range: name_range(def.name_position(), def.name()),
    }))
}

fn def_id_of_node(node: &Node<'_>) -> Option<DefId> {
    match node {
        Node::Statement(Statement::ActivityCall(c)) => c.resolved,
        Node::Statement(Statement::WorkflowCall(c)) => c.resolved,
        Node::AwaitTarget(AwaitTarget::Activity(c)) => c.resolved,
        Node::AwaitTarget(AwaitTarget::Workflow(c)) => c.resolved,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position as LspPosition;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn goto_definition_jumps_to_resolved_activity() {
        let (mut file, errors) = parse_tolerant("workflow A():\n    activity Greet()\nactivity Greet():\n    return\n");
        assert!(errors.is_empty());
        resolve(&mut file);
        let uri = Url::parse("file:///a.twf").unwrap();
        let response = goto_definition(&uri, &file, LspPosition::new(1, 4)).unwrap();
        match response {
            GotoDefinitionResponse::Scalar(loc) => assert_eq!(loc.range.start.line, 2),
            _ => panic!("expected scalar response"),
        }
    }

    #[test]
    fn goto_definition_is_none_for_unresolved_call() {
        let (mut file, errors) = parse_tolerant("workflow A():\n    activity Missing()\n");
        assert!(errors.is_empty());
        resolve(&mut file);
        let uri = Url::parse("file:///a.twf").unwrap();
        assert!(goto_definition(&uri, &file, LspPosition::new(1, 4)).is_none());
    }
}

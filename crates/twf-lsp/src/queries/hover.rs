//! `textDocument/hover` (§4.7).

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position as LspPosition};

use twf_analysis::traversal::{node_at_line, Node};
use twf_parser::ast::*;

use crate::pos::line_from_lsp;
use crate::signature::{signature_for_definition, signature_for_query, signature_for_signal, signature_for_update, Signature};

/// Hovers a node-at-line: if it is a call or await target with a
/// resolution pointer, formats the *referenced definition's* signature;
/// otherwise formats the node's own signature.
pub fn hover(file: &File, position: LspPosition) -> Option<Hover> {
    let node = node_at_line(file, line_from_lsp(position))?;
    let signature = signature_for_node(file, &node)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```twf\n{}\n```", signature.label),
        }),
        range: None,
    })
}

fn signature_for_node(file: &File, node: &Node<'_>) -> Option<Signature> {
    match node {
        Node::Definition(def) => Some(signature_for_definition(def)),
        Node::Signal(s) => Some(signature_for_signal(s)),
        Node::Query(q) => Some(signature_for_query(q)),
        Node::Update(u) => Some(signature_for_update(u)),
        Node::Statement(Statement::ActivityCall(c)) => {
            Some(match c.resolved.and_then(|id| file.activity(id)) {
                Some(a) => signature_for_definition(&Definition::Activity(a.clone())),
                None => Signature {
                    label: format!("activity {}({})", c.name, c.args),
                    param_ranges: Vec::new(),
                },
            })
        }
        Node::Statement(Statement::WorkflowCall(c)) => {
            Some(match c.resolved.and_then(|id| file.workflow(id)) {
                Some(w) => signature_for_definition(&Definition::Workflow(w.clone())),
                None => Signature {
                    label: format!("workflow {}({})", c.name, c.args),
                    param_ranges: Vec::new(),
                },
            })
        }
        Node::AwaitTarget(AwaitTarget::Activity(c)) => c
            .resolved
            .and_then(|id| file.activity(id))
            .map(|a| signature_for_definition(&Definition::Activity(a.clone()))),
        Node::AwaitTarget(AwaitTarget::Workflow(c)) => c
            .resolved
            .and_then(|id| file.workflow(id))
            .map(|w| signature_for_definition(&Definition::Workflow(w.clone()))),
        Node::AwaitTarget(AwaitTarget::Signal { name, .. }) => Some(Signature {
            label: format!("signal {name}"),
            param_ranges: Vec::new(),
        }),
        Node::AwaitTarget(AwaitTarget::Update { name, .. }) => Some(Signature {
            label: format!("update {name}"),
            param_ranges: Vec::new(),
        }),
        Node::AwaitTarget(AwaitTarget::Timer { duration, .. }) => Some(Signature {
            label: format!("timer({duration})"),
            param_ranges: Vec::new(),
        }),
        Node::AwaitOneCase(_) | Node::SwitchCase(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position as LspPosition;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn hover_over_call_shows_referenced_definition() {
        let (mut file, errors) = parse_tolerant("workflow A():\n    activity B()\nactivity B(x: int) -> (int):\n    return x\n");
        assert!(errors.is_empty());
        resolve(&mut file);
        let hover = hover(&file, LspPosition::new(1, 4)).unwrap();
        match hover.contents {
            HoverContents::Markup(m) => assert!(m.value.contains("activity B(x: int) -> (int)")),
            _ => panic!("expected markup contents"),
        }
    }

    #[test]
    fn hover_over_unresolved_call_shows_raw_call_shape() {
        let (mut file, errors) = parse_tolerant("workflow A():\n    activity Missing(x)\n");
        assert!(errors.is_empty());
        resolve(&mut file);
        let hover = hover(&file, LspPosition::new(1, 4)).unwrap();
        match hover.contents {
            HoverContents::Markup(m) => assert!(m.value.contains("activity Missing(x)")),
            _ => panic!("expected markup contents"),
        }
    }

    #[test]
    fn hover_over_definition_header() {
        let (file, errors) = parse_tolerant("workflow Foo(x: int) -> (Result):\n    return x\n");
        assert!(errors.is_empty());
        let hover = hover(&file, LspPosition::new(0, 0)).unwrap();
        match hover.contents {
            HoverContents::Markup(m) => assert_eq!(m.value, "```twf\nworkflow Foo(x: int) -> (Result)\n```"),
            _ => panic!("expected markup contents"),
        }
    }
}

//! `textDocument/signatureHelp` (§4.7), trigger character `(` (§6.4).
//!
//! Node-at-line; a call with a resolution pointer builds the referenced
//! definition's signature, the same label `signature.rs` builds for hover,
//! with one `ParameterInformation` per comma-split parameter range.

use tower_lsp::lsp_types::{ParameterInformation, ParameterLabel, Position as LspPosition, SignatureHelp, SignatureInformation};

use twf_analysis::traversal::{node_at_line, Node};
use twf_parser::ast::*;

use crate::pos::line_from_lsp;
use crate::signature::{signature_for_definition, Signature};

pub fn signature_help(file: &File, position: LspPosition) -> Option<SignatureHelp> {
    let node = node_at_line(file, line_from_lsp(position))?;
    let signature = signature_for_call(file, &node)?;
    Some(to_signature_help(signature))
}

fn signature_for_call(file: &File, node: &Node<'_>) -> Option<Signature> {
    match node {
        Node::Statement(Statement::ActivityCall(c)) => c.resolved.and_then(|id| file.activity(id)).map(definition_signature),
        Node::Statement(Statement::WorkflowCall(c)) => c.resolved.and_then(|id| file.workflow(id)).map(definition_signature),
        Node::AwaitTarget(AwaitTarget::Activity(c)) => c.resolved.and_then(|id| file.activity(id)).map(definition_signature),
        Node::AwaitTarget(AwaitTarget::Workflow(c)) => c.resolved.and_then(|id| file.workflow(id)).map(definition_signature),
        _ => None,
    }
}

fn definition_signature(def: &ActivityDef) -> Signature {
    signature_for_definition(&Definition::Activity(def.clone()))
}

fn to_signature_help(signature: Signature) -> SignatureHelp {
    let parameters = signature
        .param_ranges
        .iter()
        .map(|&(start, end)| ParameterInformation {
            label: ParameterLabel::LabelOffsets([start as u32, end as u32]),
            documentation: None,
        })
        .collect();

    SignatureHelp {
        signatures: vec![SignatureInformation {
            label: signature.label,
            documentation: None,
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position as LspPosition;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn signature_help_over_resolved_activity_call() {
        let src = "workflow A():\n    activity Greet(\"Ada\")\nactivity Greet(name: string):\n    return\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        resolve(&mut file);
        let help = signature_help(&file, LspPosition::new(1, 4)).unwrap();
        assert_eq!(help.signatures.len(), 1);
        let sig = &help.signatures[0];
        assert_eq!(sig.label, "activity Greet(name: string)");
        let params = sig.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 1);
        match params[0].label {
            ParameterLabel::LabelOffsets([start, end]) => assert_eq!(&sig.label[start as usize..end as usize], "name: string"),
            _ => panic!("expected offset label"),
        }
    }

    #[test]
    fn signature_help_over_unresolved_call_is_none() {
        let src = "workflow A():\n    activity Missing(x)\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        resolve(&mut file);
        assert!(signature_help(&file, LspPosition::new(1, 4)).is_none());
    }

    #[test]
    fn signature_help_over_non_call_line_is_none() {
        let (file, errors) = parse_tolerant("workflow A():\n    return\n");
        assert!(errors.is_empty());
        assert!(signature_help(&file, LspPosition::new(0, 0)).is_none());
    }
}

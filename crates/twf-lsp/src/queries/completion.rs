//! `textDocument/completion` (§4.7).
//!
//! The keyword set offered is scoped to where the cursor sits: top level
//! only opens a new definition, a workflow body offers the full
//! workflow-body grammar plus every defined activity/workflow name and the
//! enclosing workflow's own signal/update names, and an activity body --
//! which cannot carry durable statements -- offers only control flow.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position as LspPosition};

use twf_analysis::traversal::{context_at_line, LineContext};
use twf_parser::ast::File;

use crate::pos::line_from_lsp;

const TOP_LEVEL_KEYWORDS: &[&str] = &["workflow", "activity"];

const WORKFLOW_BODY_KEYWORDS: &[&str] = &[
    "activity", "workflow", "signal", "query", "update", "spawn", "detach", "nexus", "timer", "options", "await", "all",
    "one", "or", "parallel", "select", "switch", "case", "if", "else", "for", "in", "return", "close", "completed",
    "failed", "continue_as_new", "break", "continue",
];

const ACTIVITY_BODY_KEYWORDS: &[&str] =
    &["switch", "case", "if", "else", "for", "in", "return", "close", "completed", "failed", "break", "continue"];

pub fn completions(file: &File, position: LspPosition) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    match context_at_line(file, line_from_lsp(position)) {
        LineContext::TopLevel => push_keywords(&mut items, TOP_LEVEL_KEYWORDS),
        LineContext::InWorkflow(w) => {
            push_keywords(&mut items, WORKFLOW_BODY_KEYWORDS);
            for (_, wf) in file.workflows() {
                items.push(name_item(&wf.name, CompletionItemKind::FUNCTION));
            }
            for (_, a) in file.activities() {
                items.push(name_item(&a.name, CompletionItemKind::METHOD));
            }
            for s in &w.signals {
                items.push(name_item(&s.name, CompletionItemKind::EVENT));
            }
            for u in &w.updates {
                items.push(name_item(&u.name, CompletionItemKind::EVENT));
            }
        }
        LineContext::InActivity(_) => push_keywords(&mut items, ACTIVITY_BODY_KEYWORDS),
    }

    items
}

fn push_keywords(items: &mut Vec<CompletionItem>, keywords: &[&str]) {
    for &kw in keywords {
        items.push(CompletionItem {
            label: kw.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            sort_text: Some(format!("1_{kw}")),
            ..Default::default()
        });
    }
}

fn name_item(name: &str, kind: CompletionItemKind) -> CompletionItem {
    CompletionItem {
        label: name.to_string(),
        kind: Some(kind),
        sort_text: Some(format!("0_{name}")),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Position as LspPosition;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn completions_include_keywords_and_definitions() {
        let (file, errors) = parse_tolerant("workflow A():\n    activity B()\nactivity B():\n    return\n");
        assert!(errors.is_empty());
        let items = completions(&file, LspPosition::new(1, 4));
        assert!(items.iter().any(|i| i.label == "workflow"));
        assert!(items.iter().any(|i| i.label == "A"));
        assert!(items.iter().any(|i| i.label == "B"));
    }

    #[test]
    fn completions_inside_workflow_include_its_own_signals() {
        let src = "workflow A():\n    signal Cancel():\n    await signal Cancel\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let items = completions(&file, LspPosition::new(2, 4));
        assert!(items.iter().any(|i| i.label == "Cancel"));
    }

    #[test]
    fn top_level_offers_only_definition_keywords() {
        // Blank leading line pushes the definition to line 2 (1-based), so
        // line 1 sits before any definition's start line and is TopLevel.
        let (file, errors) = parse_tolerant("\nworkflow A():\n    return\n");
        assert!(errors.is_empty());
        let items = completions(&file, LspPosition::new(0, 0));
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.label == "workflow"));
        assert!(items.iter().any(|i| i.label == "activity"));
    }

    #[test]
    fn activity_body_offers_only_control_flow_keywords() {
        let src = "activity A():\n    if (x):\n        return 1\n    return 2\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let items = completions(&file, LspPosition::new(4, 4));
        assert!(items.iter().any(|i| i.label == "return"));
        assert!(!items.iter().any(|i| i.label == "workflow"));
        assert!(!items.iter().any(|i| i.label == "await"));
    }
}

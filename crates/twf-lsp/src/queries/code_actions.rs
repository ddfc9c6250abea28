//! Code actions (§4.7): quick-fix "add missing definition" and refactor
//! "convert return to close".

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Position as LspPosition, Range, TextEdit, Url, WorkspaceEdit,
};

use twf_analysis::traversal::find_activity_call_by_name;
use twf_common::ResolveError;
use twf_parser::ast::*;

pub fn code_actions(uri: &Url, file: &File, source: &str, range: Range, resolve_errors: &[ResolveError]) -> Vec<CodeActionOrCommand> {
    let mut out = add_missing_definitions(uri, file, source, range, resolve_errors);
    out.extend(convert_returns_to_close(uri, file, range));
    out
}

fn line_in_range(line_1based: u32, range: Range) -> bool {
    let line0 = line_1based - 1;
    line0 >= range.start.line && line0 <= range.end.line
}

fn add_missing_definitions(uri: &Url, file: &File, source: &str, range: Range, resolve_errors: &[ResolveError]) -> Vec<CodeActionOrCommand> {
    let last_line = source.lines().count().max(1) as u32;
    let eof = LspPosition::new(last_line, 0);

    let mut out = Vec::new();
    for err in resolve_errors {
        if !line_in_range(err.position.line, range) {
            continue;
        }
        let (kind, name) = if let Some(name) = err.message.strip_prefix("undefined activity: ") {
            ("activity", name)
        } else if let Some(name) = err.message.strip_prefix("undefined workflow: ") {
            ("workflow", name)
        } else {
            continue;
        };

        let args = match kind {
            "activity" => find_activity_call_by_name(file, name).map(|c| c.args.clone()).unwrap_or_default(),
            _ => find_workflow_call_args(file, name).unwrap_or_default(),
        };
        let stub = format!("\n{kind} {name}({args}):\n    return\n");
        out.push(quick_fix(
            uri,
            format!("Add missing definition: {name}"),
            Range::new(eof, eof),
            stub,
        ));
    }
    out
}

fn find_workflow_call_args(file: &File, name: &str) -> Option<String> {
    for def in &file.definitions {
        let body = match def {
            Definition::Workflow(w) => &w.body,
            Definition::Activity(a) => &a.body,
        };
        if let Some(args) = search_statements(body, name) {
            return Some(args);
        }
    }
    None
}

fn search_statements(stmts: &[Statement], name: &str) -> Option<String> {
    stmts.iter().find_map(|stmt| search_statement(stmt, name))
}

fn search_statement(stmt: &Statement, name: &str) -> Option<String> {
    match stmt {
        Statement::WorkflowCall(c) if c.name == name => Some(c.args.clone()),
        Statement::AwaitAll(b) => search_statements(&b.body, name),
        Statement::AwaitOne(b) => b.cases.iter().find_map(|case| match case {
            AwaitOneCase::Target {
                target: AwaitTarget::Workflow(c),
                body,
                ..
            } if c.name == name => Some(c.args.clone()).or_else(|| search_statements(body, name)),
            AwaitOneCase::Target { body, .. } => search_statements(body, name),
            AwaitOneCase::NestedAwaitAll { body, .. } => search_statements(body, name),
        }),
        Statement::Switch(b) => b
            .cases
            .iter()
            .find_map(|c| search_statements(&c.body, name))
            .or_else(|| b.default.as_deref().and_then(|d| search_statements(d, name))),
        Statement::If(s) => search_statements(&s.body, name).or_else(|| s.else_body.as_deref().and_then(|e| search_statements(e, name))),
        Statement::For(s) => search_statements(&s.body, name),
        Statement::Await(s) => match &s.target {
            AwaitTarget::Workflow(c) if c.name == name => Some(c.args.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn convert_returns_to_close(uri: &Url, file: &File, range: Range) -> Vec<CodeActionOrCommand> {
    let mut out = Vec::new();
    for (_, w) in file.workflows() {
        collect_returns(&w.body, uri, range, &mut out);
    }
    out
}

fn collect_returns(stmts: &[Statement], uri: &Url, range: Range, out: &mut Vec<CodeActionOrCommand>) {
    for stmt in stmts {
        match stmt {
            Statement::Return(r) => {
                if !line_in_range(r.position.line, range) {
                    continue;
                }
                let line0 = r.position.line - 1;
                let indent = " ".repeat((r.position.column - 1) as usize);
                let new_text = match &r.value {
                    Some(v) => format!("{indent}close {v}"),
                    None => format!("{indent}close"),
                };
                out.push(quick_fix_kind(
                    uri,
                    "Convert return to close".to_string(),
                    CodeActionKind::REFACTOR,
                    Range::new(LspPosition::new(line0, 0), LspPosition::new(line0, u32::MAX)),
                    new_text,
                ));
            }
            Statement::AwaitAll(b) => collect_returns(&b.body, uri, range, out),
            Statement::AwaitOne(b) => {
                for case in &b.cases {
                    collect_returns(case.body(), uri, range, out);
                }
            }
            Statement::Switch(b) => {
                for c in &b.cases {
                    collect_returns(&c.body, uri, range, out);
                }
                if let Some(d) = &b.default {
                    collect_returns(d, uri, range, out);
                }
            }
            Statement::If(s) => {
                collect_returns(&s.body, uri, range, out);
                if let Some(e) = &s.else_body {
                    collect_returns(e, uri, range, out);
                }
            }
            Statement::For(s) => collect_returns(&s.body, uri, range, out),
            _ => {}
        }
    }
}

fn quick_fix(uri: &Url, title: String, edit_range: Range, new_text: String) -> CodeActionOrCommand {
    quick_fix_kind(uri, title, CodeActionKind::QUICKFIX, edit_range, new_text)
}

fn quick_fix_kind(uri: &Url, title: String, kind: CodeActionKind, edit_range: Range, new_text: String) -> CodeActionOrCommand {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![TextEdit { range: edit_range, new_text }]);
    CodeActionOrCommand::CodeAction(CodeAction {
        title,
        kind: Some(kind),
        diagnostics: None,
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }),
        command: None,
        is_preferred: None,
        disabled: None,
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Url;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    fn full_range() -> Range {
        Range::new(LspPosition::new(0, 0), LspPosition::new(1000, 0))
    }

    #[test]
    fn add_missing_definition_scavenges_call_shape() {
        let src = "workflow A():\n    activity Greet(name: \"Ada\")\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let resolve_errors = resolve(&mut file);
        assert_eq!(resolve_errors.len(), 1);
        let uri = Url::parse("file:///a.twf").unwrap();
        let actions = code_actions(&uri, &file, src, full_range(), &resolve_errors);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            CodeActionOrCommand::CodeAction(a) => {
                assert_eq!(a.title, "Add missing definition: Greet");
                let edits = &a.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri];
                assert!(edits[0].new_text.contains("activity Greet(name: \"Ada\"):"));
            }
            _ => panic!("expected a code action"),
        }
    }

    #[test]
    fn convert_return_to_close_rewrites_the_line() {
        let src = "workflow A():\n    return 1\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let uri = Url::parse("file:///a.twf").unwrap();
        let actions = code_actions(&uri, &file, src, full_range(), &[]);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            CodeActionOrCommand::CodeAction(a) => {
                assert_eq!(a.title, "Convert return to close");
                let edits = &a.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri];
                assert_eq!(edits[0].new_text, "    close 1");
            }
            _ => panic!("expected a code action"),
        }
    }

    #[test]
    fn no_actions_outside_the_requested_range() {
        let src = "workflow A():\n    return 1\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let uri = Url::parse("file:///a.twf").unwrap();
        let empty_range = Range::new(LspPosition::new(10, 0), LspPosition::new(10, 0));
        assert!(code_actions(&uri, &file, src, empty_range, &[]).is_empty());
    }
}

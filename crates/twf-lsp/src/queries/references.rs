//! `textDocument/references` (§4.7).

use tower_lsp::lsp_types::{Location, Position as LspPosition, Url};

use twf_analysis::traversal::{node_at_line, Node};
use twf_parser::ast::*;

use crate::pos::{line_from_lsp, name_range};

/// Every reference to the definition under the cursor: every call and
/// await target whose resolution pointer matches, plus (when
/// `include_declaration` is set) the definition's own name span.
pub fn references(uri: &Url, file: &File, position: LspPosition, include_declaration: bool) -> Option<Vec<Location>> {
    let node = node_at_line(file, line_from_lsp(position))?;
    let target = def_id_under_cursor(file, &node)?;

    let mut out = Vec::new();
    if include_declaration {
        if let Some(def) = file.definitions.get(target) {
            out.push(location(uri, def.name_position(), def.name()));
        }
    }
    for def in &file.definitions {
        collect_in_statements(statements_of(def), target, uri, &mut out);
        if let Definition::Workflow(w) = def {
            for s in &w.signals {
                if let Some(body) = &s.body {
                    collect_in_statements(body, target, uri, &mut out);
                }
            }
            for q in &w.queries {
                if let Some(body) = &q.body {
                    collect_in_statements(body, target, uri, &mut out);
                }
            }
            for u in &w.updates {
                if let Some(body) = &u.body {
                    collect_in_statements(body, target, uri, &mut out);
                }
            }
        }
    }
    Some(out)
}

fn statements_of(def: &Definition) -> &[Statement] {
    match def {
        Definition::Workflow(w) => &w.body,
        Definition::Activity(a) => &a.body,
    }
}

/// Resolves the node under the cursor to the `DefId` it denotes: either
/// the id of a definition header itself, or the id a call/await-target
/// reference under the cursor resolves to.
fn def_id_under_cursor(file: &File, node: &Node<'_>) -> Option<DefId> {
    match node {
        Node::Definition(def) => file.definitions.iter().position(|d| d.position() == def.position()),
        Node::Statement(Statement::ActivityCall(c)) => c.resolved,
        Node::Statement(Statement::WorkflowCall(c)) => c.resolved,
        Node::AwaitTarget(AwaitTarget::Activity(c)) => c.resolved,
        Node::AwaitTarget(AwaitTarget::Workflow(c)) => c.resolved,
        _ => None,
    }
}

fn collect_in_statements(stmts: &[Statement], target: DefId, uri: &Url, out: &mut Vec<Location>) {
    for stmt in stmts {
        collect_in_statement(stmt, target, uri, out);
    }
}

fn collect_in_statement(stmt: &Statement, target: DefId, uri: &Url, out: &mut Vec<Location>) {
    match stmt {
        Statement::ActivityCall(c) => push_if_match(c.resolved, target, &c.name_position, &c.name, uri, out),
        Statement::WorkflowCall(c) => push_if_match(c.resolved, target, &c.name_position, &c.name, uri, out),
        Statement::Await(s) => collect_in_target(&s.target, target, uri, out),
        Statement::AwaitAll(b) => collect_in_statements(&b.body, target, uri, out),
        Statement::AwaitOne(b) => {
            for case in &b.cases {
                if let AwaitOneCase::Target { target: t, .. } = case {
                    collect_in_target(t, target, uri, out);
                }
                collect_in_statements(case.body(), target, uri, out);
            }
        }
        Statement::Switch(b) => {
            for case in &b.cases {
                collect_in_statements(&case.body, target, uri, out);
            }
            if let Some(default) = &b.default {
                collect_in_statements(default, target, uri, out);
            }
        }
        Statement::If(s) => {
            collect_in_statements(&s.body, target, uri, out);
            if let Some(else_body) = &s.else_body {
                collect_in_statements(else_body, target, uri, out);
            }
        }
        Statement::For(s) => collect_in_statements(&s.body, target, uri, out),
        _ => {}
    }
}

fn collect_in_target(awaited: &AwaitTarget, target: DefId, uri: &Url, out: &mut Vec<Location>) {
    match awaited {
        AwaitTarget::Activity(c) => push_if_match(c.resolved, target, &c.name_position, &c.name, uri, out),
        AwaitTarget::Workflow(c) => push_if_match(c.resolved, target, &c.name_position, &c.name, uri, out),
        _ => {}
    }
}

fn push_if_match(
    resolved: Option<DefId>,
    target: DefId,
    name_position: &twf_common::Position,
    name: &str,
    uri: &Url,
    out: &mut Vec<Location>,
) {
    if resolved == Some(target) {
        out.push(location(uri, *name_position, name));
    }
}

fn location(uri: &Url, position: twf_common::Position, name: &str) -> Location {
    Location {
        uri: uri.clone(),
        range: name_range(position, name),
    }
}

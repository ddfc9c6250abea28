//! Conversions between 1-based parser [`Position`]s and 0-based LSP
//! `Position`s, plus the small line-indexing helpers the editor queries
//! share.

use tower_lsp::lsp_types;
use twf_common::Position;

/// Converts a 1-based parser position to a 0-based LSP position.
pub fn to_lsp(p: Position) -> lsp_types::Position {
    lsp_types::Position::new(p.line - 1, p.column - 1)
}

/// Converts a 0-based LSP position's line to the parser's 1-based line
/// number. Editor queries key off line only -- names never span lines.
pub fn line_from_lsp(p: lsp_types::Position) -> u32 {
    p.line + 1
}

/// A `Range` spanning `name` starting at `position` (1-based), used for
/// the reference/rename/hover spans that highlight just an identifier
/// token rather than a whole construct.
pub fn name_range(position: Position, name: &str) -> lsp_types::Range {
    let start = to_lsp(position);
    let end = lsp_types::Position::new(start.line, start.character + name.chars().count() as u32);
    lsp_types::Range::new(start, end)
}

pub fn point_range(position: Position) -> lsp_types::Range {
    let p = to_lsp(position);
    lsp_types::Range::new(p, p)
}

/// The last line (0-based, LSP numbering) reached by walking a statement
/// list, used by document symbols and folding to compute a node's full
/// range. Returns `start_line` unchanged for an empty body.
pub fn last_line_of_statements(stmts: &[twf_parser::ast::Statement], start_line: u32) -> u32 {
    stmts.iter().fold(start_line, |acc, stmt| acc.max(last_line_of_statement(stmt)))
}

/// The last line reached by walking a workflow: its own body plus every
/// declared signal/query/update handler body, whichever reaches furthest.
/// Shared by document symbols (the workflow's full range) and folding (the
/// workflow's own fold region).
pub fn last_line_of_workflow(w: &twf_parser::ast::WorkflowDef) -> u32 {
    let own = last_line_of_statements(&w.body, w.position.line);
    let handlers = w
        .signals
        .iter()
        .filter_map(|s| s.body.as_deref())
        .chain(w.queries.iter().filter_map(|q| q.body.as_deref()))
        .chain(w.updates.iter().filter_map(|u| u.body.as_deref()));
    handlers.fold(own, |acc, body| acc.max(last_line_of_statements(body, acc)))
}

fn last_line_of_statement(stmt: &twf_parser::ast::Statement) -> u32 {
    use twf_parser::ast::Statement;
    let own = stmt.position().line;
    let nested = match stmt {
        Statement::AwaitAll(b) => last_line_of_statements(&b.body, own),
        Statement::AwaitOne(b) => b.cases.iter().fold(own, |acc, case| {
            acc.max(last_line_of_statements(case.body(), case.position().line))
        }),
        Statement::Switch(b) => {
            let cases_max = b.cases.iter().fold(own, |acc, c| acc.max(last_line_of_statements(&c.body, c.position.line)));
            match &b.default {
                Some(default) => last_line_of_statements(default, cases_max),
                None => cases_max,
            }
        }
        Statement::If(s) => {
            let body_max = last_line_of_statements(&s.body, own);
            match &s.else_body {
                Some(else_body) => last_line_of_statements(else_body, body_max),
                None => body_max,
            }
        }
        Statement::For(s) => last_line_of_statements(&s.body, own),
        _ => own,
    };
    nested.max(own)
}

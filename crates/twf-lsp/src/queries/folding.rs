//! `textDocument/foldingRange` (§4.7).
//!
//! One region per definition, per declared handler, and per `await all`/
//! `await one`/`switch`/`if`/`for` block and case body, using the same
//! "last line reached by walking the body" computation `symbols` uses for
//! full ranges. Zero-height folds (a header with nothing below it on a
//! later line) are dropped.

use tower_lsp::lsp_types::FoldingRange;

use twf_parser::ast::*;

use crate::pos::{last_line_of_statements, last_line_of_workflow};

pub fn folding_ranges(file: &File) -> Vec<FoldingRange> {
    let mut out = Vec::new();
    for def in &file.definitions {
        match def {
            Definition::Workflow(w) => {
                push(&mut out, w.position.line, last_line_of_workflow(w));
                for s in &w.signals {
                    if let Some(body) = &s.body {
                        push(&mut out, s.position.line, last_line_of_statements(body, s.position.line));
                        collect_statements(&mut out, body);
                    }
                }
                for q in &w.queries {
                    if let Some(body) = &q.body {
                        push(&mut out, q.position.line, last_line_of_statements(body, q.position.line));
                        collect_statements(&mut out, body);
                    }
                }
                for u in &w.updates {
                    if let Some(body) = &u.body {
                        push(&mut out, u.position.line, last_line_of_statements(body, u.position.line));
                        collect_statements(&mut out, body);
                    }
                }
                collect_statements(&mut out, &w.body);
            }
            Definition::Activity(a) => {
                push(&mut out, a.position.line, last_line_of_statements(&a.body, a.position.line));
                collect_statements(&mut out, &a.body);
            }
        }
    }
    out
}

fn push(out: &mut Vec<FoldingRange>, start_line: u32, end_line: u32) {
    if start_line == end_line {
        return;
    }
    out.push(FoldingRange {
        start_line: start_line - 1,
        start_character: None,
        end_line: end_line - 1,
        end_character: None,
        kind: None,
        collapsed_text: None,
    });
}

fn collect_statements(out: &mut Vec<FoldingRange>, stmts: &[Statement]) {
    for stmt in stmts {
        collect_statement(out, stmt);
    }
}

fn collect_statement(out: &mut Vec<FoldingRange>, stmt: &Statement) {
    match stmt {
        Statement::AwaitAll(b) => {
            push(out, b.position.line, last_line_of_statements(&b.body, b.position.line));
            collect_statements(out, &b.body);
        }
        Statement::AwaitOne(b) => {
            let end = b
                .cases
                .iter()
                .fold(b.position.line, |acc, c| acc.max(last_line_of_statements(c.body(), c.position().line)));
            push(out, b.position.line, end);
            for case in &b.cases {
                push(out, case.position().line, last_line_of_statements(case.body(), case.position().line));
                collect_statements(out, case.body());
            }
        }
        Statement::Switch(b) => {
            let cases_end = b
                .cases
                .iter()
                .fold(b.position.line, |acc, c| acc.max(last_line_of_statements(&c.body, c.position.line)));
            let full_end = match &b.default {
                Some(default) => last_line_of_statements(default, cases_end),
                None => cases_end,
            };
            push(out, b.position.line, full_end);
            for case in &b.cases {
                push(out, case.position.line, last_line_of_statements(&case.body, case.position.line));
                collect_statements(out, &case.body);
            }
            if let Some(default) = &b.default {
                collect_statements(out, default);
            }
        }
        Statement::If(s) => {
            push(out, s.position.line, last_line_of_statements(&s.body, s.position.line));
            collect_statements(out, &s.body);
            if let Some(else_body) = &s.else_body {
                if let Some(first) = else_body.first() {
                    push(out, first.position().line, last_line_of_statements(else_body, first.position().line));
                }
                collect_statements(out, else_body);
            }
        }
        Statement::For(s) => {
            push(out, s.position.line, last_line_of_statements(&s.body, s.position.line));
            collect_statements(out, &s.body);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn folds_workflow_and_nested_if() {
        let src = "workflow A():\n    if (x):\n        return 1\n    return 2\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        let ranges = folding_ranges(&file);
        assert!(ranges.iter().any(|r| r.start_line == 0 && r.end_line == 3));
        assert!(ranges.iter().any(|r| r.start_line == 1 && r.end_line == 2));
    }

    #[test]
    fn zero_height_folds_are_dropped() {
        let (file, errors) = parse_tolerant("activity A():\n    return\n");
        assert!(errors.is_empty());
        let ranges = folding_ranges(&file);
        assert!(ranges.is_empty());
    }

    #[test]
    fn switch_block_folds_each_case() {
        let src = "workflow A():\n    switch (x):\n        case 1:\n            return 1\n        case 2:\n            return 2\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty(), "{errors:?}");
        let ranges = folding_ranges(&file);
        assert!(ranges.iter().any(|r| r.start_line == 2 && r.end_line == 3));
        assert!(ranges.iter().any(|r| r.start_line == 4 && r.end_line == 5));
    }
}

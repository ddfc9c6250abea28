//! `textDocument/inlayHint` (§4.7).
//!
//! A parameter-name hint before each argument of a resolved call, a type
//! hint after a bound result identifier, and a humanized duration for
//! single-target timer awaits. Positions are found by re-scanning the
//! source line the call's header lives on (the AST only carries opaque
//! `args`/`params` strings, never their own column offsets), so a call
//! whose `ARGS` payload spans multiple lines is skipped -- decorative
//! hints are allowed to be dropped rather than guessed at.

use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Position as LspPosition};

use twf_common::Position;
use twf_parser::ast::*;

pub fn inlay_hints(file: &File, source: &str, visible_start_line: u32, visible_end_line: u32) -> Vec<InlayHint> {
    let mut out = Vec::new();
    for def in &file.definitions {
        match def {
            Definition::Workflow(w) => {
                for body in w
                    .signals
                    .iter()
                    .filter_map(|s| s.body.as_deref())
                    .chain(w.queries.iter().filter_map(|q| q.body.as_deref()))
                    .chain(w.updates.iter().filter_map(|u| u.body.as_deref()))
                {
                    collect_statements(file, source, body, &mut out);
                }
                collect_statements(file, source, &w.body, &mut out);
            }
            Definition::Activity(a) => collect_statements(file, source, &a.body, &mut out),
        }
    }
    out.retain(|h| h.position.line + 1 >= visible_start_line && h.position.line + 1 <= visible_end_line);
    out
}

fn collect_statements(file: &File, source: &str, stmts: &[Statement], out: &mut Vec<InlayHint>) {
    for stmt in stmts {
        collect_statement(file, source, stmt, out);
    }
}

fn collect_statement(file: &File, source: &str, stmt: &Statement, out: &mut Vec<InlayHint>) {
    match stmt {
        Statement::ActivityCall(c) => hints_for_activity_call(file, source, c, out),
        Statement::WorkflowCall(c) => hints_for_workflow_call(file, source, c, out),
        Statement::Await(s) => hints_for_target(file, source, &s.target, out),
        Statement::AwaitAll(b) => collect_statements(file, source, &b.body, out),
        Statement::AwaitOne(b) => {
            for case in &b.cases {
                if let AwaitOneCase::Target { target, body, .. } = case {
                    hints_for_target(file, source, target, out);
                    collect_statements(file, source, body, out);
                } else {
                    collect_statements(file, source, case.body(), out);
                }
            }
        }
        Statement::Switch(b) => {
            for case in &b.cases {
                collect_statements(file, source, &case.body, out);
            }
            if let Some(default) = &b.default {
                collect_statements(file, source, default, out);
            }
        }
        Statement::If(s) => {
            collect_statements(file, source, &s.body, out);
            if let Some(else_body) = &s.else_body {
                collect_statements(file, source, else_body, out);
            }
        }
        Statement::For(s) => collect_statements(file, source, &s.body, out),
        _ => {}
    }
}

fn hints_for_target(file: &File, source: &str, target: &AwaitTarget, out: &mut Vec<InlayHint>) {
    match target {
        AwaitTarget::Timer { duration, position } => hints_for_timer(source, duration, *position, out),
        AwaitTarget::Activity(c) => hints_for_activity_call(file, source, c, out),
        AwaitTarget::Workflow(c) => hints_for_workflow_call(file, source, c, out),
        _ => {}
    }
}

fn hints_for_activity_call(file: &File, source: &str, c: &ActivityCall, out: &mut Vec<InlayHint>) {
    let def = c.resolved.and_then(|id| file.definitions.get(id));
    hints_for_call(source, def, c.name_position, &c.name, &c.args, c.result.as_deref(), out);
}

fn hints_for_workflow_call(file: &File, source: &str, c: &WorkflowCall, out: &mut Vec<InlayHint>) {
    let def = c.resolved.and_then(|id| file.definitions.get(id));
    hints_for_call(source, def, c.name_position, &c.name, &c.args, c.result.as_deref(), out);
}

fn hints_for_call(
    source: &str,
    def: Option<&Definition>,
    name_position: Position,
    name: &str,
    args: &str,
    result: Option<&str>,
    out: &mut Vec<InlayHint>,
) {
    let Some(def) = def else { return };
    if args.contains('\n') {
        return;
    }
    let Some(line) = line_text(source, name_position.line) else { return };
    let name_end = (name_position.column - 1) as usize + name.chars().count();
    if let Some(open_rel) = line.get(name_end..).and_then(|rest| rest.find('(')) {
        let open_col0 = name_end + open_rel;
        let params = params_of(def);
        for ((start, _end), param_name) in split_offsets(args).into_iter().zip(param_names(params)) {
            if param_name.is_empty() {
                continue;
            }
            let hint_col0 = open_col0 + 1 + start;
            out.push(param_hint(name_position.line, hint_col0 as u32, &param_name));
        }
    }

    if let (Some(result_name), Some(ret_ty)) = (result, return_type_of(def)) {
        if let Some(arrow_rel) = line.find("->") {
            let after_arrow = arrow_rel + 2;
            if let Some(ws) = line.get(after_arrow..).and_then(|rest| rest.find(|c: char| !c.is_whitespace())) {
                let ident_start = after_arrow + ws;
                let hint_col0 = ident_start + result_name.chars().count();
                out.push(type_hint(name_position.line, hint_col0 as u32, ret_ty));
            }
        }
    }
}

fn hints_for_timer(source: &str, duration: &str, position: Position, out: &mut Vec<InlayHint>) {
    let Some(text) = humanize_duration(duration) else { return };
    let Some(line) = line_text(source, position.line) else { return };
    let keyword_end = (position.column - 1) as usize + "timer".len();
    let Some(paren_rel) = line.get(keyword_end..).and_then(|rest| rest.find('(')) else { return };
    let paren_col0 = keyword_end + paren_rel;
    out.push(hint_at(position.line, (paren_col0 + 1) as u32, text, InlayHintKind::PARAMETER));
}

fn params_of(def: &Definition) -> &str {
    match def {
        Definition::Workflow(w) => &w.params,
        Definition::Activity(a) => &a.params,
    }
}

fn return_type_of(def: &Definition) -> Option<&str> {
    match def {
        Definition::Workflow(w) => w.return_type.as_deref(),
        Definition::Activity(a) => a.return_type.as_deref(),
    }
}

fn line_text(source: &str, line_1based: u32) -> Option<&str> {
    source.lines().nth((line_1based - 1) as usize)
}

/// Comma-split offsets (start, end), trimmed of surrounding whitespace, of
/// `s`'s components -- shared shape with `signature::build`'s param ranges,
/// but relative to `s` itself rather than a label it is embedded in.
fn split_offsets(s: &str) -> Vec<(usize, usize)> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut offsets = Vec::new();
    let mut offset = 0;
    for part in s.split(',') {
        let start = offset;
        let end = start + part.len();
        let trimmed_start = start + (part.len() - part.trim_start().len());
        let trimmed_end = end - (part.len() - part.trim_end().len());
        offsets.push((trimmed_start, trimmed_end));
        offset = end + 1;
    }
    offsets
}

fn param_names(params: &str) -> Vec<String> {
    if params.trim().is_empty() {
        return Vec::new();
    }
    params.split(',').map(|p| p.trim().split(':').next().unwrap_or("").trim().to_string()).collect()
}

fn humanize_duration(duration: &str) -> Option<String> {
    let duration = duration.trim();
    let split_at = duration.find(|c: char| !c.is_ascii_digit())?;
    let (num_str, unit) = duration.split_at(split_at);
    let num: u64 = num_str.parse().ok()?;
    let unit_name = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => "second",
        "m" | "min" | "mins" | "minute" | "minutes" => "minute",
        "h" | "hr" | "hrs" | "hour" | "hours" => "hour",
        "d" | "day" | "days" => "day",
        "w" | "wk" | "wks" | "week" | "weeks" => "week",
        _ => return None,
    };
    let plural = if num == 1 { "" } else { "s" };
    Some(format!("{num} {unit_name}{plural}"))
}

fn param_hint(line_1based: u32, col0: u32, name: &str) -> InlayHint {
    hint_at(line_1based, col0, format!("{name}:"), InlayHintKind::PARAMETER)
}

fn type_hint(line_1based: u32, col0: u32, ty: &str) -> InlayHint {
    hint_at(line_1based, col0, format!(": {ty}"), InlayHintKind::TYPE)
}

fn hint_at(line_1based: u32, col0: u32, label: impl Into<String>, kind: InlayHintKind) -> InlayHint {
    InlayHint {
        position: LspPosition::new(line_1based - 1, col0),
        label: InlayHintLabel::String(label.into()),
        kind: Some(kind),
        text_edits: None,
        tooltip: None,
        padding_left: Some(kind == InlayHintKind::TYPE),
        padding_right: Some(kind == InlayHintKind::PARAMETER),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_analysis::resolve;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn parameter_name_hint_before_argument() {
        let src = "workflow A():\n    activity Greet(\"Ada\")\nactivity Greet(name: string):\n    return\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty(), "{errors:?}");
        resolve(&mut file);
        let hints = inlay_hints(&file, src, 1, 10);
        let names: Vec<_> = hints
            .iter()
            .map(|h| match &h.label {
                InlayHintLabel::String(s) => s.clone(),
                _ => String::new(),
            })
            .collect();
        assert!(names.iter().any(|n| n == "name:"));
    }

    #[test]
    fn type_hint_after_bound_result() {
        let src = "workflow A():\n    activity Greet() -> r\nactivity Greet() -> (string):\n    return\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty(), "{errors:?}");
        resolve(&mut file);
        let hints = inlay_hints(&file, src, 1, 10);
        let has_type_hint = hints.iter().any(|h| match &h.label {
            InlayHintLabel::String(s) => s == ": string",
            _ => false,
        });
        assert!(has_type_hint);
    }

    #[test]
    fn hints_pruned_to_visible_range() {
        let src = "workflow A():\n    activity Greet(\"Ada\")\nactivity Greet(name: string):\n    return\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        resolve(&mut file);
        assert!(inlay_hints(&file, src, 5, 10).is_empty());
    }

    #[test]
    fn unresolved_call_yields_no_hints() {
        let src = "workflow A():\n    activity Missing(\"Ada\")\n";
        let (mut file, errors) = parse_tolerant(src);
        assert!(errors.is_empty());
        resolve(&mut file);
        assert!(inlay_hints(&file, src, 1, 10).is_empty());
    }

    #[test]
    fn humanizes_timer_duration() {
        assert_eq!(humanize_duration("5m").as_deref(), Some("5 minutes"));
        assert_eq!(humanize_duration("1h").as_deref(), Some("1 hour"));
        assert_eq!(humanize_duration("not-a-duration"), None);
    }
}

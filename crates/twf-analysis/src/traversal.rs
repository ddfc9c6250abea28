//! AST traversal utilities shared by the editor queries (§4.6).

use twf_common::Position;
use twf_parser::ast::*;

/// A node reachable via [`node_at_line`]: everything the editor queries
/// need to hover over, jump to, or rename.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Definition(&'a Definition),
    Signal(&'a SignalDecl),
    Query(&'a QueryDecl),
    Update(&'a UpdateDecl),
    Statement(&'a Statement),
    AwaitTarget(&'a AwaitTarget),
    AwaitOneCase(&'a AwaitOneCase),
    SwitchCase(&'a SwitchCase),
}

impl<'a> Node<'a> {
    pub fn position(&self) -> Position {
        match self {
            Node::Definition(d) => d.position(),
            Node::Signal(s) => s.position,
            Node::Query(q) => q.position,
            Node::Update(u) => u.position,
            Node::Statement(s) => s.position(),
            Node::AwaitTarget(t) => t.position(),
            Node::AwaitOneCase(c) => c.position(),
            Node::SwitchCase(c) => c.position,
        }
    }
}

/// Returns the innermost node whose own declared line equals `line`,
/// searching definitions, their declared signal/query/update handlers, and
/// statements in document order. Descends into nested statement bodies
/// before considering the enclosing node, so a block header and its first
/// nested statement sharing a line favor the nested statement.
pub fn node_at_line(file: &File, line: u32) -> Option<Node<'_>> {
    file.definitions.iter().find_map(|def| node_in_definition(def, line))
}

fn node_in_definition(def: &Definition, line: u32) -> Option<Node<'_>> {
    match def {
        Definition::Workflow(w) => w
            .signals
            .iter()
            .find_map(|s| node_in_signal(s, line))
            .or_else(|| w.queries.iter().find_map(|q| node_in_query(q, line)))
            .or_else(|| w.updates.iter().find_map(|u| node_in_update(u, line)))
            .or_else(|| node_in_statements(&w.body, line))
            .or_else(|| (w.position.line == line).then(|| Node::Definition(def))),
        Definition::Activity(a) => node_in_statements(&a.body, line)
            .or_else(|| (a.position.line == line).then(|| Node::Definition(def))),
    }
}

fn node_in_signal(s: &SignalDecl, line: u32) -> Option<Node<'_>> {
    s.body
        .as_deref()
        .and_then(|body| node_in_statements(body, line))
        .or_else(|| (s.position.line == line).then(|| Node::Signal(s)))
}

fn node_in_query(q: &QueryDecl, line: u32) -> Option<Node<'_>> {
    q.body
        .as_deref()
        .and_then(|body| node_in_statements(body, line))
        .or_else(|| (q.position.line == line).then(|| Node::Query(q)))
}

fn node_in_update(u: &UpdateDecl, line: u32) -> Option<Node<'_>> {
    u.body
        .as_deref()
        .and_then(|body| node_in_statements(body, line))
        .or_else(|| (u.position.line == line).then(|| Node::Update(u)))
}

fn node_in_statements(stmts: &[Statement], line: u32) -> Option<Node<'_>> {
    stmts.iter().find_map(|stmt| node_in_statement(stmt, line))
}

fn node_in_statement(stmt: &Statement, line: u32) -> Option<Node<'_>> {
    let nested = match stmt {
        Statement::AwaitAll(block) => node_in_statements(&block.body, line),
        Statement::AwaitOne(block) => block.cases.iter().find_map(|case| {
            node_in_statements(case.body(), line).or_else(|| (case.position().line == line).then(|| Node::AwaitOneCase(case)))
        }),
        Statement::Switch(block) => block
            .cases
            .iter()
            .find_map(|case| {
                node_in_statements(&case.body, line).or_else(|| (case.position.line == line).then(|| Node::SwitchCase(case)))
            })
            .or_else(|| block.default.as_deref().and_then(|d| node_in_statements(d, line))),
        Statement::If(s) => {
            node_in_statements(&s.body, line).or_else(|| s.else_body.as_deref().and_then(|e| node_in_statements(e, line)))
        }
        Statement::For(s) => node_in_statements(&s.body, line),
        Statement::Await(s) => (s.target.position().line == line).then(|| Node::AwaitTarget(&s.target)),
        _ => None,
    };
    nested.or_else(|| (stmt.position().line == line).then(|| Node::Statement(stmt)))
}

/// Maps a cursor line to {top-level, inside workflow W, inside activity A}
/// by comparing against each definition's declared line and the line of
/// the next definition (or infinity).
#[derive(Debug, Clone, Copy)]
pub enum LineContext<'a> {
    TopLevel,
    InWorkflow(&'a WorkflowDef),
    InActivity(&'a ActivityDef),
}

pub fn context_at_line(file: &File, line: u32) -> LineContext<'_> {
    let defs = &file.definitions;
    for (i, def) in defs.iter().enumerate() {
        let start = def.position().line;
        let end = defs.get(i + 1).map(|d| d.position().line).unwrap_or(u32::MAX);
        if line >= start && line < end {
            return match def {
                Definition::Workflow(w) => LineContext::InWorkflow(w),
                Definition::Activity(a) => LineContext::InActivity(a),
            };
        }
    }
    LineContext::TopLevel
}

/// The `(name, kind)` pair for a node, normalizing call/await references to
/// the name of the definition they resolve to; unresolved references fall
/// back to their own textual name.
pub fn name_of_node<'a>(file: &File, node: &Node<'a>) -> Option<(String, &'static str)> {
    match node {
        Node::Definition(Definition::Workflow(w)) => Some((w.name.clone(), "workflow")),
        Node::Definition(Definition::Activity(a)) => Some((a.name.clone(), "activity")),
        Node::Signal(s) => Some((s.name.clone(), "signal")),
        Node::Query(q) => Some((q.name.clone(), "query")),
        Node::Update(u) => Some((u.name.clone(), "update")),
        Node::Statement(Statement::ActivityCall(c)) => Some(name_for_activity_call(file, c)),
        Node::Statement(Statement::WorkflowCall(c)) => Some(name_for_workflow_call(file, c)),
        Node::AwaitTarget(t) => name_for_await_target(file, t),
        _ => None,
    }
}

fn name_for_activity_call(file: &File, call: &ActivityCall) -> (String, &'static str) {
    let name = call
        .resolved
        .and_then(|id| file.activity(id))
        .map(|a| a.name.clone())
        .unwrap_or_else(|| call.name.clone());
    (name, "activity")
}

fn name_for_workflow_call(file: &File, call: &WorkflowCall) -> (String, &'static str) {
    let name = call
        .resolved
        .and_then(|id| file.workflow(id))
        .map(|w| w.name.clone())
        .unwrap_or_else(|| call.name.clone());
    (name, "workflow")
}

fn name_for_await_target(file: &File, target: &AwaitTarget) -> Option<(String, &'static str)> {
    match target {
        AwaitTarget::Timer { .. } => None,
        AwaitTarget::Signal { name, .. } => Some((name.clone(), "signal")),
        AwaitTarget::Update { name, .. } => Some((name.clone(), "update")),
        AwaitTarget::Activity(c) => Some(name_for_activity_call(file, c)),
        AwaitTarget::Workflow(c) => Some(name_for_workflow_call(file, c)),
    }
}

/// Locates the first `ActivityCall` (standalone or inside an `await`)
/// matching `name`, used by the "add missing definition" code action to
/// scavenge an argument shape for the stub it synthesizes.
pub fn find_activity_call_by_name<'a>(file: &'a File, name: &str) -> Option<&'a ActivityCall> {
    for def in &file.definitions {
        let found = match def {
            Definition::Workflow(w) => w
                .signals
                .iter()
                .filter_map(|s| s.body.as_deref())
                .chain(w.queries.iter().filter_map(|q| q.body.as_deref()))
                .chain(w.updates.iter().filter_map(|u| u.body.as_deref()))
                .find_map(|body| find_call_in_statements(body, name))
                .or_else(|| find_call_in_statements(&w.body, name)),
            Definition::Activity(a) => find_call_in_statements(&a.body, name),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn find_call_in_statements<'a>(stmts: &'a [Statement], name: &str) -> Option<&'a ActivityCall> {
    stmts.iter().find_map(|stmt| find_call_in_statement(stmt, name))
}

fn find_call_in_statement<'a>(stmt: &'a Statement, name: &str) -> Option<&'a ActivityCall> {
    match stmt {
        Statement::ActivityCall(c) if c.name == name => Some(c),
        Statement::AwaitAll(b) => find_call_in_statements(&b.body, name),
        Statement::AwaitOne(b) => b.cases.iter().find_map(|case| match case {
            AwaitOneCase::Target { target, body, .. } => find_call_in_target(target, name)
                .or_else(|| find_call_in_statements(body, name)),
            AwaitOneCase::NestedAwaitAll { body, .. } => find_call_in_statements(body, name),
        }),
        Statement::Switch(b) => b
            .cases
            .iter()
            .find_map(|c| find_call_in_statements(&c.body, name))
            .or_else(|| b.default.as_deref().and_then(|d| find_call_in_statements(d, name))),
        Statement::If(s) => {
            find_call_in_statements(&s.body, name).or_else(|| s.else_body.as_deref().and_then(|e| find_call_in_statements(e, name)))
        }
        Statement::For(s) => find_call_in_statements(&s.body, name),
        Statement::Await(s) => find_call_in_target(&s.target, name),
        _ => None,
    }
}

fn find_call_in_target<'a>(target: &'a AwaitTarget, name: &str) -> Option<&'a ActivityCall> {
    match target {
        AwaitTarget::Activity(c) if c.name == name => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn node_at_line_finds_innermost_statement() {
        let (file, errors) = parse_tolerant("workflow A():\n    if (x):\n        return 1\n    return 2\n");
        assert!(errors.is_empty());
        let node = node_at_line(&file, 3).unwrap();
        match node {
            Node::Statement(Statement::Return(r)) => assert_eq!(r.value.as_deref(), Some("1")),
            other => panic!("expected nested return, got {other:?}"),
        }
    }

    #[test]
    fn node_at_line_finds_definition_header() {
        let (file, errors) = parse_tolerant("workflow A():\n    return\n");
        assert!(errors.is_empty());
        let node = node_at_line(&file, 1).unwrap();
        assert!(matches!(node, Node::Definition(Definition::Workflow(_))));
    }

    #[test]
    fn context_at_line_maps_cursor_to_enclosing_definition() {
        let (file, errors) = parse_tolerant("workflow A():\n    return\nactivity B():\n    return\n");
        assert!(errors.is_empty());
        assert!(matches!(context_at_line(&file, 2), LineContext::InWorkflow(w) if w.name == "A"));
        assert!(matches!(context_at_line(&file, 4), LineContext::InActivity(a) if a.name == "B"));
    }

    #[test]
    fn name_of_node_normalizes_through_resolution() {
        use crate::resolver::resolve;
        let (mut file, errors) = parse_tolerant("workflow A():\n    activity B()\nactivity B():\n    return\n");
        assert!(errors.is_empty());
        resolve(&mut file);
        let node = node_at_line(&file, 2).unwrap();
        let (name, kind) = name_of_node(&file, &node).unwrap();
        assert_eq!(name, "B");
        assert_eq!(kind, "activity");
    }

    #[test]
    fn find_activity_call_by_name_scavenges_args() {
        let (file, errors) = parse_tolerant("workflow A():\n    activity Greet(name: \"Ada\")\n");
        assert!(errors.is_empty());
        let call = find_activity_call_by_name(&file, "Greet").unwrap();
        assert_eq!(call.args, "name: \"Ada\"");
    }
}

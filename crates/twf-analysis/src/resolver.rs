//! Two-pass name resolver linking call sites and await targets to their
//! declarations (§4.3).
//!
//! Pass one builds flat `name -> DefId` tables for workflows and
//! activities, recording a "duplicate ... definition" error for every
//! collision while keeping the first occurrence in the table. Pass two
//! walks every statement reachable from a definition (recursing into
//! if/for/await blocks and switch/await-one cases) and either sets the
//! reference's resolution pointer or records an "undefined ..." error --
//! never both.

use rustc_hash::FxHashMap;

use twf_common::ResolveError;
use twf_parser::ast::*;

/// Resolve every call site and await target in `file` in place, returning
/// the resolve errors encountered in source order.
pub fn resolve(file: &mut File) -> Vec<ResolveError> {
    let mut workflow_table: FxHashMap<String, DefId> = FxHashMap::default();
    let mut activity_table: FxHashMap<String, DefId> = FxHashMap::default();
    let mut errors = Vec::new();

    for (id, def) in file.definitions.iter().enumerate() {
        let table = match def {
            Definition::Workflow(_) => &mut workflow_table,
            Definition::Activity(_) => &mut activity_table,
        };
        if table.contains_key(def.name()) {
            let kind = if matches!(def, Definition::Workflow(_)) {
                "workflow"
            } else {
                "activity"
            };
            errors.push(ResolveError::new(
                format!("duplicate {kind} definition: {}", def.name()),
                def.position(),
            ));
        } else {
            table.insert(def.name().to_string(), id);
        }
    }

    let mut resolver = Resolver {
        workflow_table,
        activity_table,
        errors,
    };
    for def in &mut file.definitions {
        match def {
            Definition::Workflow(w) => resolver.resolve_workflow(w),
            Definition::Activity(a) => resolver.resolve_statements(&mut a.body, None),
        }
    }
    resolver.errors
}

/// Per-workflow lookup tables for the signal/update declarations an
/// `await` inside that workflow's body may reference. Built once per
/// workflow from owned clones of the declaration names, so the mutable
/// walk over the workflow's bodies below never has to borrow `signals`/
/// `updates` and `body` at the same time.
struct LocalTables {
    signals: FxHashMap<String, LocalDeclId>,
    updates: FxHashMap<String, LocalDeclId>,
}

struct Resolver {
    workflow_table: FxHashMap<String, DefId>,
    activity_table: FxHashMap<String, DefId>,
    errors: Vec<ResolveError>,
}

impl Resolver {
    fn resolve_workflow(&mut self, w: &mut WorkflowDef) {
        let locals = self.build_locals(w);

        for decl in &mut w.signals {
            if let Some(body) = &mut decl.body {
                self.resolve_statements(body, Some(&locals));
            }
        }
        for decl in &mut w.queries {
            if let Some(body) = &mut decl.body {
                self.resolve_statements(body, Some(&locals));
            }
        }
        for decl in &mut w.updates {
            if let Some(body) = &mut decl.body {
                self.resolve_statements(body, Some(&locals));
            }
        }
        self.resolve_statements(&mut w.body, Some(&locals));
    }

    /// Builds the signal/update lookup tables and records "duplicate ...
    /// definition" errors for same-kind collisions within this workflow
    /// (the per-kind uniqueness invariant in §3), keeping the first
    /// occurrence.
    fn build_locals(&mut self, w: &WorkflowDef) -> LocalTables {
        let mut signals = FxHashMap::default();
        for (idx, decl) in w.signals.iter().enumerate() {
            if signals.contains_key(&decl.name) {
                self.errors.push(ResolveError::new(
                    format!("duplicate signal definition: {}", decl.name),
                    decl.position,
                ));
            } else {
                signals.insert(decl.name.clone(), idx);
            }
        }

        // Queries are never referenced by an await target, so they get no
        // lookup table -- just the duplicate check.
        let mut seen_queries: FxHashMap<&str, ()> = FxHashMap::default();
        for decl in &w.queries {
            if seen_queries.insert(&decl.name, ()).is_some() {
                self.errors.push(ResolveError::new(
                    format!("duplicate query definition: {}", decl.name),
                    decl.position,
                ));
            }
        }

        let mut updates = FxHashMap::default();
        for (idx, decl) in w.updates.iter().enumerate() {
            if updates.contains_key(&decl.name) {
                self.errors.push(ResolveError::new(
                    format!("duplicate update definition: {}", decl.name),
                    decl.position,
                ));
            } else {
                updates.insert(decl.name.clone(), idx);
            }
        }

        LocalTables { signals, updates }
    }

    fn resolve_statements(&mut self, stmts: &mut [Statement], locals: Option<&LocalTables>) {
        for stmt in stmts {
            self.resolve_statement(stmt, locals);
        }
    }

    fn resolve_statement(&mut self, stmt: &mut Statement, locals: Option<&LocalTables>) {
        match stmt {
            Statement::ActivityCall(call) => self.resolve_activity_call(call),
            Statement::WorkflowCall(call) => self.resolve_workflow_call(call),
            Statement::Await(s) => self.resolve_await_target(&mut s.target, locals),
            Statement::AwaitAll(block) => self.resolve_statements(&mut block.body, locals),
            Statement::AwaitOne(block) => {
                for case in &mut block.cases {
                    match case {
                        AwaitOneCase::Target { target, body, .. } => {
                            self.resolve_await_target(target, locals);
                            self.resolve_statements(body, locals);
                        }
                        AwaitOneCase::NestedAwaitAll { body, .. } => {
                            self.resolve_statements(body, locals);
                        }
                    }
                }
            }
            Statement::Switch(block) => {
                for case in &mut block.cases {
                    self.resolve_statements(&mut case.body, locals);
                }
                if let Some(default) = &mut block.default {
                    self.resolve_statements(default, locals);
                }
            }
            Statement::If(s) => {
                self.resolve_statements(&mut s.body, locals);
                if let Some(else_body) = &mut s.else_body {
                    self.resolve_statements(else_body, locals);
                }
            }
            Statement::For(s) => self.resolve_statements(&mut s.body, locals),
            Statement::Return(_)
            | Statement::Close(_)
            | Statement::ContinueAsNew(_)
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Raw(_)
            | Statement::Comment(_) => {}
        }
    }

    fn resolve_activity_call(&mut self, call: &mut ActivityCall) {
        match self.activity_table.get(&call.name) {
            Some(&id) => call.resolved = Some(id),
            None => self.errors.push(ResolveError::new(
                format!("undefined activity: {}", call.name),
                call.position,
            )),
        }
    }

    fn resolve_workflow_call(&mut self, call: &mut WorkflowCall) {
        match self.workflow_table.get(&call.name) {
            Some(&id) => call.resolved = Some(id),
            None => self.errors.push(ResolveError::new(
                format!("undefined workflow: {}", call.name),
                call.position,
            )),
        }
    }

    fn resolve_await_target(&mut self, target: &mut AwaitTarget, locals: Option<&LocalTables>) {
        match target {
            AwaitTarget::Timer { .. } => {}
            AwaitTarget::Signal {
                name,
                position,
                resolved,
                ..
            } => match locals.and_then(|l| l.signals.get(name.as_str())) {
                Some(&idx) => *resolved = Some(idx),
                None => self
                    .errors
                    .push(ResolveError::new(format!("undefined signal: {name}"), *position)),
            },
            AwaitTarget::Update {
                name,
                position,
                resolved,
                ..
            } => match locals.and_then(|l| l.updates.get(name.as_str())) {
                Some(&idx) => *resolved = Some(idx),
                None => self
                    .errors
                    .push(ResolveError::new(format!("undefined update: {name}"), *position)),
            },
            AwaitTarget::Activity(call) => self.resolve_activity_call(call),
            AwaitTarget::Workflow(call) => self.resolve_workflow_call(call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_parser::parser::parse_tolerant;

    fn resolve_source(src: &str) -> (File, Vec<ResolveError>) {
        let (mut file, parse_errors) = parse_tolerant(src);
        assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");
        let errors = resolve(&mut file);
        (file, errors)
    }

    #[test]
    fn resolution_success() {
        let (file, errors) = resolve_source("workflow A():\n    activity B()\nactivity B():\n    return\n");
        assert!(errors.is_empty());
        let w = file.workflow(0).unwrap();
        match &w.body[0] {
            Statement::ActivityCall(call) => assert_eq!(call.resolved, Some(1)),
            other => panic!("expected activity call, got {other:?}"),
        }
    }

    #[test]
    fn undefined_activity_reference() {
        let (file, errors) = resolve_source("workflow A():\n    activity Missing()\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "undefined activity: Missing");
        let w = file.workflow(0).unwrap();
        match &w.body[0] {
            Statement::ActivityCall(call) => assert_eq!(call.resolved, None),
            other => panic!("expected activity call, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_workflow_definition() {
        let (_, errors) = resolve_source("workflow A():\n    return\nworkflow A():\n    return\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "duplicate workflow definition: A");
    }

    #[test]
    fn signal_resolves_only_within_enclosing_workflow() {
        let src = "workflow A():\n    signal Deposit(amount: decimal):\n    await signal Deposit\nworkflow B():\n    await signal Deposit\n";
        let (file, errors) = resolve_source(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "undefined signal: Deposit");
        let a = file.workflow(0).unwrap();
        match &a.body[0] {
            Statement::Await(s) => match &s.target {
                AwaitTarget::Signal { resolved, .. } => assert_eq!(*resolved, Some(0)),
                other => panic!("expected signal target, got {other:?}"),
            },
            other => panic!("expected await, got {other:?}"),
        }
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let (mut file, errors) = resolve_source("workflow A():\n    activity B()\nactivity B():\n    return\n");
        assert!(errors.is_empty());
        let first = match &file.workflow(0).unwrap().body[0] {
            Statement::ActivityCall(call) => call.resolved,
            _ => unreachable!(),
        };
        let second_errors = resolve(&mut file);
        assert!(second_errors.is_empty());
        let second = match &file.workflow(0).unwrap().body[0] {
            Statement::ActivityCall(call) => call.resolved,
            _ => unreachable!(),
        };
        assert_eq!(first, second);
    }

    #[test]
    fn nested_await_all_and_if_are_resolved() {
        let src = "workflow A():\n    if (x):\n        await all:\n            activity Missing()\n";
        let (_, errors) = resolve_source(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "undefined activity: Missing");
    }
}

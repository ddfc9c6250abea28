//! The TWF syntax tree.
//!
//! `File` owns every `Definition` directly — there is no separate lossless
//! concrete syntax tree underneath. Parameters, arguments, conditions, and
//! other source fragments that the language toolchain does not need to
//! understand structurally are kept as opaque strings (see §9 of the
//! design notes). Call sites carry a `resolved` field set by the resolver:
//! an index into the owning `File`'s `definitions` vector, i.e. the "arena
//! index" flavor of resolution pointer — never an owning reference, so a
//! cycle of workflows calling each other never becomes an ownership cycle.

use twf_common::Position;

/// Index into `File::definitions`. `None` means "not yet resolved" or
/// "resolution failed"; resolving never produces both a pointer and an
/// error for the same reference.
pub type DefId = usize;

/// Index into a workflow's own `signals`/`updates` vector. Signal and
/// update references only ever resolve within their enclosing workflow.
pub type LocalDeclId = usize;

#[derive(Debug, Clone, Default)]
pub struct File {
    pub definitions: Vec<Definition>,
}

impl File {
    pub fn workflow(&self, id: DefId) -> Option<&WorkflowDef> {
        match self.definitions.get(id) {
            Some(Definition::Workflow(w)) => Some(w),
            _ => None,
        }
    }

    pub fn activity(&self, id: DefId) -> Option<&ActivityDef> {
        match self.definitions.get(id) {
            Some(Definition::Activity(a)) => Some(a),
            _ => None,
        }
    }

    pub fn workflows(&self) -> impl Iterator<Item = (DefId, &WorkflowDef)> {
        self.definitions.iter().enumerate().filter_map(|(id, d)| match d {
            Definition::Workflow(w) => Some((id, w)),
            Definition::Activity(_) => None,
        })
    }

    pub fn activities(&self) -> impl Iterator<Item = (DefId, &ActivityDef)> {
        self.definitions.iter().enumerate().filter_map(|(id, d)| match d {
            Definition::Activity(a) => Some((id, a)),
            Definition::Workflow(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Definition {
    Workflow(WorkflowDef),
    Activity(ActivityDef),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Workflow(w) => &w.name,
            Definition::Activity(a) => &a.name,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Definition::Workflow(w) => w.position,
            Definition::Activity(a) => a.position,
        }
    }

    pub fn name_position(&self) -> Position {
        match self {
            Definition::Workflow(w) => w.name_position,
            Definition::Activity(a) => a.name_position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowDef {
    pub name: String,
    /// Position of the leading `workflow` keyword.
    pub position: Position,
    /// Position of just the name identifier (used for rename/reference spans).
    pub name_position: Position,
    pub params: String,
    pub return_type: Option<String>,
    pub options: Option<String>,
    pub signals: Vec<SignalDecl>,
    pub queries: Vec<QueryDecl>,
    pub updates: Vec<UpdateDecl>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct ActivityDef {
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub params: String,
    pub return_type: Option<String>,
    pub options: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct SignalDecl {
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub params: String,
    pub body: Option<Vec<Statement>>,
}

#[derive(Debug, Clone)]
pub struct QueryDecl {
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub params: String,
    pub return_type: Option<String>,
    pub body: Option<Vec<Statement>>,
}

#[derive(Debug, Clone)]
pub struct UpdateDecl {
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub params: String,
    pub return_type: Option<String>,
    pub body: Option<Vec<Statement>>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    ActivityCall(ActivityCall),
    WorkflowCall(WorkflowCall),
    Await(AwaitStmt),
    AwaitAll(AwaitAllBlock),
    AwaitOne(AwaitOneBlock),
    Switch(SwitchBlock),
    If(IfStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Close(CloseStmt),
    ContinueAsNew(ContinueAsNewStmt),
    Break(Position),
    Continue(Position),
    Raw(RawStmt),
    Comment(CommentNode),
}

impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Statement::ActivityCall(c) => c.position,
            Statement::WorkflowCall(c) => c.position,
            Statement::Await(s) => s.position,
            Statement::AwaitAll(s) => s.position,
            Statement::AwaitOne(s) => s.position,
            Statement::Switch(s) => s.position,
            Statement::If(s) => s.position,
            Statement::For(s) => s.position,
            Statement::Return(s) => s.position,
            Statement::Close(s) => s.position,
            Statement::ContinueAsNew(s) => s.position,
            Statement::Break(p) | Statement::Continue(p) => *p,
            Statement::Raw(s) => s.position,
            Statement::Comment(s) => s.position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Child,
    Spawn,
    Detach,
}

impl CallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CallMode::Child => "child",
            CallMode::Spawn => "spawn",
            CallMode::Detach => "detach",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityCall {
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub args: String,
    pub result: Option<String>,
    pub options: Option<String>,
    pub resolved: Option<DefId>,
}

#[derive(Debug, Clone)]
pub struct WorkflowCall {
    pub mode: CallMode,
    pub namespace: Option<String>,
    pub name: String,
    pub position: Position,
    pub name_position: Position,
    pub args: String,
    pub result: Option<String>,
    pub resolved: Option<DefId>,
}

/// The single target an `await` statement (or an `await one` case) can
/// name. Each resolvable kind carries its own resolution pointer: a global
/// `DefId` for activity/workflow, a workflow-local `LocalDeclId` for
/// signal/update, and no pointer at all for a timer.
#[derive(Debug, Clone)]
pub enum AwaitTarget {
    Timer {
        duration: String,
        position: Position,
    },
    Signal {
        name: String,
        position: Position,
        name_position: Position,
        binding: Option<String>,
        resolved: Option<LocalDeclId>,
    },
    Update {
        name: String,
        position: Position,
        name_position: Position,
        binding: Option<String>,
        resolved: Option<LocalDeclId>,
    },
    Activity(ActivityCall),
    Workflow(WorkflowCall),
}

impl AwaitTarget {
    pub fn kind_str(&self) -> &'static str {
        match self {
            AwaitTarget::Timer { .. } => "timer",
            AwaitTarget::Signal { .. } => "signal",
            AwaitTarget::Update { .. } => "update",
            AwaitTarget::Activity(_) => "activity",
            AwaitTarget::Workflow(_) => "workflow",
        }
    }

    pub fn position(&self) -> Position {
        match self {
            AwaitTarget::Timer { position, .. } => *position,
            AwaitTarget::Signal { position, .. } => *position,
            AwaitTarget::Update { position, .. } => *position,
            AwaitTarget::Activity(c) => c.position,
            AwaitTarget::Workflow(c) => c.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AwaitStmt {
    pub target: AwaitTarget,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct AwaitAllBlock {
    pub body: Vec<Statement>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct AwaitOneBlock {
    pub cases: Vec<AwaitOneCase>,
    pub position: Position,
}

/// A case inside `await one`. The `nested_all` form exists because §3 of
/// the design notes enumerates it as a case kind even though the surface
/// grammar in §6.1 does not spell it out; see DESIGN.md for the decision.
#[derive(Debug, Clone)]
pub enum AwaitOneCase {
    Target {
        target: AwaitTarget,
        body: Vec<Statement>,
        position: Position,
    },
    NestedAwaitAll {
        body: Vec<Statement>,
        position: Position,
    },
}

impl AwaitOneCase {
    pub fn position(&self) -> Position {
        match self {
            AwaitOneCase::Target { position, .. } => *position,
            AwaitOneCase::NestedAwaitAll { position, .. } => *position,
        }
    }

    pub fn body(&self) -> &[Statement] {
        match self {
            AwaitOneCase::Target { body, .. } => body,
            AwaitOneCase::NestedAwaitAll { body, .. } => body,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            AwaitOneCase::Target { target, .. } => target.kind_str(),
            AwaitOneCase::NestedAwaitAll { .. } => "awaitAll",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub value: String,
    pub body: Vec<Statement>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct SwitchBlock {
    pub discriminant: String,
    pub cases: Vec<SwitchCase>,
    pub default: Option<Vec<Statement>>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: String,
    pub body: Vec<Statement>,
    pub else_body: Option<Vec<Statement>>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub enum ForVariant {
    Infinite,
    Conditional { condition: String },
    Iteration { variable: String, iterable: String },
}

impl ForVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForVariant::Infinite => "infinite",
            ForVariant::Conditional { .. } => "conditional",
            ForVariant::Iteration { .. } => "iteration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub variant: ForVariant,
    pub body: Vec<Statement>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Completed,
    Failed,
    Default,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::Completed => "completed",
            CloseReason::Failed => "failed",
            CloseReason::Default => "default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloseStmt {
    pub reason: CloseReason,
    pub value: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct ContinueAsNewStmt {
    pub args: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct RawStmt {
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct CommentNode {
    pub text: String,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(name: &str) -> WorkflowDef {
        WorkflowDef {
            name: name.to_string(),
            position: Position::new(1, 1),
            name_position: Position::new(1, 10),
            params: String::new(),
            return_type: None,
            options: None,
            signals: vec![],
            queries: vec![],
            updates: vec![],
            body: vec![],
        }
    }

    #[test]
    fn file_looks_up_definitions_by_id() {
        let file = File {
            definitions: vec![
                Definition::Workflow(workflow("A")),
                Definition::Activity(ActivityDef {
                    name: "B".to_string(),
                    position: Position::new(2, 1),
                    name_position: Position::new(2, 10),
                    params: String::new(),
                    return_type: None,
                    options: None,
                    body: vec![],
                }),
            ],
        };
        assert_eq!(file.workflow(0).unwrap().name, "A");
        assert_eq!(file.activity(1).unwrap().name, "B");
        assert!(file.workflow(1).is_none());
        assert!(file.activity(0).is_none());
    }

    #[test]
    fn workflows_and_activities_iterators_filter_by_kind() {
        let file = File {
            definitions: vec![
                Definition::Workflow(workflow("A")),
                Definition::Activity(ActivityDef {
                    name: "B".to_string(),
                    position: Position::new(2, 1),
                    name_position: Position::new(2, 10),
                    params: String::new(),
                    return_type: None,
                    options: None,
                    body: vec![],
                }),
            ],
        };
        assert_eq!(file.workflows().count(), 1);
        assert_eq!(file.activities().count(), 1);
    }
}

//! Stable JSON projection of a `File` (§4.4, §6.2).
//!
//! Every node object carries a `"type"` discriminator plus `"line"`/
//! `"column"`; optional fields are omitted rather than emitted as `null`.
//! Resolution pointers are never emitted -- downstream consumers (the CLI's
//! `parse` command, the visualizer) re-resolve by name if they need to.

use serde_json::{json, Map, Value};

use twf_parser::ast::*;

pub fn file_to_json(file: &File) -> Value {
    json!({
        "definitions": file.definitions.iter().map(definition_to_json).collect::<Vec<_>>(),
    })
}

fn definition_to_json(def: &Definition) -> Value {
    match def {
        Definition::Workflow(w) => workflow_to_json(w),
        Definition::Activity(a) => activity_to_json(a),
    }
}

fn workflow_to_json(w: &WorkflowDef) -> Value {
    let mut obj = header_fields("workflowDef", w.position, &w.name, &w.params, &w.return_type, &w.options);
    if !w.signals.is_empty() {
        obj.insert(
            "signals".into(),
            Value::Array(w.signals.iter().map(signal_decl_to_json).collect()),
        );
    }
    if !w.queries.is_empty() {
        obj.insert(
            "queries".into(),
            Value::Array(w.queries.iter().map(query_decl_to_json).collect()),
        );
    }
    if !w.updates.is_empty() {
        obj.insert(
            "updates".into(),
            Value::Array(w.updates.iter().map(update_decl_to_json).collect()),
        );
    }
    obj.insert("body".into(), statements_to_json(&w.body));
    Value::Object(obj)
}

fn activity_to_json(a: &ActivityDef) -> Value {
    let mut obj = header_fields("activityDef", a.position, &a.name, &a.params, &a.return_type, &a.options);
    obj.insert("body".into(), statements_to_json(&a.body));
    Value::Object(obj)
}

fn header_fields(
    ty: &str,
    position: twf_common::Position,
    name: &str,
    params: &str,
    return_type: &Option<String>,
    options: &Option<String>,
) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("type".into(), json!(ty));
    obj.insert("line".into(), json!(position.line));
    obj.insert("column".into(), json!(position.column));
    obj.insert("name".into(), json!(name));
    obj.insert("params".into(), json!(params));
    insert_opt_string(&mut obj, "returnType", return_type);
    insert_opt_string(&mut obj, "options", options);
    obj
}

fn signal_decl_to_json(s: &SignalDecl) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("signalDecl"));
    obj.insert("line".into(), json!(s.position.line));
    obj.insert("column".into(), json!(s.position.column));
    obj.insert("name".into(), json!(s.name));
    obj.insert("params".into(), json!(s.params));
    if let Some(body) = &s.body {
        obj.insert("body".into(), statements_to_json(body));
    }
    Value::Object(obj)
}

fn query_decl_to_json(q: &QueryDecl) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("queryDecl"));
    obj.insert("line".into(), json!(q.position.line));
    obj.insert("column".into(), json!(q.position.column));
    obj.insert("name".into(), json!(q.name));
    obj.insert("params".into(), json!(q.params));
    insert_opt_string(&mut obj, "returnType", &q.return_type);
    if let Some(body) = &q.body {
        obj.insert("body".into(), statements_to_json(body));
    }
    Value::Object(obj)
}

fn update_decl_to_json(u: &UpdateDecl) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("updateDecl"));
    obj.insert("line".into(), json!(u.position.line));
    obj.insert("column".into(), json!(u.position.column));
    obj.insert("name".into(), json!(u.name));
    obj.insert("params".into(), json!(u.params));
    insert_opt_string(&mut obj, "returnType", &u.return_type);
    if let Some(body) = &u.body {
        obj.insert("body".into(), statements_to_json(body));
    }
    Value::Object(obj)
}

fn statements_to_json(stmts: &[Statement]) -> Value {
    Value::Array(stmts.iter().map(statement_to_json).collect())
}

fn statement_to_json(stmt: &Statement) -> Value {
    match stmt {
        Statement::ActivityCall(c) => activity_call_to_json(c),
        Statement::WorkflowCall(c) => workflow_call_to_json(c),
        Statement::Await(s) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("await"));
            obj.insert("line".into(), json!(s.position.line));
            obj.insert("column".into(), json!(s.position.column));
            insert_await_target(&mut obj, &s.target);
            Value::Object(obj)
        }
        Statement::AwaitAll(b) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("awaitAll"));
            obj.insert("line".into(), json!(b.position.line));
            obj.insert("column".into(), json!(b.position.column));
            obj.insert("body".into(), statements_to_json(&b.body));
            Value::Object(obj)
        }
        Statement::AwaitOne(b) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("awaitOne"));
            obj.insert("line".into(), json!(b.position.line));
            obj.insert("column".into(), json!(b.position.column));
            obj.insert(
                "cases".into(),
                Value::Array(b.cases.iter().map(await_one_case_to_json).collect()),
            );
            Value::Object(obj)
        }
        Statement::Switch(b) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("switch"));
            obj.insert("line".into(), json!(b.position.line));
            obj.insert("column".into(), json!(b.position.column));
            obj.insert("expr".into(), json!(b.discriminant));
            obj.insert(
                "cases".into(),
                Value::Array(
                    b.cases
                        .iter()
                        .map(|c| {
                            json!({
                                "type": "switchCase",
                                "line": c.position.line,
                                "column": c.position.column,
                                "value": c.value,
                                "body": statements_to_json(&c.body),
                            })
                        })
                        .collect(),
                ),
            );
            if let Some(default) = &b.default {
                obj.insert("default".into(), statements_to_json(default));
            }
            Value::Object(obj)
        }
        Statement::If(s) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("if"));
            obj.insert("line".into(), json!(s.position.line));
            obj.insert("column".into(), json!(s.position.column));
            obj.insert("condition".into(), json!(s.condition));
            obj.insert("body".into(), statements_to_json(&s.body));
            if let Some(else_body) = &s.else_body {
                obj.insert("elseBody".into(), statements_to_json(else_body));
            }
            Value::Object(obj)
        }
        Statement::For(s) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("for"));
            obj.insert("line".into(), json!(s.position.line));
            obj.insert("column".into(), json!(s.position.column));
            obj.insert("variant".into(), json!(s.variant.as_str()));
            match &s.variant {
                ForVariant::Infinite => {}
                ForVariant::Conditional { condition } => {
                    obj.insert("condition".into(), json!(condition));
                }
                ForVariant::Iteration { variable, iterable } => {
                    obj.insert("variable".into(), json!(variable));
                    obj.insert("iterable".into(), json!(iterable));
                }
            }
            obj.insert("body".into(), statements_to_json(&s.body));
            Value::Object(obj)
        }
        Statement::Return(s) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("return"));
            obj.insert("line".into(), json!(s.position.line));
            obj.insert("column".into(), json!(s.position.column));
            insert_opt_string(&mut obj, "value", &s.value);
            Value::Object(obj)
        }
        Statement::Close(s) => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("close"));
            obj.insert("line".into(), json!(s.position.line));
            obj.insert("column".into(), json!(s.position.column));
            obj.insert("reason".into(), json!(s.reason.as_str()));
            insert_opt_string(&mut obj, "value", &s.value);
            Value::Object(obj)
        }
        Statement::ContinueAsNew(s) => json!({
            "type": "continueAsNew",
            "line": s.position.line,
            "column": s.position.column,
            "args": s.args,
        }),
        Statement::Break(p) => json!({"type": "break", "line": p.line, "column": p.column}),
        Statement::Continue(p) => json!({"type": "continue", "line": p.line, "column": p.column}),
        Statement::Raw(s) => json!({
            "type": "raw",
            "line": s.position.line,
            "column": s.position.column,
            "text": s.text,
        }),
        Statement::Comment(s) => json!({
            "type": "comment",
            "line": s.position.line,
            "column": s.position.column,
            "text": s.text,
        }),
    }
}

fn activity_call_to_json(c: &ActivityCall) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("activityCall"));
    obj.insert("line".into(), json!(c.position.line));
    obj.insert("column".into(), json!(c.position.column));
    obj.insert("name".into(), json!(c.name));
    obj.insert("args".into(), json!(c.args));
    insert_opt_string(&mut obj, "result", &c.result);
    insert_opt_string(&mut obj, "options", &c.options);
    Value::Object(obj)
}

fn workflow_call_to_json(c: &WorkflowCall) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!("workflowCall"));
    obj.insert("line".into(), json!(c.position.line));
    obj.insert("column".into(), json!(c.position.column));
    obj.insert("mode".into(), json!(c.mode.as_str()));
    insert_opt_string(&mut obj, "namespace", &c.namespace);
    obj.insert("name".into(), json!(c.name));
    obj.insert("args".into(), json!(c.args));
    insert_opt_string(&mut obj, "result", &c.result);
    Value::Object(obj)
}

/// Shared by the `await` statement and each `await one` case: inserts the
/// kind-tagged target fields (`kind` plus whichever of `timer`/`signal`/
/// `update`/`activity`/`workflow` applies).
fn insert_await_target(obj: &mut Map<String, Value>, target: &AwaitTarget) {
    obj.insert("kind".into(), json!(target.kind_str()));
    match target {
        AwaitTarget::Timer { duration, .. } => {
            obj.insert("timer".into(), json!(duration));
        }
        AwaitTarget::Signal { name, binding, .. } => {
            obj.insert("signal".into(), json!(name));
            insert_opt_string(obj, "signalParams", binding);
        }
        AwaitTarget::Update { name, binding, .. } => {
            obj.insert("update".into(), json!(name));
            insert_opt_string(obj, "updateParams", binding);
        }
        AwaitTarget::Activity(c) => {
            obj.insert("activity".into(), json!(c.name));
            obj.insert("activityArgs".into(), json!(c.args));
            insert_opt_string(obj, "activityResult", &c.result);
        }
        AwaitTarget::Workflow(c) => {
            obj.insert("workflow".into(), json!(c.name));
            obj.insert("workflowArgs".into(), json!(c.args));
            insert_opt_string(obj, "workflowResult", &c.result);
            obj.insert("mode".into(), json!(c.mode.as_str()));
            insert_opt_string(obj, "namespace", &c.namespace);
        }
    }
}

fn await_one_case_to_json(case: &AwaitOneCase) -> Value {
    let mut obj = Map::new();
    obj.insert("line".into(), json!(case.position().line));
    obj.insert("column".into(), json!(case.position().column));
    match case {
        AwaitOneCase::Target { target, body, .. } => {
            insert_await_target(&mut obj, target);
            obj.insert("body".into(), statements_to_json(body));
        }
        AwaitOneCase::NestedAwaitAll { body, .. } => {
            obj.insert("kind".into(), json!("awaitAll"));
            obj.insert("body".into(), statements_to_json(body));
        }
    }
    Value::Object(obj)
}

fn insert_opt_string(obj: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            obj.insert(key.into(), json!(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twf_parser::parser::parse_tolerant;

    #[test]
    fn minimal_workflow_projects_expected_shape() {
        let (file, errors) = parse_tolerant("workflow Foo(x: int) -> (Result):\n    return x\n");
        assert!(errors.is_empty());
        let value = file_to_json(&file);
        let serialized = serde_json::to_string(&value).unwrap();
        let reparsed: Value = serde_json::from_str(&serialized).unwrap();
        let def = &reparsed["definitions"][0];
        assert_eq!(def["type"], "workflowDef");
        assert_eq!(def["name"], "Foo");
        assert_eq!(def["params"], "x: int");
        assert_eq!(def["returnType"], "Result");
        assert_eq!(def["body"][0]["type"], "return");
        assert_eq!(def["body"][0]["value"], "x");
    }

    #[test]
    fn omits_empty_optional_fields() {
        let (file, _) = parse_tolerant("activity A():\n    return\n");
        let value = file_to_json(&file);
        let def = &value["definitions"][0];
        assert!(def.get("returnType").is_none());
        assert!(def.get("options").is_none());
    }

    #[test]
    fn await_one_case_projects_kind_and_body() {
        let src = "workflow W():\n    signal Deposit(amount: decimal):\n    await one:\n        signal Deposit:\n        timer(1h):\n            activity Beep()\n";
        let (file, errors) = parse_tolerant(src);
        assert!(errors.is_empty(), "{errors:?}");
        let value = file_to_json(&file);
        let cases = &value["definitions"][0]["body"][0]["cases"];
        assert_eq!(cases[0]["kind"], "signal");
        assert_eq!(cases[0]["signal"], "Deposit");
        assert_eq!(cases[0]["body"].as_array().unwrap().len(), 0);
        assert_eq!(cases[1]["kind"], "timer");
        assert_eq!(cases[1]["timer"], "1h");
        assert_eq!(cases[1]["body"][0]["type"], "activityCall");
    }
}

//! Signature label formatting shared by hover, signature help, and inlay
//! hints: `"keyword Name(params) -> (ret)"` plus the byte offsets of each
//! comma-split parameter substring within that label.

use twf_parser::ast::*;

pub struct Signature {
    pub label: String,
    /// Byte offset ranges of each parameter substring within `label`.
    pub param_ranges: Vec<(usize, usize)>,
}

pub fn signature_for_definition(def: &Definition) -> Signature {
    match def {
        Definition::Workflow(w) => build("workflow", &w.name, &w.params, w.return_type.as_deref()),
        Definition::Activity(a) => build("activity", &a.name, &a.params, a.return_type.as_deref()),
    }
}

pub fn signature_for_signal(s: &SignalDecl) -> Signature {
    build("signal", &s.name, &s.params, None)
}

pub fn signature_for_query(q: &QueryDecl) -> Signature {
    build("query", &q.name, &q.params, q.return_type.as_deref())
}

pub fn signature_for_update(u: &UpdateDecl) -> Signature {
    build("update", &u.name, &u.params, u.return_type.as_deref())
}

fn build(keyword: &str, name: &str, params: &str, return_type: Option<&str>) -> Signature {
    let prefix = format!("{keyword} {name}(");
    let mut label = prefix.clone();
    label.push_str(params);
    label.push(')');
    if let Some(ret) = return_type {
        label.push_str(" -> (");
        label.push_str(ret);
        label.push(')');
    }

    let params_start = prefix.len();
    let mut param_ranges = Vec::new();
    if !params.trim().is_empty() {
        let mut offset = params_start;
        for part in params.split(',') {
            let start = offset;
            let end = start + part.len();
            let trimmed_start = start + (part.len() - part.trim_start().len());
            let trimmed_end = end - (part.len() - part.trim_end().len());
            param_ranges.push((trimmed_start, trimmed_end));
            offset = end + 1; // +1 for the comma consumed by split
        }
    }

    Signature { label, param_ranges }
}

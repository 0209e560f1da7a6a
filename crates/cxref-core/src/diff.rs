//! Snapshot-boundary diffs.
//!
//! Compares two frozen snapshots by USR-keyed set difference. Local ids are
//! not portable between snapshots, so every id is translated back to its USR
//! before records are compared. This module only computes differences; it
//! never merges.

use crate::entity::{IndexedFunc, IndexedType, IndexedVar};
use crate::ids::FuncRef;
use crate::location::Location;
use crate::snapshot::IndexedFile;
use serde::Serialize;
use std::fmt::Write as _;

/// USRs added, removed, or structurally changed between two snapshots of the
/// same translation unit. All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexedFileDiff {
    pub added_types: Vec<String>,
    pub removed_types: Vec<String>,
    pub changed_types: Vec<String>,

    pub added_funcs: Vec<String>,
    pub removed_funcs: Vec<String>,
    pub changed_funcs: Vec<String>,

    pub added_vars: Vec<String>,
    pub removed_vars: Vec<String>,
    pub changed_vars: Vec<String>,
}

impl IndexedFileDiff {
    /// Compute the diff from `before` to `after`.
    pub fn between(before: &IndexedFile, after: &IndexedFile) -> Self {
        let mut diff = Self::default();
        diff_kind(
            before.types(),
            after.types(),
            |t| t.def.usr.as_str(),
            |file, t| type_fingerprint(file, t),
            before,
            after,
            &mut diff.added_types,
            &mut diff.removed_types,
            &mut diff.changed_types,
        );
        diff_kind(
            before.funcs(),
            after.funcs(),
            |f| f.def.usr.as_str(),
            |file, f| func_fingerprint(file, f),
            before,
            after,
            &mut diff.added_funcs,
            &mut diff.removed_funcs,
            &mut diff.changed_funcs,
        );
        diff_kind(
            before.vars(),
            after.vars(),
            |v| v.def.usr.as_str(),
            |file, v| var_fingerprint(file, v),
            before,
            after,
            &mut diff.added_vars,
            &mut diff.removed_vars,
            &mut diff.changed_vars,
        );
        diff
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn diff_kind<'a, T>(
    before_entities: &'a [T],
    after_entities: &'a [T],
    usr_of: impl Fn(&T) -> &str,
    fingerprint: impl Fn(&IndexedFile, &T) -> String,
    before: &IndexedFile,
    after: &IndexedFile,
    added: &mut Vec<String>,
    removed: &mut Vec<String>,
    changed: &mut Vec<String>,
) {
    for entity in after_entities {
        let usr = usr_of(entity);
        match before_entities.iter().find(|&e| usr_of(e) == usr) {
            None => added.push(usr.to_string()),
            Some(old) => {
                if fingerprint(before, old) != fingerprint(after, entity) {
                    changed.push(usr.to_string());
                }
            }
        }
    }
    for entity in before_entities {
        let usr = usr_of(entity);
        if !after_entities.iter().any(|e| usr_of(e) == usr) {
            removed.push(usr.to_string());
        }
    }
    added.sort();
    removed.sort();
    changed.sort();
}

// ── Fingerprints ────────────────────────────────────────────────────────
//
// An id-free textual rendering of one record. Edge lists are translated to
// sorted USR lists so insertion order and id assignment cannot leak into the
// comparison.

fn type_fingerprint(file: &IndexedFile, ty: &IndexedType) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{}|{}|{:?}|",
        ty.def.short_name,
        ty.def.qualified_name,
        ty.def.definition.map(|l| l.to_string())
    );
    let _ = write!(
        out,
        "alias={:?}|",
        ty.def.alias_of.map(|id| &file.resolve_type(id).def.usr)
    );
    push_usrs(&mut out, "parents", ty.def.parents.iter().map(|&id| file.resolve_type(id).def.usr.as_str()));
    push_usrs(&mut out, "types", ty.def.types.iter().map(|&id| file.resolve_type(id).def.usr.as_str()));
    push_usrs(&mut out, "funcs", ty.def.funcs.iter().map(|&id| file.resolve_func(id).def.usr.as_str()));
    push_usrs(&mut out, "vars", ty.def.vars.iter().map(|&id| file.resolve_var(id).def.usr.as_str()));
    push_usrs(&mut out, "derived", ty.derived.iter().map(|&id| file.resolve_type(id).def.usr.as_str()));
    push_locs(&mut out, &ty.uses);
    let _ = write!(out, "system={}", ty.is_system_def);
    out
}

fn func_fingerprint(file: &IndexedFile, func: &IndexedFunc) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{}|{}|{:?}|",
        func.def.short_name,
        func.def.qualified_name,
        func.def.definition.map(|l| l.to_string())
    );
    let _ = write!(
        out,
        "declaring={:?}|base={:?}|",
        func.def.declaring_type.map(|id| &file.resolve_type(id).def.usr),
        func.def.base.map(|id| &file.resolve_func(id).def.usr)
    );
    push_usrs(&mut out, "locals", func.def.locals.iter().map(|&id| file.resolve_var(id).def.usr.as_str()));
    push_func_refs(&mut out, "callees", file, &func.def.callees);
    push_locs(&mut out, &func.declarations);
    push_usrs(&mut out, "derived", func.derived.iter().map(|&id| file.resolve_func(id).def.usr.as_str()));
    push_func_refs(&mut out, "callers", file, &func.callers);
    push_locs(&mut out, &func.uses);
    let _ = write!(out, "system={}", func.is_system_def);
    out
}

fn var_fingerprint(file: &IndexedFile, var: &IndexedVar) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{}|{}|{:?}|{:?}|",
        var.def.short_name,
        var.def.qualified_name,
        var.def.declaration.map(|l| l.to_string()),
        var.def.definition.map(|l| l.to_string())
    );
    let _ = write!(
        out,
        "type={:?}|declaring={:?}|",
        var.def.variable_type.map(|id| &file.resolve_type(id).def.usr),
        var.def.declaring_type.map(|id| &file.resolve_type(id).def.usr)
    );
    push_locs(&mut out, &var.uses);
    let _ = write!(out, "system={}", var.is_system_def);
    out
}

fn push_usrs<'a>(out: &mut String, label: &str, usrs: impl Iterator<Item = &'a str>) {
    let mut list: Vec<&str> = usrs.collect();
    list.sort_unstable();
    let _ = write!(out, "{label}=[{}]|", list.join(","));
}

fn push_locs(out: &mut String, locs: &[Location]) {
    let mut sorted = locs.to_vec();
    sorted.sort_by_key(|l| l.sort_key());
    let list: Vec<String> = sorted.iter().map(|l| l.to_string()).collect();
    let _ = write!(out, "locs=[{}]|", list.join(","));
}

fn push_func_refs(out: &mut String, label: &str, file: &IndexedFile, refs: &[FuncRef]) {
    let mut list: Vec<String> = refs
        .iter()
        .map(|r| format!("{}@{}", file.resolve_func(r.id).def.usr, r.loc))
        .collect();
    list.sort_unstable();
    let _ = write!(out, "{label}=[{}]|", list.join(","));
}

//! The per-translation-unit snapshot.
//!
//! An [`IndexedFile`] owns three USR-keyed interning tables, three parallel
//! entity vectors addressed by dense id, and the file registry its packed
//! locations point into. It is built empty, mutated by exactly one driver
//! during one indexing pass, then frozen and handed to readers.

use crate::entity::{IndexedFunc, IndexedType, IndexedVar};
use crate::files::FileRegistry;
use crate::ids::{FuncId, FuncRef, LocalId, TypeId, VarId};
use crate::location::Location;
use crate::stats::IndexStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

/// A self-contained, relocatable snapshot of one translation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedFile {
    path: String,

    usr_to_type_id: HashMap<String, TypeId>,
    usr_to_func_id: HashMap<String, FuncId>,
    usr_to_var_id: HashMap<String, VarId>,

    types: Vec<IndexedType>,
    funcs: Vec<IndexedFunc>,
    vars: Vec<IndexedVar>,

    files: FileRegistry,
    stats: IndexStats,

    /// Set when the pass was cancelled before the walk finished. Incomplete
    /// snapshots must not be merged into downstream storage.
    incomplete: bool,
}

impl IndexedFile {
    /// Create an empty snapshot for the given translation unit. The input
    /// path is registered immediately, so it gets file id 1 even when the
    /// unit declares nothing.
    pub fn new(path: &str) -> Self {
        let mut files = FileRegistry::new();
        files.resolve_path(path);
        Self {
            path: path.to_string(),
            usr_to_type_id: HashMap::new(),
            usr_to_func_id: HashMap::new(),
            usr_to_var_id: HashMap::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            vars: Vec::new(),
            files,
            stats: IndexStats::default(),
            incomplete: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    // ── Interning ───────────────────────────────────────────────────────

    /// Intern a type USR, allocating a fresh record on first sight.
    ///
    /// The returned id is stable for the lifetime of the snapshot; a later
    /// definition event fills the same record in place.
    pub fn to_type_id(&mut self, usr: &str) -> TypeId {
        if let Some(&id) = self.usr_to_type_id.get(usr) {
            return id;
        }
        let id = LocalId::from_raw(self.types.len() as u32);
        self.usr_to_type_id.insert(usr.to_string(), id);
        self.types.push(IndexedType::new(id, usr));
        id
    }

    /// Intern a function USR. USR must be non-empty.
    pub fn to_func_id(&mut self, usr: &str) -> FuncId {
        debug_assert!(!usr.is_empty(), "function USRs must be non-empty");
        if let Some(&id) = self.usr_to_func_id.get(usr) {
            return id;
        }
        let id = LocalId::from_raw(self.funcs.len() as u32);
        self.usr_to_func_id.insert(usr.to_string(), id);
        self.funcs.push(IndexedFunc::new(id, usr));
        id
    }

    /// Intern a variable USR. USR must be non-empty.
    pub fn to_var_id(&mut self, usr: &str) -> VarId {
        debug_assert!(!usr.is_empty(), "variable USRs must be non-empty");
        if let Some(&id) = self.usr_to_var_id.get(usr) {
            return id;
        }
        let id = LocalId::from_raw(self.vars.len() as u32);
        self.usr_to_var_id.insert(usr.to_string(), id);
        self.vars.push(IndexedVar::new(id, usr));
        id
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// O(1) access by id. Panics on an id from a different snapshot.
    pub fn resolve_type(&self, id: TypeId) -> &IndexedType {
        &self.types[id.index()]
    }

    pub fn resolve_func(&self, id: FuncId) -> &IndexedFunc {
        &self.funcs[id.index()]
    }

    pub fn resolve_var(&self, id: VarId) -> &IndexedVar {
        &self.vars[id.index()]
    }

    pub fn resolve_type_mut(&mut self, id: TypeId) -> &mut IndexedType {
        &mut self.types[id.index()]
    }

    pub fn resolve_func_mut(&mut self, id: FuncId) -> &mut IndexedFunc {
        &mut self.funcs[id.index()]
    }

    pub fn resolve_var_mut(&mut self, id: VarId) -> &mut IndexedVar {
        &mut self.vars[id.index()]
    }

    // ── Lookup by USR ───────────────────────────────────────────────────

    pub fn type_by_usr(&self, usr: &str) -> Option<TypeId> {
        self.usr_to_type_id.get(usr).copied()
    }

    pub fn func_by_usr(&self, usr: &str) -> Option<FuncId> {
        self.usr_to_func_id.get(usr).copied()
    }

    pub fn var_by_usr(&self, usr: &str) -> Option<VarId> {
        self.usr_to_var_id.get(usr).copied()
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn types(&self) -> &[IndexedType] {
        &self.types
    }

    pub fn funcs(&self) -> &[IndexedFunc] {
        &self.funcs
    }

    pub fn vars(&self) -> &[IndexedVar] {
        &self.vars
    }

    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileRegistry {
        &mut self.files
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut IndexStats {
        &mut self.stats
    }

    pub fn incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn set_incomplete(&mut self) {
        self.incomplete = true;
    }

    // ── Canonical dump ──────────────────────────────────────────────────

    /// Deterministic textual dump, the contract tested by golden files.
    ///
    /// Entities appear in id order, fields in fixed order, location lists
    /// sorted by `(file_id, line, column)`. Unset optionals and empty lists
    /// are omitted. Bitwise stable across runs on identical input.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.dump(&mut out);
        out
    }

    fn dump(&self, out: &mut String) {
        let _ = writeln!(out, "file: {}", self.path);
        if self.incomplete {
            let _ = writeln!(out, "incomplete: true");
        }
        let _ = writeln!(out, "files:");
        for (i, path) in self.files.paths().iter().enumerate() {
            let _ = writeln!(out, "  {i} => {path}");
        }

        let _ = writeln!(out, "types: {}", self.types.len());
        for ty in &self.types {
            let _ = writeln!(out, "  type {}", ty.def.id);
            let _ = writeln!(out, "    usr: {}", ty.def.usr);
            dump_names(out, &ty.def.short_name, &ty.def.qualified_name);
            if let Some(loc) = ty.def.definition {
                let _ = writeln!(out, "    definition: {loc}");
            }
            if let Some(alias) = ty.def.alias_of {
                let _ = writeln!(out, "    alias_of: {alias}");
            }
            dump_ids(out, "parents", &ty.def.parents);
            dump_ids(out, "nested_types", &ty.def.types);
            dump_ids(out, "member_funcs", &ty.def.funcs);
            dump_ids(out, "member_vars", &ty.def.vars);
            dump_ids(out, "derived", &ty.derived);
            dump_locs(out, "uses", &ty.uses);
            if ty.is_system_def {
                let _ = writeln!(out, "    system: true");
            }
        }

        let _ = writeln!(out, "funcs: {}", self.funcs.len());
        for func in &self.funcs {
            let _ = writeln!(out, "  func {}", func.def.id);
            let _ = writeln!(out, "    usr: {}", func.def.usr);
            dump_names(out, &func.def.short_name, &func.def.qualified_name);
            if let Some(loc) = func.def.definition {
                let _ = writeln!(out, "    definition: {loc}");
            }
            if let Some(ty) = func.def.declaring_type {
                let _ = writeln!(out, "    declaring_type: {ty}");
            }
            if let Some(base) = func.def.base {
                let _ = writeln!(out, "    base: {base}");
            }
            dump_ids(out, "locals", &func.def.locals);
            dump_refs(out, "callees", &func.def.callees);
            dump_locs(out, "declarations", &func.declarations);
            dump_ids(out, "derived", &func.derived);
            dump_refs(out, "callers", &func.callers);
            dump_locs(out, "uses", &func.uses);
            if func.is_system_def {
                let _ = writeln!(out, "    system: true");
            }
        }

        let _ = writeln!(out, "vars: {}", self.vars.len());
        for var in &self.vars {
            let _ = writeln!(out, "  var {}", var.def.id);
            let _ = writeln!(out, "    usr: {}", var.def.usr);
            dump_names(out, &var.def.short_name, &var.def.qualified_name);
            if let Some(loc) = var.def.declaration {
                let _ = writeln!(out, "    declaration: {loc}");
            }
            if let Some(loc) = var.def.definition {
                let _ = writeln!(out, "    definition: {loc}");
            }
            if let Some(ty) = var.def.variable_type {
                let _ = writeln!(out, "    variable_type: {ty}");
            }
            if let Some(ty) = var.def.declaring_type {
                let _ = writeln!(out, "    declaring_type: {ty}");
            }
            dump_locs(out, "uses", &var.uses);
            if var.is_system_def {
                let _ = writeln!(out, "    system: true");
            }
        }

        if !self.stats.is_clean() {
            let _ = writeln!(
                out,
                "stats: clamped={} degenerate={} duplicate_defs={} unresolved={}",
                self.stats.locations_clamped,
                self.stats.degenerate_callbacks,
                self.stats.duplicate_definitions,
                self.stats.unresolved_refs
            );
        }
    }
}

impl fmt::Display for IndexedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn dump_names(out: &mut String, short: &str, qualified: &str) {
    if !short.is_empty() {
        let _ = writeln!(out, "    short_name: {short}");
    }
    if !qualified.is_empty() {
        let _ = writeln!(out, "    qualified_name: {qualified}");
    }
}

fn dump_ids<K>(out: &mut String, label: &str, ids: &[LocalId<K>]) {
    if ids.is_empty() {
        return;
    }
    let list: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    let _ = writeln!(out, "    {label}: [{}]", list.join(", "));
}

fn dump_locs(out: &mut String, label: &str, locs: &[Location]) {
    if locs.is_empty() {
        return;
    }
    let mut sorted = locs.to_vec();
    sorted.sort_by_key(|l| l.sort_key());
    let list: Vec<String> = sorted.iter().map(|l| l.to_string()).collect();
    let _ = writeln!(out, "    {label}: [{}]", list.join(", "));
}

fn dump_refs(out: &mut String, label: &str, refs: &[FuncRef]) {
    if refs.is_empty() {
        return;
    }
    let mut sorted = refs.to_vec();
    sorted.sort_by_key(|r| (r.loc.sort_key(), r.id.raw()));
    let list: Vec<String> = sorted.iter().map(|r| format!("{}@{}", r.id, r.loc)).collect();
    let _ = writeln!(out, "    {label}: [{}]", list.join(", "));
}

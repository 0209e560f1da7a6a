//! The indexer driver: turns the frontend's event stream into a snapshot.
//!
//! One driver mutates one [`IndexedFile`] on one thread. Every event is
//! fully applied before control returns to the walker, so no event ever
//! observes a half-updated record. Anomalies (empty USRs, duplicate
//! definitions, overflowing locations) are counted and tolerated; nothing
//! here aborts a pass.

use cxref_core::{
    CancelToken, FuncId, IndexConfig, IndexedFile, LocalId, Location, Ref, TypeId, VarId,
};
use cxref_frontend::{
    Cursor, DeclEvent, EntityKind, IndexCallbacks, RefEvent, RefRole, SpellingLoc,
};

/// Consumes declaration and reference events for one translation unit.
pub struct IndexDriver {
    file: IndexedFile,
    config: IndexConfig,
    cancel: CancelToken,
}

impl IndexDriver {
    pub fn new(path: &str) -> Self {
        Self {
            file: IndexedFile::new(path),
            config: IndexConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Freeze and hand over the snapshot. A cancelled pass is flagged
    /// incomplete so downstream storage refuses it.
    pub fn finish(mut self) -> IndexedFile {
        if self.cancel.is_cancelled() {
            self.file.set_incomplete();
        }
        self.file
    }

    // ── Location resolution ─────────────────────────────────────────────

    /// Pack a raw spelling against the local file registry, counting any
    /// bit-width clamp.
    fn resolve_loc(&mut self, file: &str, line: u32, column: u32, interesting: bool) -> Location {
        let file_id = self.file.files_mut().resolve_path(file);
        if Location::would_clamp(file_id, line, column) {
            self.file.stats_mut().locations_clamped += 1;
        }
        Location::new(interesting, file_id, line, column)
    }

    fn cursor_loc(&mut self, cursor: &Cursor, interesting: bool) -> Location {
        let (file, line, column) = cursor.location();
        let file = file.to_string();
        self.resolve_loc(&file, line, column, interesting)
    }

    fn spelling_loc(&mut self, loc: &SpellingLoc, interesting: bool) -> Location {
        let file = loc.file.clone();
        self.resolve_loc(&file, loc.line, loc.column, interesting)
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn handle_type_decl(&mut self, decl: &DeclEvent) {
        let id = self.file.to_type_id(decl.cursor.usr());
        let loc = self.cursor_loc(&decl.cursor, false);

        let ty = self.file.resolve_type_mut(id);
        if ty.def.short_name.is_empty() {
            ty.def.short_name = decl.cursor.short_name().to_string();
        }
        if ty.def.qualified_name.is_empty() {
            ty.def.qualified_name = decl.cursor.qualified_name().to_string();
        }
        ty.is_system_def |= decl.is_system;

        if decl.is_definition {
            self.set_type_definition(id, loc);
        }

        if let Some(underlying) = &decl.underlying {
            if !underlying.usr().is_empty() {
                let target = self.file.to_type_id(underlying.usr());
                self.file.resolve_type_mut(target).add_usage(loc, true);
                let ty = self.file.resolve_type_mut(id);
                if ty.def.alias_of.is_none() {
                    ty.def.alias_of = Some(target);
                }
            }
        }

        if let Some(parent) = self.container_type_id(decl) {
            push_unique(&mut self.file.resolve_type_mut(parent).def.types, id);
        }
    }

    fn handle_func_decl(&mut self, decl: &DeclEvent) {
        let id = self.file.to_func_id(decl.cursor.usr());
        let loc = self.cursor_loc(&decl.cursor, false);

        let func = self.file.resolve_func_mut(id);
        if func.def.short_name.is_empty() {
            func.def.short_name = decl.cursor.short_name().to_string();
        }
        if func.def.qualified_name.is_empty() {
            func.def.qualified_name = decl.cursor.qualified_name().to_string();
        }
        func.is_system_def |= decl.is_system;

        if let Some(declaring) = self.container_type_id(decl) {
            let func = self.file.resolve_func_mut(id);
            if func.def.declaring_type.is_none() {
                func.def.declaring_type = Some(declaring);
            }
            push_unique(&mut self.file.resolve_type_mut(declaring).def.funcs, id);
        }

        if decl.is_definition {
            self.set_func_definition(id, loc);
        } else {
            let func = self.file.resolve_func_mut(id);
            if !func.declarations.iter().any(|l| l.same_position(loc)) {
                func.declarations.push(loc);
            }
        }
    }

    fn handle_var_decl(&mut self, decl: &DeclEvent) {
        let id = self.file.to_var_id(decl.cursor.usr());
        let loc = self.cursor_loc(&decl.cursor, false);

        let var = self.file.resolve_var_mut(id);
        if var.def.short_name.is_empty() {
            var.def.short_name = decl.cursor.short_name().to_string();
        }
        if var.def.qualified_name.is_empty() {
            var.def.qualified_name = decl.cursor.qualified_name().to_string();
        }
        var.is_system_def |= decl.is_system;
        if var.def.declaration.is_none() {
            var.def.declaration = Some(loc);
        }

        if let Some(declaring) = self.container_type_id(decl) {
            let var = self.file.resolve_var_mut(id);
            if var.def.declaring_type.is_none() {
                var.def.declaring_type = Some(declaring);
            }
            push_unique(&mut self.file.resolve_type_mut(declaring).def.vars, id);
        }
        if let Some(container) = &decl.container {
            if container.entity_kind() == EntityKind::Func && !container.usr().is_empty() {
                let owner = self.file.to_func_id(container.usr());
                push_unique(&mut self.file.resolve_func_mut(owner).def.locals, id);
            }
        }

        if decl.is_definition {
            self.set_var_definition(id, loc);
        }
    }

    /// The declaring type id from a decl's container, when it is a type.
    fn container_type_id(&mut self, decl: &DeclEvent) -> Option<TypeId> {
        let container = decl.container.as_ref()?;
        if container.entity_kind() != EntityKind::Type || container.usr().is_empty() {
            return None;
        }
        Some(self.file.to_type_id(container.usr()))
    }

    // ── Definition uniqueness ───────────────────────────────────────────

    fn set_type_definition(&mut self, id: TypeId, loc: Location) {
        match self.file.resolve_type(id).def.definition {
            None => self.file.resolve_type_mut(id).def.definition = Some(loc),
            Some(first) if first.same_position(loc) => {}
            Some(first) => {
                let usr = self.file.resolve_type(id).def.usr.clone();
                self.report_duplicate_definition(&usr, first, loc);
            }
        }
    }

    fn set_func_definition(&mut self, id: FuncId, loc: Location) {
        match self.file.resolve_func(id).def.definition {
            None => self.file.resolve_func_mut(id).def.definition = Some(loc),
            Some(first) if first.same_position(loc) => {}
            Some(first) => {
                let usr = self.file.resolve_func(id).def.usr.clone();
                self.report_duplicate_definition(&usr, first, loc);
            }
        }
    }

    fn set_var_definition(&mut self, id: VarId, loc: Location) {
        match self.file.resolve_var(id).def.definition {
            None => self.file.resolve_var_mut(id).def.definition = Some(loc),
            Some(first) if first.same_position(loc) => {}
            Some(first) => {
                let usr = self.file.resolve_var(id).def.usr.clone();
                self.report_duplicate_definition(&usr, first, loc);
            }
        }
    }

    /// The first definition wins; later ones at a different position are a
    /// warning, never a crash.
    fn report_duplicate_definition(&mut self, usr: &str, first: Location, second: Location) {
        self.file.stats_mut().duplicate_definitions += 1;
        tracing::warn!(%usr, %first, %second, "duplicate definition ignored");
    }

    // ── References ──────────────────────────────────────────────────────

    fn handle_call(&mut self, r: &RefEvent) {
        let callee = self.file.to_func_id(r.referent.usr());
        let loc = self.spelling_loc(&r.loc, true);
        self.file.resolve_func_mut(callee).add_usage(loc, true);

        // A call without an enclosing function (a global initializer)
        // keeps the usage but contributes no call edge: there is no
        // function entity to attribute it to.
        if let Some(container) = &r.container {
            if container.entity_kind() == EntityKind::Func && !container.usr().is_empty() {
                let caller = self.file.to_func_id(container.usr());
                push_unique_ref(
                    &mut self.file.resolve_func_mut(caller).def.callees,
                    Ref::new(callee, loc),
                );
                push_unique_ref(
                    &mut self.file.resolve_func_mut(callee).callers,
                    Ref::new(caller, loc),
                );
            }
        }
    }

    fn handle_base_class(&mut self, r: &RefEvent) {
        let base = self.file.to_type_id(r.referent.usr());
        let loc = self.spelling_loc(&r.loc, false);
        self.file.resolve_type_mut(base).add_usage(loc, true);

        if let Some(container) = &r.container {
            if container.entity_kind() == EntityKind::Type && !container.usr().is_empty() {
                let derived = self.file.to_type_id(container.usr());
                push_unique(&mut self.file.resolve_type_mut(derived).def.parents, base);
                push_unique(&mut self.file.resolve_type_mut(base).derived, derived);
            }
        }
    }

    fn handle_override(&mut self, r: &RefEvent) {
        let base = self.file.to_func_id(r.referent.usr());
        if let Some(container) = &r.container {
            if container.entity_kind() == EntityKind::Func && !container.usr().is_empty() {
                let overrider = self.file.to_func_id(container.usr());
                let func = self.file.resolve_func_mut(overrider);
                if func.def.base.is_none() {
                    func.def.base = Some(base);
                }
                push_unique(&mut self.file.resolve_func_mut(base).derived, overrider);
            }
        }
    }

    fn handle_type_ref(&mut self, r: &RefEvent) {
        let id = self.file.to_type_id(r.referent.usr());
        // Expression-level mentions (container is a function) are semantic
        // uses; declaration-site mentions are bookkeeping.
        let interesting = r
            .container
            .as_ref()
            .is_some_and(|c| c.entity_kind() == EntityKind::Func);
        let loc = self.spelling_loc(&r.loc, interesting);
        self.file.resolve_type_mut(id).add_usage(loc, true);

        if let Some(container) = &r.container {
            if container.entity_kind() == EntityKind::Var && !container.usr().is_empty() {
                let var = self.file.to_var_id(container.usr());
                let var = self.file.resolve_var_mut(var);
                if var.def.variable_type.is_none() {
                    var.def.variable_type = Some(id);
                }
            }
        }
    }

    fn handle_var_ref(&mut self, r: &RefEvent, interesting: bool) {
        let id = self.file.to_var_id(r.referent.usr());
        let loc = self.spelling_loc(&r.loc, interesting);
        self.file.resolve_var_mut(id).add_usage(loc, true);
    }

    fn handle_unspecified(&mut self, r: &RefEvent) {
        let loc = self.spelling_loc(&r.loc, false);
        match r.referent.entity_kind() {
            EntityKind::Type => {
                let id = self.file.to_type_id(r.referent.usr());
                self.file.resolve_type_mut(id).add_usage(loc, true);
            }
            EntityKind::Func => {
                let id = self.file.to_func_id(r.referent.usr());
                self.file.resolve_func_mut(id).add_usage(loc, true);
            }
            EntityKind::Var => {
                let id = self.file.to_var_id(r.referent.usr());
                self.file.resolve_var_mut(id).add_usage(loc, true);
            }
        }
    }
}

impl IndexCallbacks for IndexDriver {
    fn on_decl(&mut self, decl: &DeclEvent) {
        if decl.cursor.usr().is_empty() {
            match decl.kind.entity_kind() {
                EntityKind::Func | EntityKind::Var => {
                    self.file.stats_mut().degenerate_callbacks += 1;
                    tracing::warn!(kind = %decl.kind, "declaration with empty USR skipped");
                }
                // Anonymous types are dropped without ceremony.
                EntityKind::Type => {}
            }
            return;
        }
        if self.config.skip_system_symbols && decl.is_system {
            return;
        }
        match decl.kind.entity_kind() {
            EntityKind::Type => self.handle_type_decl(decl),
            EntityKind::Func => self.handle_func_decl(decl),
            EntityKind::Var => self.handle_var_decl(decl),
        }
    }

    fn on_reference(&mut self, r: &RefEvent) {
        if r.referent.usr().is_empty() {
            return;
        }
        if r.referent.is_stub() {
            self.file.stats_mut().unresolved_refs += 1;
        }
        match r.role {
            RefRole::Call => self.handle_call(r),
            RefRole::BaseClass => self.handle_base_class(r),
            RefRole::Override => self.handle_override(r),
            RefRole::TypeRef => self.handle_type_ref(r),
            RefRole::Read | RefRole::Write => self.handle_var_ref(r, true),
            RefRole::Declaration => self.handle_var_ref(r, false),
            RefRole::Unspecified => self.handle_unspecified(r),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

fn push_unique<K>(list: &mut Vec<LocalId<K>>, id: LocalId<K>) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Call edges collapse only on exact `(id, loc)` equality: one entry per
/// textual call site.
fn push_unique_ref<K>(list: &mut Vec<Ref<K>>, r: Ref<K>) {
    if !list.contains(&r) {
        list.push(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxref_frontend::DeclKind;

    fn decl(kind: DeclKind, spelled: &str, is_definition: bool) -> DeclEvent {
        DeclEvent {
            cursor: Cursor::synthetic(kind.entity_kind(), spelled),
            kind,
            is_definition,
            is_system: false,
            container: None,
            underlying: None,
        }
    }

    fn call(callee: &str, caller: &str, line: u32, column: u32) -> RefEvent {
        RefEvent {
            referent: Cursor::synthetic(EntityKind::Func, callee),
            container: Some(Cursor::synthetic(EntityKind::Func, caller)),
            loc: SpellingLoc {
                file: "/src/a.cc".to_string(),
                line,
                column,
            },
            role: RefRole::Call,
        }
    }

    #[test]
    fn reference_before_declaration_fills_the_same_record() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_reference(&call("g", "f", 5, 3));
        driver.on_decl(&decl(DeclKind::Function, "g", true));

        let file = driver.finish();
        let g = file.func_by_usr("f:g").expect("g should be interned");
        let record = file.resolve_func(g);
        assert!(record.def.definition.is_some(), "definition filled in place");
        assert_eq!(record.uses.len(), 1);
        assert!(record.uses[0].interesting());
        assert_eq!(record.callers.len(), 1);
    }

    #[test]
    fn call_edges_are_symmetric_with_the_same_location() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_reference(&call("g", "f", 5, 3));

        let file = driver.finish();
        let f = file.func_by_usr("f:f").expect("f interned");
        let g = file.func_by_usr("f:g").expect("g interned");
        let callees = &file.resolve_func(f).def.callees;
        let callers = &file.resolve_func(g).callers;
        assert_eq!(callees.len(), 1);
        assert_eq!(callers.len(), 1);
        assert_eq!(callees[0].id, g);
        assert_eq!(callers[0].id, f);
        assert_eq!(callees[0].loc, callers[0].loc);
    }

    #[test]
    fn repeated_call_at_one_site_collapses_but_distinct_sites_do_not() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_reference(&call("g", "f", 5, 3));
        driver.on_reference(&call("g", "f", 5, 3));
        driver.on_reference(&call("g", "f", 6, 3));

        let file = driver.finish();
        let f = file.func_by_usr("f:f").expect("f interned");
        assert_eq!(file.resolve_func(f).def.callees.len(), 2);
    }

    fn positioned_decl(kind: DeclKind, usr: &str, name: &str, line: u32) -> DeclEvent {
        DeclEvent {
            cursor: Cursor::new(
                usr.to_string(),
                name.to_string(),
                name.to_string(),
                kind.entity_kind(),
                "/src/a.cc".to_string(),
                line,
                6,
                false,
            ),
            kind,
            is_definition: true,
            is_system: false,
            container: None,
            underlying: None,
        }
    }

    #[test]
    fn duplicate_definitions_keep_the_first() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_decl(&positioned_decl(DeclKind::Function, "f:f", "f", 1));
        driver.on_decl(&positioned_decl(DeclKind::Function, "f:f", "f", 7));

        let file = driver.finish();
        let f = file.func_by_usr("f:f").expect("f interned");
        assert_eq!(
            file.resolve_func(f).def.definition.map(|l| l.line()),
            Some(1),
            "the first definition wins"
        );
        assert_eq!(file.stats().duplicate_definitions, 1);

        // Replaying the surviving definition at its own position is silent.
        let mut again = IndexDriver::new("/src/a.cc");
        again.on_decl(&positioned_decl(DeclKind::Function, "f:f", "f", 1));
        again.on_decl(&positioned_decl(DeclKind::Function, "f:f", "f", 1));
        assert_eq!(again.finish().stats().duplicate_definitions, 0);
    }

    #[test]
    fn empty_usr_decl_is_counted_and_skipped() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_decl(&positioned_decl(DeclKind::Var, "", "x", 1));

        let file = driver.finish();
        assert!(file.vars().is_empty());
        assert_eq!(file.stats().degenerate_callbacks, 1);
    }

    #[test]
    fn base_class_edges_stay_symmetric_and_deduped() {
        let mut driver = IndexDriver::new("/src/a.cc");
        let event = RefEvent {
            referent: Cursor::synthetic(EntityKind::Type, "A"),
            container: Some(Cursor::synthetic(EntityKind::Type, "B")),
            loc: SpellingLoc {
                file: "/src/a.cc".to_string(),
                line: 2,
                column: 12,
            },
            role: RefRole::BaseClass,
        };
        driver.on_reference(&event);
        driver.on_reference(&event); // diamond repetition

        let file = driver.finish();
        let a = file.type_by_usr("t:A").expect("A interned");
        let b = file.type_by_usr("t:B").expect("B interned");
        assert_eq!(file.resolve_type(b).def.parents, vec![a]);
        assert_eq!(file.resolve_type(a).derived, vec![b]);
        assert_eq!(file.resolve_type(a).uses.len(), 1);
        assert!(!file.resolve_type(a).uses[0].interesting());
    }

    #[test]
    fn location_overflow_is_clamped_and_counted() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_reference(&call("g", "f", u32::MAX, 7));

        let file = driver.finish();
        assert_eq!(file.stats().locations_clamped, 1);
        let g = file.func_by_usr("f:g").expect("g interned");
        assert_eq!(file.resolve_func(g).uses[0].line(), Location::MAX_LINE);
    }

    #[test]
    fn stub_references_are_counted() {
        let mut driver = IndexDriver::new("/src/a.cc");
        driver.on_reference(&call("unknown", "f", 1, 1));
        let file = driver.finish();
        assert_eq!(file.stats().unresolved_refs, 1);
    }

    #[test]
    fn cancelled_driver_yields_an_incomplete_snapshot() {
        let cancel = CancelToken::new();
        let driver = IndexDriver::new("/src/a.cc").with_cancel(cancel.clone());
        cancel.cancel();
        assert!(driver.cancelled());
        let file = driver.finish();
        assert!(file.incomplete());
    }
}

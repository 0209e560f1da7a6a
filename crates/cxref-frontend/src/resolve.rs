//! Reference resolution against the declaration table.
//!
//! Resolution strategy, in order:
//! 1. exact qualified-name match on the spelling, tried against each
//!    enclosing scope from innermost outward;
//! 2. short-name match filtered by kind, preferring the candidate sharing
//!    the longest qualified prefix with the current scope, then source
//!    order;
//! 3. a synthesized stub cursor, so repeated references to the same unknown
//!    name still intern to one record.

use crate::cursor::{Cursor, EntityKind};
use crate::decls::{DeclInfo, DeclTable};
use crate::tu::TranslationUnit;
use std::collections::HashSet;

pub(crate) struct Resolver<'tu> {
    tu: &'tu TranslationUnit,
    table: &'tu DeclTable,
}

impl<'tu> Resolver<'tu> {
    pub fn new(tu: &'tu TranslationUnit, table: &'tu DeclTable) -> Self {
        Self { tu, table }
    }

    /// Resolve a spelled name as seen from `scope`. Always yields a cursor;
    /// unresolved names become stubs (see [`Cursor::is_stub`]).
    pub fn resolve(&self, spelled: &str, kind: EntityKind, scope: &[String]) -> Cursor {
        match self.lookup(spelled, kind, scope) {
            Some(index) => self.cursor_for(index),
            None => Cursor::synthetic(kind, spelled),
        }
    }

    /// Like [`Resolver::resolve`], but reports unresolved names as `None`
    /// instead of synthesizing. Used for expression identifiers, where an
    /// unknown name is far more likely to be an unmodeled construct than a
    /// cross-unit entity.
    pub fn resolve_strict(&self, spelled: &str, kind: EntityKind, scope: &[String]) -> Option<Cursor> {
        self.lookup(spelled, kind, scope).map(|i| self.cursor_for(i))
    }

    fn lookup(&self, spelled: &str, kind: EntityKind, scope: &[String]) -> Option<usize> {
        // Exact match, innermost scope first, ending with the global scope.
        for depth in (0..=scope.len()).rev() {
            let qualified = if depth == 0 {
                spelled.to_string()
            } else {
                format!("{}::{}", scope[..depth].join("::"), spelled)
            };
            if let Some(index) = self.table.lookup_qualified(&qualified, kind) {
                return Some(index);
            }
        }

        // Short-name fallback.
        let short = spelled.rsplit("::").next().unwrap_or(spelled);
        let candidates = self.table.candidates(short, kind);
        if candidates.is_empty() {
            return None;
        }
        let scope_path = scope.join("::");
        candidates.into_iter().min_by_key(|&i| {
            let shared = shared_prefix_len(&self.table.get(i).qualified_name, &scope_path);
            (std::cmp::Reverse(shared), i)
        })
    }

    /// Build a cursor for a table entry, positioned at its first sighting.
    pub fn cursor_for(&self, index: usize) -> Cursor {
        let info = self.table.get(index);
        self.cursor_at(info, info.line, info.column)
    }

    /// Build a cursor for a table entry at an explicit spelling site.
    pub fn cursor_at(&self, info: &DeclInfo, line: u32, column: u32) -> Cursor {
        let kind = info.kind.entity_kind();
        Cursor::new(
            format!("{}:{}", kind.sigil(), info.qualified_name),
            info.short_name.clone(),
            info.qualified_name.clone(),
            kind,
            self.tu.path().to_string(),
            line,
            column,
            self.tu.is_system(),
        )
    }

    /// Find the nearest base-chain method a declaration overrides:
    /// breadth-first over the class's bases, so a direct base wins over a
    /// transitive one.
    pub fn find_override_base(&self, class_qualified: &str, method_short: &str) -> Option<usize> {
        let class_index = self.table.lookup_qualified(class_qualified, EntityKind::Type)?;
        let mut visited: HashSet<usize> = HashSet::new();
        visited.insert(class_index);
        let mut queue: Vec<usize> = self.base_indices(class_index);

        while !queue.is_empty() {
            let mut next = Vec::new();
            for base in queue {
                if !visited.insert(base) {
                    continue;
                }
                let base_qualified = &self.table.get(base).qualified_name;
                let candidate = format!("{base_qualified}::{method_short}");
                if let Some(found) = self.table.lookup_qualified(&candidate, EntityKind::Func) {
                    return Some(found);
                }
                next.extend(self.base_indices(base));
            }
            queue = next;
        }
        None
    }

    fn base_indices(&self, class_index: usize) -> Vec<usize> {
        let info = self.table.get(class_index);
        let scope = enclosing_scope(&info.qualified_name);
        info.bases
            .iter()
            .filter_map(|spelled| self.lookup(spelled, EntityKind::Type, &scope))
            .collect()
    }
}

fn enclosing_scope(qualified: &str) -> Vec<String> {
    let mut segments: Vec<String> = qualified.split("::").map(str::to_string).collect();
    segments.pop();
    segments
}

/// Length of the shared `::`-segment prefix between a candidate's qualified
/// name and the current scope path.
fn shared_prefix_len(qualified: &str, scope_path: &str) -> usize {
    qualified
        .split("::")
        .zip(scope_path.split("::"))
        .take_while(|(a, b)| a == b)
        .count()
}

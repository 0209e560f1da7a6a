//! Entity records: one definition block plus accumulated cross-reference
//! data per type, function, and variable.
//!
//! The definition block holds the structural facts observed at the entity's
//! declaration; the remaining fields accumulate the inverse edges and usage
//! locations contributed by the rest of the translation unit. All
//! inter-entity references are by dense id, never by pointer, which keeps
//! the (cyclic) graph relocatable.

use crate::ids::{FuncId, FuncRef, TypeId, VarId};
use crate::location::Location;
use serde::{Deserialize, Serialize};

// ── Types ───────────────────────────────────────────────────────────────

/// Structural facts about a type, filled in when its declaration is seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeId,
    pub usr: String,
    pub short_name: String,
    pub qualified_name: String,

    /// Where the type is defined. Types get no separate declaration list:
    /// a forward declaration of a class carries no information a reader
    /// would jump to.
    pub definition: Option<Location>,

    /// Set when this type is a typedef/using alias of another type.
    pub alias_of: Option<TypeId>,

    /// Immediate base types.
    pub parents: Vec<TypeId>,

    /// Types, functions, and variables declared inside this type.
    pub types: Vec<TypeId>,
    pub funcs: Vec<FuncId>,
    pub vars: Vec<VarId>,
}

/// A type record: definition block plus accumulated edges and usages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedType {
    pub def: TypeDef,

    /// Immediate derived types; inverse of `def.parents`.
    pub derived: Vec<TypeId>,

    /// Every location the type appears at. Do not push directly; go through
    /// [`IndexedType::add_usage`] so positions stay deduplicated.
    pub uses: Vec<Location>,

    pub is_system_def: bool,
}

impl IndexedType {
    pub fn new(id: TypeId, usr: &str) -> Self {
        Self {
            def: TypeDef {
                id,
                usr: usr.to_string(),
                short_name: String::new(),
                qualified_name: String::new(),
                definition: None,
                alias_of: None,
                parents: Vec::new(),
                types: Vec::new(),
                funcs: Vec::new(),
                vars: Vec::new(),
            },
            derived: Vec::new(),
            uses: Vec::new(),
            is_system_def: false,
        }
    }

    pub fn add_usage(&mut self, loc: Location, insert_if_absent: bool) {
        add_usage(&mut self.uses, loc, insert_if_absent);
    }
}

// ── Functions ───────────────────────────────────────────────────────────

/// Structural facts about a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub id: FuncId,
    pub usr: String,
    pub short_name: String,
    pub qualified_name: String,
    pub definition: Option<Location>,

    /// The type declaring this function, when it is a method.
    pub declaring_type: Option<TypeId>,

    /// The method this method overrides.
    pub base: Option<FuncId>,

    /// Local variables (including parameters) declared in this function.
    pub locals: Vec<VarId>,

    /// Call sites inside this function, one entry per textual occurrence.
    pub callees: Vec<FuncRef>,
}

/// A function record: definition block plus accumulated edges and usages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFunc {
    pub def: FuncDef,

    /// Locations of forward declarations.
    pub declarations: Vec<Location>,

    /// Methods that directly override this one; inverse of `def.base`.
    pub derived: Vec<FuncId>,

    /// Call sites referring to this function; inverse of `def.callees`,
    /// carrying the same location as the forward edge.
    pub callers: Vec<FuncRef>,

    /// Every location the function appears at.
    pub uses: Vec<Location>,

    pub is_system_def: bool,
}

impl IndexedFunc {
    pub fn new(id: FuncId, usr: &str) -> Self {
        debug_assert!(!usr.is_empty(), "function entities require a USR");
        Self {
            def: FuncDef {
                id,
                usr: usr.to_string(),
                short_name: String::new(),
                qualified_name: String::new(),
                definition: None,
                declaring_type: None,
                base: None,
                locals: Vec::new(),
                callees: Vec::new(),
            },
            declarations: Vec::new(),
            derived: Vec::new(),
            callers: Vec::new(),
            uses: Vec::new(),
            is_system_def: false,
        }
    }

    pub fn add_usage(&mut self, loc: Location, insert_if_absent: bool) {
        add_usage(&mut self.uses, loc, insert_if_absent);
    }
}

// ── Variables ───────────────────────────────────────────────────────────

/// Structural facts about a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    pub id: VarId,
    pub usr: String,
    pub short_name: String,
    pub qualified_name: String,
    pub declaration: Option<Location>,
    pub definition: Option<Location>,

    /// The variable's type, when the frontend reported one.
    pub variable_type: Option<TypeId>,

    /// The type declaring this variable, when it is a member.
    pub declaring_type: Option<TypeId>,
}

/// A variable record: definition block plus accumulated usages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedVar {
    pub def: VarDef,

    /// Every location the variable appears at.
    pub uses: Vec<Location>,

    pub is_system_def: bool,
}

impl IndexedVar {
    pub fn new(id: VarId, usr: &str) -> Self {
        debug_assert!(!usr.is_empty(), "variable entities require a USR");
        Self {
            def: VarDef {
                id,
                usr: usr.to_string(),
                short_name: String::new(),
                qualified_name: String::new(),
                declaration: None,
                definition: None,
                variable_type: None,
                declaring_type: None,
            },
            uses: Vec::new(),
            is_system_def: false,
        }
    }

    pub fn add_usage(&mut self, loc: Location, insert_if_absent: bool) {
        add_usage(&mut self.uses, loc, insert_if_absent);
    }
}

// ── Shared usage insertion ──────────────────────────────────────────────

/// The one sanctioned mutation path for `uses` lists.
///
/// Positions are deduplicated ignoring `interesting`; the stored flag is the
/// OR of every insertion at that position, so a bookkeeping reference never
/// downgrades a semantic one.
fn add_usage(uses: &mut Vec<Location>, loc: Location, insert_if_absent: bool) {
    if let Some(existing) = uses.iter_mut().find(|u| u.same_position(loc)) {
        if loc.interesting() && !existing.interesting() {
            *existing = existing.with_interesting(true);
        }
        return;
    }
    if insert_if_absent {
        uses.push(loc);
    }
}

//! The event stream between the frontend walker and the indexer driver.
//!
//! Events arrive in source order on one thread. The walker polls
//! [`IndexCallbacks::cancelled`] between events and stops early when it
//! returns true, leaving the consumer with a partially populated snapshot.

use crate::cursor::{Cursor, EntityKind};
use std::fmt;

/// What sort of declaration a [`DeclEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Struct,
    Class,
    Union,
    Enum,
    /// `typedef` or `using` alias.
    TypeAlias,
    Function,
    Method,
    /// Member variable.
    Field,
    /// Global, namespace-scope, or local variable (including parameters).
    Var,
}

impl DeclKind {
    /// The symbol table this declaration interns into.
    pub fn entity_kind(self) -> EntityKind {
        match self {
            Self::Struct | Self::Class | Self::Union | Self::Enum | Self::TypeAlias => {
                EntityKind::Type
            }
            Self::Function | Self::Method => EntityKind::Func,
            Self::Field | Self::Var => EntityKind::Var,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => write!(f, "struct"),
            Self::Class => write!(f, "class"),
            Self::Union => write!(f, "union"),
            Self::Enum => write!(f, "enum"),
            Self::TypeAlias => write!(f, "type_alias"),
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
            Self::Field => write!(f, "field"),
            Self::Var => write!(f, "var"),
        }
    }
}

/// The role a reference plays at its site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefRole {
    Read,
    Write,
    Call,
    TypeRef,
    BaseClass,
    Override,
    Declaration,
    Unspecified,
}

impl fmt::Display for RefRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Call => write!(f, "call"),
            Self::TypeRef => write!(f, "typeref"),
            Self::BaseClass => write!(f, "baseclass"),
            Self::Override => write!(f, "override"),
            Self::Declaration => write!(f, "declaration"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// A raw spelling position, resolved by the consumer against its own file
/// registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellingLoc {
    pub file: String,
    /// 1-based; 0 if unknown.
    pub line: u32,
    /// 1-based; 0 if unknown.
    pub column: u32,
}

/// A type, function, or variable declaration or definition.
#[derive(Debug, Clone)]
pub struct DeclEvent {
    pub cursor: Cursor,
    pub kind: DeclKind,
    pub is_definition: bool,
    pub is_system: bool,
    /// Semantic parent: the declaring type for members and nested types,
    /// the enclosing function for locals and parameters.
    pub container: Option<Cursor>,
    /// The aliased type, for `TypeAlias` declarations only.
    pub underlying: Option<Cursor>,
}

/// A use of an entity at some source position.
#[derive(Debug, Clone)]
pub struct RefEvent {
    /// The entity being referenced.
    pub referent: Cursor,
    /// The entity the reference occurs in, when the walker knows one: the
    /// calling function for calls, the deriving type for base clauses, the
    /// overriding method for overrides, the declared variable for the type
    /// reference emitted with its declaration.
    pub container: Option<Cursor>,
    pub loc: SpellingLoc,
    pub role: RefRole,
}

/// Consumer of the frontend's event stream.
///
/// The walker delivers all events for one translation unit in deterministic
/// source order on one thread, and finishes every mutation implied by event
/// N before delivering event N+1.
pub trait IndexCallbacks {
    fn on_decl(&mut self, decl: &DeclEvent);

    fn on_reference(&mut self, reference: &RefEvent);

    /// Polled between events; return true to stop the walk at the next
    /// event boundary.
    fn cancelled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_kinds_map_to_symbol_tables() {
        assert_eq!(DeclKind::Struct.entity_kind(), EntityKind::Type);
        assert_eq!(DeclKind::TypeAlias.entity_kind(), EntityKind::Type);
        assert_eq!(DeclKind::Method.entity_kind(), EntityKind::Func);
        assert_eq!(DeclKind::Field.entity_kind(), EntityKind::Var);
        assert_eq!(DeclKind::Var.entity_kind(), EntityKind::Var);
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(DeclKind::TypeAlias.to_string(), "type_alias");
        assert_eq!(RefRole::BaseClass.to_string(), "baseclass");
    }
}

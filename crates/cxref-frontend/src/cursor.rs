//! Cursors: resolved handles to named entities.
//!
//! A [`Cursor`] is what the frontend hands the driver for every declaration
//! and reference. The driver treats it as opaque apart from the accessor
//! surface: USR, names, spelling location, kind, and the system-header flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity kind a cursor names. Determines which symbol table the driver
/// interns the cursor into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Type,
    Func,
    Var,
}

impl EntityKind {
    /// The kind sigil used as the USR prefix for synthesized identifiers.
    pub fn sigil(self) -> char {
        match self {
            Self::Type => 't',
            Self::Func => 'f',
            Self::Var => 'v',
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Func => write!(f, "func"),
            Self::Var => write!(f, "var"),
        }
    }
}

/// A handle to a named entity at a particular spelling site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    usr: String,
    short_name: String,
    qualified_name: String,
    kind: EntityKind,
    file: String,
    line: u32,
    column: u32,
    system: bool,
    stub: bool,
}

impl Cursor {
    /// Build a cursor for a resolved declaration. Public so frontends for
    /// other parsers can feed the same event stream.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        usr: String,
        short_name: String,
        qualified_name: String,
        kind: EntityKind,
        file: String,
        line: u32,
        column: u32,
        system: bool,
    ) -> Self {
        Self {
            usr,
            short_name,
            qualified_name,
            kind,
            file,
            line,
            column,
            system,
            stub: false,
        }
    }

    /// A cursor for an entity the frontend could not resolve to any
    /// declaration. The USR is synthesized from the kind sigil and the
    /// spelled name, so repeated references to the same unresolved name
    /// intern to the same stub record.
    pub fn synthetic(kind: EntityKind, spelled: &str) -> Self {
        let short = spelled.rsplit("::").next().unwrap_or(spelled);
        Self {
            usr: format!("{}:{}", kind.sigil(), spelled),
            short_name: short.to_string(),
            qualified_name: spelled.to_string(),
            kind,
            file: String::new(),
            line: 0,
            column: 0,
            system: false,
            stub: true,
        }
    }

    /// The stable identifier for this entity. Empty only for degenerate
    /// declarations the driver is expected to drop.
    pub fn usr(&self) -> &str {
        &self.usr
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.kind
    }

    /// Spelling location: `(file, 1-based line, 1-based column)`. Line 0
    /// means the frontend had no position for this cursor.
    pub fn location(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.column)
    }

    /// True when the cursor's declaration sits inside a system header.
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// True when this cursor was synthesized for an unresolved reference.
    pub fn is_stub(&self) -> bool {
        self.stub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_cursor_has_sigil_prefixed_usr() {
        let cursor = Cursor::synthetic(EntityKind::Func, "printf");
        assert_eq!(cursor.usr(), "f:printf");
        assert_eq!(cursor.short_name(), "printf");
        assert!(cursor.is_stub());
        assert!(!cursor.is_system());
    }

    #[test]
    fn synthetic_cursor_keeps_qualifiers_in_the_usr() {
        let cursor = Cursor::synthetic(EntityKind::Type, "std::string");
        assert_eq!(cursor.usr(), "t:std::string");
        assert_eq!(cursor.short_name(), "string");
        assert_eq!(cursor.qualified_name(), "std::string");
    }

    #[test]
    fn sigils_are_distinct_per_kind() {
        let type_usr = Cursor::synthetic(EntityKind::Type, "x").usr().to_string();
        let func_usr = Cursor::synthetic(EntityKind::Func, "x").usr().to_string();
        let var_usr = Cursor::synthetic(EntityKind::Var, "x").usr().to_string();
        assert_ne!(type_usr, func_usr);
        assert_ne!(func_usr, var_usr);
    }
}

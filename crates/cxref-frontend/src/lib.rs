//! cxref-frontend: Tree-sitter based C/C++ frontend for the cxref indexer.
//!
//! Realizes the parser side of the indexing pipeline: parse one translation
//! unit, collect every declaration, resolve reference spellings, and deliver
//! a source-order stream of declaration and reference events to a consumer.
//!
//! # Architecture
//!
//! - **tu** — translation units: tree-sitter parsing, compile-arg handling
//! - **cursor** — opaque entity handles with USRs, names, and locations
//! - **events** — the decl/reference event model and the callbacks trait
//! - **decls** — pass 1: the declaration table
//! - **resolve** — name resolution with scope preference and stub synthesis
//! - **walk** — pass 2: event emission in source order

mod cursor;
mod decls;
mod events;
mod resolve;
mod tu;
mod walk;

pub use cursor::{Cursor, EntityKind};
pub use events::{DeclEvent, DeclKind, IndexCallbacks, RefEvent, RefRole, SpellingLoc};
pub use tu::TranslationUnit;

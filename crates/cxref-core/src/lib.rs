//! cxref-core: Data model for the cxref cross-referencing indexer.
//!
//! Everything a frozen snapshot is made of lives here: the packed
//! [`Location`] codec, the [`FileRegistry`], dense typed ids, the three
//! entity record kinds, and the [`IndexedFile`] snapshot with its interning
//! tables and canonical dump. Plus the shared ambient pieces: errors,
//! per-pass stats, configuration, cancellation, and snapshot diffs.

pub mod cancel;
pub mod config;
pub mod diff;
pub mod entity;
pub mod error;
pub mod files;
pub mod ids;
pub mod location;
pub mod snapshot;
pub mod stats;

pub use cancel::CancelToken;
pub use config::IndexConfig;
pub use diff::IndexedFileDiff;
pub use entity::{FuncDef, IndexedFunc, IndexedType, IndexedVar, TypeDef, VarDef};
pub use error::IndexError;
pub use files::{FileId, FileRegistry};
pub use ids::{FuncId, FuncRef, LocalId, Ref, TypeId, TypeRef, VarId, VarRef};
pub use location::Location;
pub use snapshot::IndexedFile;
pub use stats::IndexStats;

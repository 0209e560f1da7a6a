//! Debug counters accumulated during one indexing pass.

use serde::{Deserialize, Serialize};

/// Per-snapshot counters for the anomalies indexing tolerates.
///
/// Indexing is best-effort over possibly malformed code: none of these
/// conditions abort a pass, but each is counted so regressions show up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Locations whose line/column/file id exceeded the packed bit widths
    /// and were clamped.
    pub locations_clamped: u64,
    /// Declaration events skipped because they carried an empty USR for a
    /// kind that requires one.
    pub degenerate_callbacks: u64,
    /// Second definition events for an already-defined entity; the first
    /// definition wins.
    pub duplicate_definitions: u64,
    /// References whose referent could not be resolved to a declaration and
    /// got a synthesized stub instead.
    pub unresolved_refs: u64,
}

impl IndexStats {
    /// True when the pass saw no anomalies at all.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

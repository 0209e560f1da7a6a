//! Packed 64-bit source locations.
//!
//! A [`Location`] carries an `interesting` marker, a file id, and a 1-based
//! line/column pair in a single `u64`, so usage lists stay flat and cheap to
//! copy. Layout, low bit first:
//!
//! | field         | bits |
//! |---------------|------|
//! | `interesting` | 1    |
//! | `file_id`     | 29   |
//! | `line`        | 20   |
//! | `column`      | 14   |

use crate::files::FileId;
use serde::{Deserialize, Serialize};
use std::fmt;

const FILE_ID_SHIFT: u64 = 1;
const LINE_SHIFT: u64 = 30;
const COLUMN_SHIFT: u64 = 50;

/// A source position packed into 64 bits.
///
/// `interesting` marks a semantic use (call site, read, write) as opposed to
/// a bookkeeping reference (parameter type, base clause). Two locations at
/// the same position but with different `interesting` flags compare unequal
/// under `==`; use [`Location::same_position`] to compare positions only.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(u64);

impl Location {
    /// Largest representable file id.
    pub const MAX_FILE_ID: u32 = (1 << 29) - 1;
    /// Largest representable line number.
    pub const MAX_LINE: u32 = (1 << 20) - 1;
    /// Largest representable column number.
    pub const MAX_COLUMN: u32 = (1 << 14) - 1;

    /// Pack a location. Out-of-range fields clamp to the maximum
    /// representable value; see [`Location::would_clamp`] for detecting
    /// overflow before packing.
    pub fn new(interesting: bool, file_id: FileId, line: u32, column: u32) -> Self {
        let file_id = u64::from(file_id.raw().min(Self::MAX_FILE_ID));
        let line = u64::from(line.min(Self::MAX_LINE));
        let column = u64::from(column.min(Self::MAX_COLUMN));
        Self(
            u64::from(interesting)
                | (file_id << FILE_ID_SHIFT)
                | (line << LINE_SHIFT)
                | (column << COLUMN_SHIFT),
        )
    }

    /// A location with no position information at all (file 0, line 0,
    /// column 0, not interesting).
    pub const fn unknown() -> Self {
        Self(0)
    }

    /// True when packing these fields would lose information.
    pub fn would_clamp(file_id: FileId, line: u32, column: u32) -> bool {
        file_id.raw() > Self::MAX_FILE_ID || line > Self::MAX_LINE || column > Self::MAX_COLUMN
    }

    pub fn interesting(self) -> bool {
        self.0 & 1 == 1
    }

    pub fn file_id(self) -> FileId {
        FileId::from_raw(((self.0 >> FILE_ID_SHIFT) & u64::from(Self::MAX_FILE_ID)) as u32)
    }

    pub fn line(self) -> u32 {
        ((self.0 >> LINE_SHIFT) & u64::from(Self::MAX_LINE)) as u32
    }

    pub fn column(self) -> u32 {
        ((self.0 >> COLUMN_SHIFT) & u64::from(Self::MAX_COLUMN)) as u32
    }

    /// Copy of this location with `interesting` replaced.
    pub fn with_interesting(self, interesting: bool) -> Self {
        Self((self.0 & !1) | u64::from(interesting))
    }

    /// Position equality, ignoring `interesting`.
    pub fn same_position(self, other: Self) -> bool {
        (self.0 >> 1) == (other.0 >> 1)
    }

    /// Sort key for canonical output: `(file_id, line, column)`.
    pub fn sort_key(self) -> (u32, u32, u32) {
        (self.file_id().raw(), self.line(), self.column())
    }
}

impl fmt::Display for Location {
    /// Canonical form: `[*]<file_id>:<line>:<column>`, `*` iff interesting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interesting() {
            write!(f, "*")?;
        }
        write!(
            f,
            "{}:{}:{}",
            self.file_id().raw(),
            self.line(),
            self.column()
        )
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let cases = [
            (false, 0u32, 0u32, 0u32),
            (true, 1, 1, 1),
            (false, 7, 1234, 56),
            (true, 42, 999_999, 4096),
            (
                true,
                Location::MAX_FILE_ID,
                Location::MAX_LINE,
                Location::MAX_COLUMN,
            ),
        ];
        for (interesting, file, line, column) in cases {
            let loc = Location::new(interesting, FileId::from_raw(file), line, column);
            assert_eq!(loc.interesting(), interesting);
            assert_eq!(loc.file_id().raw(), file);
            assert_eq!(loc.line(), line);
            assert_eq!(loc.column(), column);
        }
    }

    #[test]
    fn overflow_clamps_to_max() {
        let loc = Location::new(false, FileId::from_raw(u32::MAX), u32::MAX, u32::MAX);
        assert_eq!(loc.file_id().raw(), Location::MAX_FILE_ID);
        assert_eq!(loc.line(), Location::MAX_LINE);
        assert_eq!(loc.column(), Location::MAX_COLUMN);
        assert!(Location::would_clamp(
            FileId::from_raw(u32::MAX),
            u32::MAX,
            u32::MAX
        ));
        assert!(!Location::would_clamp(FileId::from_raw(1), 10, 20));
    }

    #[test]
    fn clamped_locations_remain_comparable() {
        let a = Location::new(false, FileId::from_raw(1), u32::MAX, 3);
        let b = Location::new(true, FileId::from_raw(1), Location::MAX_LINE, 3);
        assert!(a.same_position(b));
    }

    #[test]
    fn same_position_ignores_interesting() {
        let a = Location::new(false, FileId::from_raw(3), 10, 4);
        let b = Location::new(true, FileId::from_raw(3), 10, 4);
        assert_ne!(a, b);
        assert!(a.same_position(b));
        assert!(!a.same_position(Location::new(false, FileId::from_raw(3), 10, 5)));
    }

    #[test]
    fn with_interesting_only_touches_the_flag() {
        let a = Location::new(false, FileId::from_raw(9), 20, 30);
        let b = a.with_interesting(true);
        assert!(b.interesting());
        assert!(a.same_position(b));
        assert_eq!(b.with_interesting(false), a);
    }

    #[test]
    fn display_matches_canonical_form() {
        let plain = Location::new(false, FileId::from_raw(1), 2, 3);
        let interesting = Location::new(true, FileId::from_raw(1), 2, 3);
        assert_eq!(plain.to_string(), "1:2:3");
        assert_eq!(interesting.to_string(), "*1:2:3");
    }
}

//! Dense, kind-tagged entity identifiers.
//!
//! A [`LocalId`] names one entity within a single snapshot. Ids are plain
//! array indices: the id-space for each kind is `0..count`, and the entity
//! vectors are indexable by id directly. Ids are not portable between
//! snapshots.

use crate::entity::{IndexedFunc, IndexedType, IndexedVar};
use crate::location::Location;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A dense per-snapshot identifier for an entity of kind `K`.
///
/// Id 0 is a valid id; "unresolved" is always `Option<LocalId<K>>::None`,
/// never a sentinel value.
pub struct LocalId<K> {
    raw: u32,
    _kind: PhantomData<fn() -> K>,
}

pub type TypeId = LocalId<IndexedType>;
pub type FuncId = LocalId<IndexedFunc>;
pub type VarId = LocalId<IndexedVar>;

impl<K> LocalId<K> {
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// The id as a vector index.
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

// Manual impls: derives would demand `K: Clone` etc., but the kind marker
// is phantom.
impl<K> Copy for LocalId<K> {}

impl<K> Clone for LocalId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> PartialEq for LocalId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for LocalId<K> {}

impl<K> PartialOrd for LocalId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for LocalId<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K> Hash for LocalId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K> fmt::Debug for LocalId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.raw)
    }
}

impl<K> fmt::Display for LocalId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl<K> Serialize for LocalId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw)
    }
}

impl<'de, K> Deserialize<'de> for LocalId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_raw)
    }
}

/// An entity reference: which entity, and where in the source.
///
/// Used for the location-carrying relation pairs (`callees`/`callers`), which
/// must hold the same location on both sides of the inverse.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Ref<K> {
    pub id: LocalId<K>,
    pub loc: Location,
}

pub type TypeRef = Ref<IndexedType>;
pub type FuncRef = Ref<IndexedFunc>;
pub type VarRef = Ref<IndexedVar>;

impl<K> Ref<K> {
    pub fn new(id: LocalId<K>, loc: Location) -> Self {
        Self { id, loc }
    }
}

impl<K> Copy for Ref<K> {}

impl<K> Clone for Ref<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> PartialEq for Ref<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.loc == other.loc
    }
}

impl<K> Eq for Ref<K> {}

impl<K> fmt::Debug for Ref<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({}@{})", self.id, self.loc)
    }
}

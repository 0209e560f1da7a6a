//! File registry: absolute paths mapped to compact file ids.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A compact identifier for a source file within one snapshot.
///
/// Id 0 is reserved for the empty path, meaning "no file information
/// available from the parser".
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u32);

impl FileId {
    /// The "no file" sentinel.
    pub const UNKNOWN: FileId = FileId(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional path ↔ [`FileId`] mapping, owned by one snapshot.
///
/// Ids are dense and monotonic: a path inserted when the registry holds `n`
/// entries gets id `n`. Serialized as the plain path list; the lookup map is
/// rebuilt on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FileRegistry {
    path_to_id: HashMap<String, FileId>,
    paths: Vec<String>,
}

impl FileRegistry {
    /// Create a registry with id 0 bound to the empty path.
    pub fn new() -> Self {
        let mut registry = Self {
            path_to_id: HashMap::new(),
            paths: Vec::new(),
        };
        registry.resolve_path("");
        registry
    }

    /// Look up a path, inserting it with the next dense id if absent.
    pub fn resolve_path(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.path_to_id.get(path) {
            return id;
        }
        let id = FileId::from_raw(self.paths.len() as u32);
        self.path_to_id.insert(path.to_string(), id);
        self.paths.push(path.to_string());
        id
    }

    /// The path registered for `id`, if any.
    pub fn path_of(&self, id: FileId) -> Option<&str> {
        self.paths.get(id.raw() as usize).map(String::as_str)
    }

    /// All registered paths, in id order. Index 0 is the empty path.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of registered paths, including the reserved empty path.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for FileRegistry {
    fn from(paths: Vec<String>) -> Self {
        let path_to_id = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), FileId::from_raw(i as u32)))
            .collect();
        Self { path_to_id, paths }
    }
}

impl From<FileRegistry> for Vec<String> {
    fn from(registry: FileRegistry) -> Self {
        registry.paths
    }
}

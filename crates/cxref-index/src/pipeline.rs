//! Directory indexing pipeline.
//!
//! Walks a directory tree, filters C-family translation units, skips files
//! whose content hash is unchanged since the last run, and runs one
//! independent driver per file. Drivers share nothing, so translation units
//! could be indexed in parallel; this pipeline runs them sequentially and
//! leaves parallelism to the caller.

use cxref_core::{CancelToken, IndexConfig, IndexError, IndexedFile};
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// Result of indexing a directory.
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Supported files encountered by the walk.
    pub files_scanned: usize,
    /// Files indexed into snapshots.
    pub files_parsed: usize,
    /// Files skipped as unchanged since the last run.
    pub files_skipped: usize,
    /// Files that failed to read or parse.
    pub files_failed: usize,
    /// One frozen snapshot per parsed file.
    pub snapshots: Vec<IndexedFile>,
}

impl PipelineResult {
    /// Entity totals across all snapshots: `(types, funcs, vars)`.
    pub fn entity_totals(&self) -> (usize, usize, usize) {
        self.snapshots.iter().fold((0, 0, 0), |(t, f, v), s| {
            (t + s.types().len(), f + s.funcs().len(), v + s.vars().len())
        })
    }
}

/// The directory indexing pipeline.
///
/// Holds the content hashes of everything it indexed, so repeated runs over
/// the same tree only re-index what changed. The hashes are in-memory only;
/// the snapshot layer deliberately has no persistence.
pub struct Pipeline {
    config: IndexConfig,
    args: Vec<String>,
    /// Path -> SHA-256 hex digest at the time the file was last indexed.
    indexed_hashes: HashMap<String, String>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            args: Vec::new(),
            indexed_hashes: HashMap::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Compile arguments handed to every translation unit.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Index a directory, returning one snapshot per changed file.
    ///
    /// The walk skips hidden files and respects `.gitignore` rules when the
    /// configuration says to. Per-file failures are logged and counted, not
    /// propagated: one unreadable file must not sink the run.
    pub fn index_directory(&mut self, root: &Path) -> Result<PipelineResult, IndexError> {
        let mut result = PipelineResult::default();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(self.config.follow_gitignore)
            .git_global(self.config.follow_gitignore)
            .git_exclude(self.config.follow_gitignore)
            .build();

        for entry in walker {
            if self.cancel.is_cancelled() {
                tracing::info!("indexing cancelled, returning partial results");
                break;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("walk error: {err}");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !self.config.supports_extension(ext) {
                continue;
            }

            result.files_scanned += 1;
            let path_str = path.to_string_lossy().to_string();

            let content = match std::fs::read(path) {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!("failed to read {path_str}: {err}");
                    result.files_failed += 1;
                    continue;
                }
            };

            let hash = content_hash(&content);
            if self.indexed_hashes.get(&path_str) == Some(&hash) {
                result.files_skipped += 1;
                continue;
            }

            match crate::parse_source(
                &path_str,
                content,
                &self.args,
                &self.config,
                self.cancel.clone(),
            ) {
                Ok(snapshot) => {
                    // Incomplete snapshots are not recorded as done; the
                    // next run re-indexes the file.
                    if !snapshot.incomplete() {
                        self.indexed_hashes.insert(path_str, hash);
                    }
                    result.files_parsed += 1;
                    result.snapshots.push(snapshot);
                }
                Err(err) => {
                    tracing::warn!("failed to index {path_str}: {err}");
                    result.files_failed += 1;
                }
            }
        }

        let (types, funcs, vars) = result.entity_totals();
        tracing::info!(
            "indexed {}: {} scanned, {} parsed, {} skipped, {} failed, {} types, {} funcs, {} vars",
            root.display(),
            result.files_scanned,
            result.files_parsed,
            result.files_skipped,
            result.files_failed,
            types,
            funcs,
            vars,
        );

        Ok(result)
    }
}

/// SHA-256 hex digest of a file's content.
fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn index_temp_directory_with_incremental_skip() {
        let dir = std::env::temp_dir().join("cxref_pipeline_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("temp dir should be creatable");

        fs::write(dir.join("main.cc"), b"void helper();\nint main() { helper(); }\n")
            .expect("write main.cc");
        fs::write(dir.join("util.c"), b"int add(int a, int b) { return a + b; }\n")
            .expect("write util.c");
        fs::write(dir.join("notes.txt"), b"not C at all").expect("write notes.txt");

        let mut pipeline = Pipeline::new(IndexConfig::default());
        let result = pipeline
            .index_directory(&dir)
            .expect("indexing should succeed");

        assert_eq!(result.files_scanned, 2, "only C-family files count");
        assert_eq!(result.files_parsed, 2);
        assert_eq!(result.files_skipped, 0);
        let (_, funcs, _) = result.entity_totals();
        assert!(funcs >= 3, "helper, main, add");

        // Second run: nothing changed, everything skips.
        let result2 = pipeline
            .index_directory(&dir)
            .expect("indexing should succeed");
        assert_eq!(result2.files_parsed, 0);
        assert_eq!(result2.files_skipped, 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn edited_file_is_reindexed() {
        let dir = std::env::temp_dir().join("cxref_pipeline_edit_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("temp dir should be creatable");
        fs::write(dir.join("a.cc"), b"void a();\n").expect("write a.cc");

        let mut pipeline = Pipeline::new(IndexConfig::default());
        pipeline.index_directory(&dir).expect("first run");

        fs::write(dir.join("a.cc"), b"void a();\nvoid b();\n").expect("rewrite a.cc");
        let result = pipeline.index_directory(&dir).expect("second run");
        assert_eq!(result.files_parsed, 1, "changed content re-indexes");
        assert_eq!(result.files_skipped, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cancelled_pipeline_returns_partial_results() {
        let dir = std::env::temp_dir().join("cxref_pipeline_cancel_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("temp dir should be creatable");
        fs::write(dir.join("a.cc"), b"void a();\n").expect("write a.cc");

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut pipeline = Pipeline::new(IndexConfig::default()).with_cancel(cancel);
        let result = pipeline
            .index_directory(&dir)
            .expect("cancelled run still returns");
        assert_eq!(result.files_parsed, 0);

        let _ = fs::remove_dir_all(&dir);
    }
}

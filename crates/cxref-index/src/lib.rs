//! cxref-index: The indexing pipeline for cxref.
//!
//! Composes the frontend and the driver into the one top-level entry point,
//! [`parse`], and adds the directory pipeline with SHA-256 change detection
//! for indexing whole trees.

pub mod driver;
pub mod pipeline;

pub use driver::IndexDriver;
pub use pipeline::{Pipeline, PipelineResult};

use cxref_core::{CancelToken, IndexConfig, IndexError, IndexedFile};
use cxref_frontend::TranslationUnit;

/// Index one translation unit from disk with default configuration.
///
/// Returns a frozen snapshot, or an error naming the parser stage that
/// failed. This is the only failure point: everything past the parse is
/// best-effort.
pub fn parse(path: &str, args: &[String]) -> Result<IndexedFile, IndexError> {
    parse_with(path, args, &IndexConfig::default(), CancelToken::new())
}

/// Index one translation unit from disk.
pub fn parse_with(
    path: &str,
    args: &[String],
    config: &IndexConfig,
    cancel: CancelToken,
) -> Result<IndexedFile, IndexError> {
    let source = std::fs::read(path)?;
    parse_source(path, source, args, config, cancel)
}

/// Index one translation unit from an in-memory buffer.
pub fn parse_source(
    path: &str,
    source: Vec<u8>,
    args: &[String],
    config: &IndexConfig,
    cancel: CancelToken,
) -> Result<IndexedFile, IndexError> {
    let tu = TranslationUnit::parse(path, source, args)?;
    let mut driver = IndexDriver::new(path)
        .with_config(config.clone())
        .with_cancel(cancel);
    tu.index(&mut driver);
    Ok(driver.finish())
}

/// Unified error type for cxref.
///
/// Only the `Io`/`Grammar`/`Parse` variants terminate an indexing pass;
/// everything else the driver tolerates, counts, and continues past.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

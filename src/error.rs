//! Error types for the fallible edges of the engine (files, stores, config).
//!
//! The typing engine itself never errors: out-of-phase or over-long input is a
//! no-op and degenerate scoring has defined fallbacks.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for typehaki operations.
pub type Result<T> = std::result::Result<T, HakiError>;

#[derive(Debug, Error)]
pub enum HakiError {
    /// Reference text must contain at least one character.
    #[error("reference text is empty")]
    EmptyReference,

    /// A session needs a positive time budget.
    #[error("session duration must be at least one second")]
    ZeroDuration,

    /// Failed to read a reference text file.
    #[error("failed to read reference text '{path}': {source}")]
    ReadReference {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    /// No home directory could be resolved for the application's files.
    #[error("could not resolve application directories")]
    NoProjectDirs,
}

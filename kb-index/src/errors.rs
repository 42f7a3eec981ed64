//! Unified error type for the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for KB operations.
#[derive(Debug, Error)]
pub enum KbError {
    /// The KB file exists but could not be read.
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The KB file is not a JSON array of known-issue records.
    #[error("invalid KB file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two records share the same `id`.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// A writer panicked while holding the snapshot lock.
    #[error("KB snapshot lock poisoned")]
    Poisoned,
}

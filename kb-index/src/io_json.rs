//! KB file loading.

use std::{fs, io::ErrorKind, path::Path};

use tracing::{info, warn};

use crate::{KbResult, errors::KbError, record::KnownIssueRecord};

/// Reads a JSON array of known-issue records from `path`.
///
/// A missing file yields `Ok(None)`; any other read failure or malformed
/// content is an error.
pub fn read_records(path: &Path) -> KbResult<Option<Vec<KnownIssueRecord>>> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "KB file not found, index stays empty");
            return Ok(None);
        }
        Err(source) => {
            return Err(KbError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let records: Vec<KnownIssueRecord> =
        serde_json::from_str(&raw).map_err(|source| KbError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), records = records.len(), "KB file read");
    Ok(Some(records))
}

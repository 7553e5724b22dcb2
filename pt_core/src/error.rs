use std::path::PathBuf;

use thiserror::Error;

/**
 * Search: talking to the repository failed (transport, status, body).
 * DataFormat: a record is missing a field the core has to interpret.
 */
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("search request failed: {0}")]
    Search(String),
    #[error("malformed result record: {0}")]
    DataFormat(String),
}

/// Everything that can end an acquisition early. Declining a prompt is not one of these.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("malformed result record: {0}")]
    DataFormat(String),
    #[error("output path {0:?} exists and is not a directory")]
    InvalidOutputDirectory(PathBuf),
    #[error("could not download {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("could not read archive {path:?}: {source}")]
    Archive { path: PathBuf, source: std::io::Error },
    #[error("could not find a PKGBUILD inside {0:?}")]
    BuildRecipeNotFound(PathBuf),
    #[error("{tool} exited with {status}")]
    BuildToolFailed { tool: String, status: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AcquisitionError {
    /// Recipe and build failures are reported as warnings and do not change the exit status.
    pub fn is_warning(&self) -> bool {
        return matches!(self, AcquisitionError::BuildRecipeNotFound(_) | AcquisitionError::BuildToolFailed { .. });
    }
}

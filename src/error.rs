use std::path::PathBuf;
use tabletop_core::TableError;
use thiserror::Error;

/// Failure to save or restore a table snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot could not be applied: {0}")]
    Table(#[from] TableError),
}

impl SnapshotError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

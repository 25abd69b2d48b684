//! JSON snapshots of a table.
//!
//! A snapshot is the table memento written as pretty JSON. Saving goes
//! through a sibling temp file and a rename so a crash never leaves a
//! half-written snapshot behind.

use crate::error::SnapshotError;
use std::fs;
use std::path::{Path, PathBuf};
use tabletop_core::{Memento, Table};
use tracing::{debug, info};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the table's memento to `path`, creating parent directories.
pub fn save_snapshot(path: &Path, table: &Table) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| SnapshotError::io(parent, err))?;
    }
    let json = serde_json::to_string_pretty(&table.create_memento()?)?;
    let temp = temp_path(path);
    fs::write(&temp, json).map_err(|err| SnapshotError::io(&temp, err))?;
    fs::rename(&temp, path).map_err(|err| SnapshotError::io(path, err))?;
    info!(
        path = %path.display(),
        revision = table.revision_number(),
        "table snapshot saved"
    );
    Ok(())
}

/// Restore the table from `path`.
///
/// # Returns
/// `false` when no snapshot exists yet; the table is left untouched.
///
/// # Errors
/// Fails on unreadable files, invalid JSON, or mementos the table rejects.
pub fn load_snapshot(path: &Path, table: &Table) -> Result<bool, SnapshotError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no table snapshot yet");
            return Ok(false);
        }
        Err(err) => return Err(SnapshotError::io(path, err)),
    };
    let memento: Memento = serde_json::from_str(&json)?;
    table.set_memento(&memento)?;
    info!(
        path = %path.display(),
        components = table.tabletop().component_count(),
        "table snapshot loaded"
    );
    Ok(true)
}

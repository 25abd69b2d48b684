//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use tabletop_core::Config;

/// Default snapshot location, before tilde expansion.
pub const DEFAULT_SNAPSHOT_PATH: &str = "~/.cache/tabletop/table.json";

/// Configuration for the headless `tabletop` binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the table snapshot is read from and written to.
    pub snapshot_path: PathBuf,
    /// Settings for the table environment itself.
    pub core: Config,
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    env::current_dir().ok()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `TABLETOP_SNAPSHOT` overrides the snapshot path; the core settings come
    /// from [`Config::from_env`].
    pub fn from_env() -> Self {
        let snapshot = env::var("TABLETOP_SNAPSHOT")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string());
        Self {
            snapshot_path: expand_tilde(snapshot.trim()),
            core: Config::from_env(),
        }
    }
}

//! Configuration loading from environment variables.

use crate::constants::DEFAULT_EVENT_THREAD_NAME;
use std::env;

/// Runtime configuration for a table environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name given to the event notification worker thread.
    pub event_thread_name: String,
    /// Log every delivered notification with its queue latency.
    pub event_trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_thread_name: DEFAULT_EVENT_THREAD_NAME.to_string(),
            event_trace: false,
        }
    }
}

/// Interpret an environment flag such as `TABLETOP_EVENT_TRACE=on`.
///
/// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off` in any case,
/// with blank meaning off. Anything else yields `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            event_thread_name: env::var("TABLETOP_EVENT_THREAD_NAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.event_thread_name),
            event_trace: env_flag_enabled("TABLETOP_EVENT_TRACE"),
        }
    }
}

//! Store configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "ROLLCALL_DB_PATH";
/// Environment variable enabling serialized read-modify-write cycles.
pub const EXCLUSIVE_WRITES_ENV: &str = "ROLLCALL_EXCLUSIVE_WRITES";
/// Database file used when [`DB_PATH_ENV`] is not set.
pub const DEFAULT_DB_PATH: &str = "data/db.json";

/// Configuration for opening a document store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON database file.
    pub path: PathBuf,

    /// Whether a missing database file is written as `{}` on first read.
    pub create_if_missing: bool,

    /// Whether read-modify-write cycles are serialized.
    ///
    /// When disabled, two concurrent writers may both read the same state
    /// and the later full-file write wins.
    pub exclusive_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            create_if_missing: true,
            exclusive_writes: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from `ROLLCALL_DB_PATH` and
    /// `ROLLCALL_EXCLUSIVE_WRITES`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match env::var(DB_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => config.path = PathBuf::from(path.trim()),
            _ => tracing::info!("{DB_PATH_ENV} not set, using default: {DEFAULT_DB_PATH}"),
        }

        if let Ok(raw) = env::var(EXCLUSIVE_WRITES_ENV) {
            match parse_flag(&raw) {
                Some(value) => config.exclusive_writes = value,
                None => tracing::warn!("Invalid {EXCLUSIVE_WRITES_ENV} value: {raw}"),
            }
        }

        config
    }

    /// Sets the database file path.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets whether to create the database file if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether read-modify-write cycles are serialized.
    #[must_use]
    pub const fn exclusive_writes(mut self, value: bool) -> Self {
        self.exclusive_writes = value;
        self
    }
}

/// Parses a boolean flag as written in environment files.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

//! CLI error type.

use rollcall_core::CoreError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A store operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading an input file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output JSON could not be handled.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The database file does not exist.
    #[error("no database found at {0}")]
    MissingDatabase(String),

    /// An import file has the wrong shape.
    #[error("invalid import: {0}")]
    InvalidImport(String),

    /// `verify` found problems.
    #[error("verification failed with {0} problem(s)")]
    VerificationFailed(usize),
}

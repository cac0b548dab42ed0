//! Error types for the client

use std::path::PathBuf;
use thiserror::Error;

/// Client errors
///
/// Every kind is terminal: the entry point prints the diagnostic and exits
/// with the kind's reserved code. Lower layers only return these, they never
/// print or exit themselves.
#[derive(Debug, Error)]
pub enum FluxcError {
    #[error("config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("malformed config file {path}: {reason}")]
    ConfigMalformed { path: PathBuf, reason: String },

    #[error("unknown profile '{name}', valid profiles are: {}", .known.join(", "))]
    UnknownProfile { name: String, known: Vec<String> },

    #[error("no library entry with id {id}, the library has {count} entries")]
    UnknownLibraryId { id: usize, count: usize },

    #[error("query execution failed: {0}")]
    QueryExecution(#[from] influxdb::Error),

    #[error("query rejected by server: {reason}")]
    QueryRejected { reason: String },
}

impl FluxcError {
    /// Process exit code reserved for this error kind.
    ///
    /// Config-not-found and unknown-profile share code 10; the remaining
    /// kinds each get their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            FluxcError::ConfigNotFound { .. } => 10,
            FluxcError::UnknownProfile { .. } => 10,
            FluxcError::ConfigMalformed { .. } => 11,
            FluxcError::UnknownLibraryId { .. } => 12,
            FluxcError::QueryExecution(_) | FluxcError::QueryRejected { .. } => 13,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, FluxcError>;

//! Error types for MiraDB operations.

use thiserror::Error;

/// Result type alias using MiraDB's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MiraDB operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Vector dimension mismatch between index and input.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The internal id space of the index is full.
    #[error("index capacity exhausted: internal id space is full")]
    CapacityExhausted,

    /// Record with the given ID was not found.
    #[error("vector not found: {0}")]
    NotFound(u64),

    /// A database already exists at the given path.
    #[error("database file already exists: {0}")]
    AlreadyExists(String),

    /// Search was attempted before any index rebuild.
    #[error("index not built; run a rebuild first")]
    IndexNotBuilt,

    /// IO error while reading or writing the data file.
    #[error("io error: {0}")]
    Io(String),

    /// The persisted document could not be parsed.
    #[error("database file is corrupted: {0}")]
    Corrupt(String),
}

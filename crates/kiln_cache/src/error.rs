//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reads are recoverable: the cache treats a bad store as missing. Writes
/// surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The persisted store could not be parsed.
    #[error("failed to parse cache store {path}: {reason}")]
    StoreParse {
        /// The store file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The store could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

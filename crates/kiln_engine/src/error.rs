//! Error types for generation passes.

use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_graph::GraphError;

/// Errors that abort a generation pass.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project graph could not be resolved.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The cache store could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A backend failed to write an artifact.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A name cannot be used as an artifact file name.
    #[error("cannot write artifact for '{name}': {reason}")]
    ArtifactName {
        /// Project name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// An artifact could not be serialized.
    #[error("failed to serialize artifact '{name}': {reason}")]
    Serialization {
        /// Project or workspace name.
        name: String,
        /// Description of the failure.
        reason: String,
    },
}

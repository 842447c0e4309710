//! Error types for graph construction and materialization.

use kiln_config::ConfigError;

/// Errors raised while building or resolving the project graph.
///
/// All of these are structural: they abort the generation pass.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An option key was read that was never set on the project.
    #[error("project '{project}' has no option '{key}'")]
    UnknownOption {
        /// The project that was queried.
        project: String,
        /// The missing option key.
        key: String,
    },

    /// A dependency project was not registered before materialization.
    #[error(
        "project '{project}' ({config}) depends on '{dependency}', which is not registered in the workspace"
    )]
    UnresolvedDependency {
        /// The project being materialized.
        project: String,
        /// The configuration being materialized.
        config: String,
        /// The dependency that is missing from the workspace.
        dependency: String,
    },

    /// A project with the given name is not in the workspace.
    #[error("unknown project '{0}'")]
    UnknownProject(String),

    /// Project dependencies form a cycle.
    #[error("dependency cycle involving project '{0}'")]
    DependencyCycle(String),

    /// A package workspace could not be resolved.
    #[error("package '{name}' is unavailable: {reason}")]
    PackageUnavailable {
        /// The package name.
        name: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// The definition file or an option value was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

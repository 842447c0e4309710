//! The project graph: projects, filters, workspaces, and dependency resolution.
//!
//! Projects are built up by a definition source (an embedding host or a
//! `kiln.toml` file), shared into a [`Workspace`] as [`ProjectRef`]s, and then
//! materialized per configuration into [`ResolvedOptions`] for backends.

#![warn(missing_docs)]

pub mod definition;
pub mod error;
pub mod host;
pub mod project;
pub mod resolve;
pub mod workspace;

pub use definition::{build_workspace, load_workspace};
pub use error::GraphError;
pub use host::{LocalHost, ScriptHost};
pub use project::{
    Dependency, DependencyRef, Exports, Filter, ModuleInterface, Project, ProjectRef, Visibility,
};
pub use resolve::{closure, materialize, valid_dependency, ResolvedOptions};
pub use workspace::{Workspace, WorkspaceSettings};

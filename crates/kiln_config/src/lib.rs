//! Configuration value model and `kiln.toml` workspace definition files.
//!
//! This crate provides the strongly-typed [`Options`] record every project
//! carries, the sparse [`OptionOverrides`] used by per-configuration filters,
//! define maps, and the serde model of definition files that an embedding host
//! (or the CLI) turns into a project graph.

#![warn(missing_docs)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod options;

pub use definition::{
    ExportsDef, FilterDef, ModuleDef, PackageDef, ProjectDef, WorkspaceDef, WorkspaceMeta,
    DEFINITION_FILE,
};
pub use error::ConfigError;
pub use loader::{load_definition, load_definition_from_str};
pub use options::{
    parse_define, DefineValue, Defines, OptionOverrides, OptionValue, Options, TargetKind,
    DEFAULT_ARCHITECTURE,
};

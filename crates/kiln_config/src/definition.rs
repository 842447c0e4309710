//! Workspace definition types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::options::{parse_define, Defines, OptionOverrides, Options, TargetKind};

/// File name of a workspace definition inside a project or package directory.
pub const DEFINITION_FILE: &str = "kiln.toml";

/// The top-level workspace definition parsed from `kiln.toml`.
///
/// This is already-evaluated data: the embedding host (or the CLI) turns it
/// into a project graph without running any scripts.
#[derive(Debug, Deserialize)]
pub struct WorkspaceDef {
    /// Workspace metadata and settings.
    pub workspace: WorkspaceMeta,
    /// Packages whose libraries projects may depend on, keyed by name.
    #[serde(default)]
    pub packages: BTreeMap<String, PackageDef>,
    /// Project definitions in declaration order.
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectDef>,
}

/// Workspace name, configuration list, and backend settings.
#[derive(Debug, Deserialize)]
pub struct WorkspaceMeta {
    /// The workspace name.
    pub name: String,
    /// Ordered configuration names.
    #[serde(default = "default_configs")]
    pub configs: Vec<String>,
    /// Directory backends write artifacts into, relative to the definition.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Language standard backends should select (e.g. "cpp17", "c11").
    #[serde(default = "default_language")]
    pub language: String,
    /// C runtime flavour (e.g. "mt", "mtd").
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Enable module-interface maps in resolved options.
    #[serde(default)]
    pub modules: bool,
    /// Projects to request explicitly. Empty means every defined project.
    #[serde(default)]
    pub add: Vec<String>,
}

fn default_configs() -> Vec<String> {
    vec!["debug".to_string(), "release".to_string()]
}

fn default_output_dir() -> String {
    "bin".to_string()
}

fn default_language() -> String {
    "cpp17".to_string()
}

fn default_runtime() -> String {
    "mt".to_string()
}

/// Where to find a package workspace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageDef {
    /// Remote repository URL. Only consulted when no local checkout exists.
    pub url: Option<String>,
    /// Branch to check out from `url`.
    pub branch: Option<String>,
}

/// A single project definition.
#[derive(Debug, Deserialize)]
pub struct ProjectDef {
    /// Unique project name.
    pub name: String,
    /// Artifact kind.
    pub kind: TargetKind,
    /// Source files. Duplicates are dropped when the graph is built.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Module-interface files.
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    /// Defines in `NAME` or `NAME=VALUE` form.
    #[serde(default)]
    pub defines: Vec<String>,
    /// Include directories.
    #[serde(default)]
    pub include_dirs: Vec<String>,
    /// Library search directories.
    #[serde(default)]
    pub lib_dirs: Vec<String>,
    /// Raw compiler flags.
    #[serde(default)]
    pub compile: Vec<String>,
    /// Raw linker flags.
    #[serde(default)]
    pub link: Vec<String>,
    /// Names of projects in this file this project depends on.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Opaque external link names (system libraries).
    #[serde(default)]
    pub links: Vec<String>,
    /// Packages whose libraries this project depends on.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Base options.
    #[serde(default)]
    pub options: Options,
    /// Prebuilt inputs exported to consumers.
    #[serde(default)]
    pub exports: ExportsDef,
    /// Per-configuration overrides keyed by configuration name.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterDef>,
}

impl ProjectDef {
    /// Parses the `defines` list into a define map.
    pub fn parsed_defines(&self) -> Result<Defines, ConfigError> {
        collect_defines(&self.defines)
    }
}

/// A module-interface file and its visibility.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDef {
    /// Path to the interface file.
    pub path: String,
    /// Whether consumers may import it.
    #[serde(default)]
    pub public: bool,
}

/// Inputs a project exports to every direct consumer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportsDef {
    /// Include directories added to consumers.
    pub include_dirs: Vec<String>,
    /// Link names added to consumers.
    pub link_names: Vec<String>,
    /// Library directories added to consumers.
    pub lib_dirs: Vec<String>,
}

/// A per-configuration override layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterDef {
    /// Option keys replaced for this configuration.
    pub options: OptionOverrides,
    /// Defines merged over the base defines.
    pub defines: Vec<String>,
    /// Include directories appended after the base list.
    pub include_dirs: Vec<String>,
    /// Library directories appended after the base list.
    pub lib_dirs: Vec<String>,
}

impl FilterDef {
    /// Parses the `defines` list into a define map.
    pub fn parsed_defines(&self) -> Result<Defines, ConfigError> {
        collect_defines(&self.defines)
    }
}

fn collect_defines(raw: &[String]) -> Result<Defines, ConfigError> {
    let mut defines = Defines::new();
    for entry in raw {
        let (name, value) = parse_define(entry)?;
        defines.insert(name, value);
    }
    Ok(defines)
}

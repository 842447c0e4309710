//! What backends receive.

use std::collections::BTreeMap;
use std::path::PathBuf;

use kiln_common::StableId;
use kiln_config::TargetKind;
use kiln_graph::{ModuleInterface, ResolvedOptions};
use serde::Serialize;

/// A direct project dependency, by name and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReference {
    /// Project name.
    pub name: String,
    /// The dependency's stable identifier.
    pub identifier: StableId,
}

/// One dirty project, fully materialized.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectArtifact {
    /// Project name.
    pub name: String,
    /// Stable identifier.
    pub identifier: StableId,
    /// Artifact kind.
    pub kind: TargetKind,
    /// Deduplicated sources.
    pub sources: Vec<PathBuf>,
    /// Module-interface files.
    pub modules: Vec<ModuleInterface>,
    /// Direct dependencies that produce their own artifacts.
    pub references: Vec<ProjectReference>,
    /// Resolved options per configuration.
    pub configs: BTreeMap<String, ResolvedOptions>,
}

/// A project's line in the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateEntry {
    /// Project name.
    pub name: String,
    /// Stable identifier.
    pub identifier: StableId,
    /// Artifact kind.
    pub kind: TargetKind,
    /// Names of direct dependencies listed in the aggregate.
    pub references: Vec<String>,
}

/// The workspace-level artifact (a solution file, a top-level makefile).
#[derive(Debug, Clone, Serialize)]
pub struct AggregateArtifact {
    /// Workspace name.
    pub name: String,
    /// Configuration names.
    pub configs: Vec<String>,
    /// Language standard.
    pub language: String,
    /// C runtime flavour.
    pub runtime: String,
    /// Every generated project in registration order.
    pub projects: Vec<AggregateEntry>,
}

//! The generation pass.

use std::collections::BTreeMap;

use kiln_cache::{DirtySet, RegenerationCache, TrackedProject};
use kiln_common::StableId;
use kiln_graph::{valid_dependency, GraphError, Project, Workspace};
use tracing::{debug, info};

use crate::artifact::{AggregateArtifact, AggregateEntry, ProjectArtifact, ProjectReference};
use crate::context::{GenerationContext, GenerationMode};
use crate::error::EngineError;
use crate::generator::Generator;

/// Outcome of a generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Dirty projects, in registration order. Rendered unless dry-running.
    pub dirty: Vec<String>,
    /// Projects whose artifacts are up to date.
    pub unchanged: Vec<String>,
    /// Registered projects that never produce artifacts.
    pub skipped: Vec<String>,
    /// Whether the aggregate needed regenerating.
    pub regenerate_aggregate: bool,
    /// Whether anything was handed to the generator.
    pub rendered: bool,
    /// Whether the cache store was written.
    pub cache_written: bool,
    /// Number of stale cache entries removed.
    pub pruned: usize,
}

/// Runs one generation pass over `workspace`.
///
/// The cache store is read once and written at most once, after every
/// artifact has rendered. Any error leaves the store untouched.
pub fn run(
    ctx: &GenerationContext,
    workspace: &Workspace,
    generator: &mut dyn Generator,
) -> Result<GenerationReport, EngineError> {
    let mut cache = RegenerationCache::load_or_create(&ctx.cache_dir);
    let set = check(ctx, workspace, &mut cache);

    let mut report = GenerationReport {
        regenerate_aggregate: set.regenerate_aggregate,
        ..GenerationReport::default()
    };
    let identifiers: BTreeMap<&str, StableId> =
        set.iter().map(|(name, state)| (name, state.identifier)).collect();

    let mut artifacts = Vec::new();
    for project in workspace.projects() {
        let name = project.name().to_string();
        if !valid_dependency(project) {
            report.skipped.push(name);
        } else if set.is_dirty(project.name()) {
            artifacts.push(project_artifact(workspace, project, &identifiers)?);
            report.dirty.push(name);
        } else {
            report.unchanged.push(name);
        }
    }
    let aggregate = if set.regenerate_aggregate {
        Some(aggregate_artifact(workspace, &identifiers)?)
    } else {
        None
    };

    if ctx.is_dry_run() {
        info!(
            dirty = report.dirty.len(),
            unchanged = report.unchanged.len(),
            regenerate_aggregate = report.regenerate_aggregate,
            "dry run, nothing written"
        );
        return Ok(report);
    }

    for artifact in &artifacts {
        generator.render_project(artifact)?;
    }
    if let Some(aggregate) = &aggregate {
        generator.render_aggregate(aggregate)?;
    }
    report.rendered = !artifacts.is_empty() || aggregate.is_some();

    if ctx.prune {
        let live: Vec<&str> = workspace.projects().iter().map(|p| p.name()).collect();
        report.pruned = cache.prune(&live);
    }
    report.cache_written = if report.pruned > 0 {
        cache.save()?;
        true
    } else {
        cache.commit(&set)?
    };

    info!(
        workspace = %workspace.name(),
        rendered = report.dirty.len(),
        unchanged = report.unchanged.len(),
        aggregate = aggregate.is_some(),
        "generation complete"
    );
    Ok(report)
}

fn check(
    ctx: &GenerationContext,
    workspace: &Workspace,
    cache: &mut RegenerationCache,
) -> DirtySet {
    let tracked: Vec<TrackedProject<'_>> = workspace
        .projects()
        .iter()
        .map(|p| TrackedProject {
            name: p.name(),
            script: p.script().unwrap_or(ctx.script_root.as_path()),
        })
        .collect();

    let mut requested: Vec<String> = workspace.requested().to_vec();
    for name in &ctx.requested {
        if !requested.contains(name) {
            requested.push(name.clone());
        }
    }
    if ctx.mode == GenerationMode::Full {
        requested = workspace.projects().iter().map(|p| p.name().to_string()).collect();
    }

    let mut set = cache.compute_dirty(&tracked, &requested);
    if ctx.mode == GenerationMode::Full {
        set.regenerate_aggregate = true;
    }
    debug!(
        dirty = set.dirty_count(),
        regenerate_aggregate = set.regenerate_aggregate,
        "computed dirty set"
    );
    set
}

fn identifier_of(
    identifiers: &BTreeMap<&str, StableId>,
    owner: &Project,
    name: &str,
) -> Result<StableId, GraphError> {
    identifiers
        .get(name)
        .copied()
        .ok_or_else(|| GraphError::UnresolvedDependency {
            project: owner.name().to_string(),
            config: "*".to_string(),
            dependency: name.to_string(),
        })
}

fn references(project: &Project) -> impl Iterator<Item = &str> {
    project
        .dependencies()
        .iter()
        .filter_map(|d| d.as_project())
        .filter(|p| valid_dependency(p))
        .map(|p| p.name())
}

fn project_artifact(
    workspace: &Workspace,
    project: &Project,
    identifiers: &BTreeMap<&str, StableId>,
) -> Result<ProjectArtifact, EngineError> {
    let configs = kiln_graph::materialize(workspace, project, workspace.configs())?;
    let references = references(project)
        .map(|name| {
            Ok(ProjectReference {
                name: name.to_string(),
                identifier: identifier_of(identifiers, project, name)?,
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    Ok(ProjectArtifact {
        name: project.name().to_string(),
        identifier: identifier_of(identifiers, project, project.name())?,
        kind: project.kind(),
        sources: project.sources().to_vec(),
        modules: project.modules().to_vec(),
        references,
        configs,
    })
}

fn aggregate_artifact(
    workspace: &Workspace,
    identifiers: &BTreeMap<&str, StableId>,
) -> Result<AggregateArtifact, EngineError> {
    let mut projects = Vec::new();
    for project in workspace.projects().iter().filter(|p| valid_dependency(p)) {
        projects.push(AggregateEntry {
            name: project.name().to_string(),
            identifier: identifier_of(identifiers, project, project.name())?,
            kind: project.kind(),
            references: references(project).map(str::to_string).collect(),
        });
    }
    let settings = workspace.settings();
    Ok(AggregateArtifact {
        name: workspace.name().to_string(),
        configs: workspace.configs().to_vec(),
        language: settings.language.clone(),
        runtime: settings.runtime.clone(),
        projects,
    })
}

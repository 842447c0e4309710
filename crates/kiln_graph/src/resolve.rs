//! Dependency closure and per-configuration option materialization.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use kiln_config::{Defines, Options, TargetKind};
use serde::Serialize;
use tracing::debug;

use crate::error::GraphError;
use crate::project::{DependencyRef, Project};
use crate::workspace::Workspace;

/// The fully merged option bundle for one project and configuration.
///
/// This is what a backend renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    /// The configuration name.
    pub config: String,
    /// The project's artifact kind.
    pub kind: TargetKind,
    /// Base options with the configuration's overrides applied.
    pub options: Options,
    /// Base defines merged with the configuration's defines.
    pub defines: Defines,
    /// Own include directories, then filter's, then dependency exports.
    pub include_dirs: Vec<PathBuf>,
    /// Own library directories, then filter's, then dependency exports.
    pub lib_dirs: Vec<PathBuf>,
    /// Link names contributed by the dependency closure.
    pub depends: Vec<String>,
    /// Public module interfaces by owning library, when modules are enabled.
    pub modules: BTreeMap<String, Vec<PathBuf>>,
    /// Raw compiler flags.
    pub compile_flags: Vec<String>,
    /// Raw linker flags.
    pub link_flags: Vec<String>,
}

/// Returns `true` if a project can be linked and generated as a dependency.
///
/// Binary-only projects and header libraries never are, though their exports
/// still reach consumers.
pub fn valid_dependency(project: &Project) -> bool {
    !project.is_binary_only() && project.kind() != TargetKind::HeaderLibrary
}

/// Computes the set of dependencies contributing link inputs to `project`.
///
/// Direct dependencies are always members. A static library does not carry
/// its link requirements itself, so the closure of every static-library
/// dependency is folded in recursively. Other project dependencies are not
/// expanded. Members appear once, in first-reached order.
pub fn closure(project: &Project) -> Vec<DependencyRef> {
    let mut members = Vec::new();
    let mut seen = HashSet::new();
    let mut expanded = HashSet::new();
    expanded.insert(project.name().to_string());
    collect(project, &mut members, &mut seen, &mut expanded);
    members
}

fn collect(
    project: &Project,
    members: &mut Vec<DependencyRef>,
    seen: &mut HashSet<(bool, String)>,
    expanded: &mut HashSet<String>,
) {
    for dep in project.dependencies() {
        let key = (dep.as_project().is_some(), dep.name().to_string());
        if seen.insert(key) {
            members.push(dep.clone());
        }
        if let DependencyRef::Project(p) = dep {
            if p.kind() == TargetKind::StaticLibrary && expanded.insert(p.name().to_string()) {
                collect(p, members, seen, expanded);
            }
        }
    }
}

/// Materializes `project` for each of `configs`.
///
/// A configuration without a filter uses the project's base values. Every
/// valid project in the closure must be registered in `workspace`.
pub fn materialize(
    workspace: &Workspace,
    project: &Project,
    configs: &[String],
) -> Result<BTreeMap<String, ResolvedOptions>, GraphError> {
    let members = closure(project);
    debug!(
        project = %project.name(),
        closure = members.len(),
        "materializing"
    );

    let mut resolved = BTreeMap::new();
    for config in configs {
        let filter = project.filters().get(config);

        let options = match filter {
            Some(f) => project.options().overridden(&f.options),
            None => project.options().clone(),
        };

        let mut defines = project.defines().clone();
        let mut include_dirs = project.include_dirs().to_vec();
        let mut lib_dirs = project.lib_dirs().to_vec();
        if let Some(f) = filter {
            defines.extend(f.defines.clone());
            include_dirs.extend(f.include_dirs.iter().cloned());
            lib_dirs.extend(f.lib_dirs.iter().cloned());
        }

        let mut depends = Vec::new();
        let mut modules = BTreeMap::new();
        for member in &members {
            match member {
                DependencyRef::External(name) => depends.push(name.clone()),
                DependencyRef::Project(dep) => {
                    let exports = dep.exports();
                    include_dirs.extend(exports.include_dirs.iter().cloned());
                    depends.extend(exports.link_names.iter().cloned());
                    lib_dirs.extend(exports.lib_dirs.iter().cloned());

                    if !valid_dependency(dep) {
                        continue;
                    }
                    if !workspace.contains(dep.name()) {
                        return Err(GraphError::UnresolvedDependency {
                            project: project.name().to_string(),
                            config: config.clone(),
                            dependency: dep.name().to_string(),
                        });
                    }
                    depends.push(dep.name().to_string());
                    if workspace.settings().modules {
                        let public = dep.public_modules();
                        if !public.is_empty() {
                            modules.insert(dep.name().to_string(), public);
                        }
                    }
                }
            }
        }

        resolved.insert(
            config.clone(),
            ResolvedOptions {
                config: config.clone(),
                kind: project.kind(),
                options,
                defines,
                include_dirs,
                lib_dirs,
                depends,
                modules,
                compile_flags: project.compile_flags().to_vec(),
                link_flags: project.link_flags().to_vec(),
            },
        );
    }
    Ok(resolved)
}

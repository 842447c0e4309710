//! Builds a [`Workspace`] from a parsed `kiln.toml` definition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kiln_config::{load_definition, ConfigError, ProjectDef, WorkspaceDef, DEFINITION_FILE};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::GraphError;
use crate::host::ScriptHost;
use crate::project::{Project, ProjectRef, Visibility};
use crate::workspace::Workspace;

/// Loads a definition file (or a directory containing `kiln.toml`) and builds
/// its workspace.
pub fn load_workspace(path: &Path, host: &dyn ScriptHost) -> Result<Workspace, GraphError> {
    let file = if path.is_dir() {
        path.join(DEFINITION_FILE)
    } else {
        path.to_path_buf()
    };
    let def = load_definition(&file)?;
    build_workspace(&def, &file, host)
}

/// Builds the project graph described by `def`.
///
/// `script` is the definition file; every project records it as its hash
/// source and relative paths resolve against its directory. Projects are
/// constructed dependencies-first.
pub fn build_workspace(
    def: &WorkspaceDef,
    script: &Path,
    host: &dyn ScriptHost,
) -> Result<Workspace, GraphError> {
    let root = match script.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut packages: HashMap<&str, Workspace> = HashMap::new();
    for project in &def.projects {
        for name in &project.packages {
            if packages.contains_key(name.as_str()) {
                continue;
            }
            let package = def.packages.get(name).cloned().unwrap_or_default();
            let ws =
                host.resolve_package(name, package.url.as_deref(), package.branch.as_deref())?;
            packages.insert(name.as_str(), ws);
        }
    }

    let mut built: HashMap<&str, ProjectRef> = HashMap::new();
    for index in build_order(def)? {
        let project_def = &def.projects[index];
        let project = build_project(project_def, &root, script, &built, &packages)?;
        built.insert(project_def.name.as_str(), project);
    }

    let mut ws = Workspace::new(def.workspace.name.as_str());
    ws.set_configs(def.workspace.configs.iter().cloned());
    {
        let settings = ws.settings_mut();
        settings.output_dir = root.join(&def.workspace.output_dir);
        settings.language = def.workspace.language.clone();
        settings.runtime = def.workspace.runtime.clone();
        settings.modules = def.workspace.modules;
    }

    let requested: Vec<&str> = if def.workspace.add.is_empty() {
        def.projects.iter().map(|p| p.name.as_str()).collect()
    } else {
        def.workspace.add.iter().map(String::as_str).collect()
    };
    for name in requested {
        if let Some(project) = built.get(name) {
            ws.add([ProjectRef::clone(project)]);
        }
    }

    debug!(
        workspace = %ws.name(),
        projects = ws.projects().len(),
        packages = packages.len(),
        "built workspace"
    );
    Ok(ws)
}

/// Orders project indices so every project follows its `depends`.
fn build_order(def: &WorkspaceDef) -> Result<Vec<usize>, GraphError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = def
        .projects
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.as_str(), graph.add_node(i)))
        .collect();

    for project in &def.projects {
        let to = nodes[project.name.as_str()];
        for dep in &project.depends {
            let from = *nodes.get(dep.as_str()).ok_or_else(|| {
                GraphError::Config(ConfigError::UnknownProject {
                    project: project.name.clone(),
                    dependency: dep.clone(),
                })
            })?;
            graph.add_edge(from, to, ());
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        let index = graph[cycle.node_id()];
        GraphError::DependencyCycle(def.projects[index].name.clone())
    })?;
    Ok(sorted.into_iter().map(|n| graph[n]).collect())
}

fn build_project(
    def: &ProjectDef,
    root: &Path,
    script: &Path,
    built: &HashMap<&str, ProjectRef>,
    packages: &HashMap<&str, Workspace>,
) -> Result<ProjectRef, GraphError> {
    let rooted = |p: &String| root.join(p);

    let mut project = Project::new(def.name.as_str(), def.kind);
    project.set_script(script);
    *project.options_mut() = def.options.clone();
    project
        .add_sources(def.sources.iter().map(rooted))
        .include(def.include_dirs.iter().map(rooted))
        .libpath(def.lib_dirs.iter().map(rooted))
        .compile(def.compile.iter().cloned())
        .link(def.link.iter().cloned());

    for module in &def.modules {
        let visibility = if module.public {
            Visibility::Public
        } else {
            Visibility::Private
        };
        project.add_module(rooted(&module.path), visibility);
    }
    for (name, value) in def.parsed_defines()? {
        project.define(&name, value.as_deref());
    }

    let exports = project.exports_mut();
    exports
        .include_dirs
        .extend(def.exports.include_dirs.iter().map(rooted));
    exports.link_names.extend(def.exports.link_names.iter().cloned());
    exports.lib_dirs.extend(def.exports.lib_dirs.iter().map(rooted));

    for dep in &def.depends {
        let target = built
            .get(dep.as_str())
            .ok_or_else(|| GraphError::UnknownProject(dep.clone()))?;
        project.depend(target);
    }
    for name in &def.packages {
        if let Some(ws) = packages.get(name.as_str()) {
            project.depend(ws);
        }
    }
    for link in &def.links {
        project.depend(link.as_str());
    }

    for (config, filter_def) in &def.filters {
        let defines = filter_def.parsed_defines()?;
        let filter = project.filter(config);
        filter.options = filter_def.options.clone();
        for (name, value) in defines {
            filter.define(&name, value.as_deref());
        }
        filter
            .include(filter_def.include_dirs.iter().map(rooted))
            .libpath(filter_def.lib_dirs.iter().map(rooted));
    }

    Ok(project.into_ref())
}

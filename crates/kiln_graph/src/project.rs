//! Projects, their per-configuration filters, and dependency edges.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kiln_config::{DefineValue, Defines, OptionOverrides, OptionValue, Options, TargetKind};
use serde::Serialize;

use crate::error::GraphError;
use crate::workspace::Workspace;

/// A shared, no longer mutable project.
///
/// Projects are built with `&mut` methods and then frozen into a `ProjectRef`
/// before other projects depend on them or a workspace registers them.
pub type ProjectRef = Rc<Project>;

/// Whether a module interface is importable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Exported to every project that links this one.
    Public,
    /// Used only when building this project.
    Private,
}

/// A module-interface file owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInterface {
    /// Path to the interface file.
    pub path: PathBuf,
    /// Visibility to consumers.
    pub visibility: Visibility,
}

/// Prebuilt inputs a project hands to every direct consumer.
///
/// Mostly used by binary-only and header-only projects, but any project may
/// export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exports {
    /// Include directories.
    pub include_dirs: Vec<PathBuf>,
    /// Link names (library base names).
    pub link_names: Vec<String>,
    /// Library search directories.
    pub lib_dirs: Vec<PathBuf>,
}

/// A dependency as written by a definition source.
///
/// `Workspace` expands to the libraries of another workspace (typically a
/// resolved package) and is flattened when the edge is added.
#[derive(Debug, Clone)]
pub enum Dependency {
    /// Another project.
    Project(ProjectRef),
    /// An opaque name handed to the linker verbatim.
    External(String),
    /// Every shared and static library of a workspace.
    Workspace(Vec<ProjectRef>),
}

impl From<ProjectRef> for Dependency {
    fn from(p: ProjectRef) -> Self {
        Dependency::Project(p)
    }
}

impl From<&ProjectRef> for Dependency {
    fn from(p: &ProjectRef) -> Self {
        Dependency::Project(Rc::clone(p))
    }
}

impl From<&str> for Dependency {
    fn from(name: &str) -> Self {
        Dependency::External(name.to_string())
    }
}

impl From<String> for Dependency {
    fn from(name: String) -> Self {
        Dependency::External(name)
    }
}

impl From<&Workspace> for Dependency {
    fn from(ws: &Workspace) -> Self {
        Dependency::Workspace(ws.libraries())
    }
}

/// A stored dependency edge.
#[derive(Debug, Clone)]
pub enum DependencyRef {
    /// Another project.
    Project(ProjectRef),
    /// An opaque external link name.
    External(String),
}

impl DependencyRef {
    /// The project name or external link name.
    pub fn name(&self) -> &str {
        match self {
            DependencyRef::Project(p) => p.name(),
            DependencyRef::External(n) => n,
        }
    }

    /// Returns the project if this edge points at one.
    pub fn as_project(&self) -> Option<&ProjectRef> {
        match self {
            DependencyRef::Project(p) => Some(p),
            DependencyRef::External(_) => None,
        }
    }
}

// Edges compare by identity in the graph: kind plus name.
impl PartialEq for DependencyRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DependencyRef::Project(a), DependencyRef::Project(b)) => a.name() == b.name(),
            (DependencyRef::External(a), DependencyRef::External(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DependencyRef {}

/// A per-configuration override layer, owned by one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    owner: String,
    config: String,
    /// Option keys replaced for this configuration.
    pub options: OptionOverrides,
    /// Defines merged over the owner's defines; these win on collision.
    pub defines: Defines,
    /// Include directories appended after the owner's list.
    pub include_dirs: Vec<PathBuf>,
    /// Library directories appended after the owner's list.
    pub lib_dirs: Vec<PathBuf>,
}

impl Filter {
    fn new(owner: &str, config: &str) -> Self {
        Self {
            owner: owner.to_string(),
            config: config.to_string(),
            options: OptionOverrides::default(),
            defines: Defines::new(),
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
        }
    }

    /// Name of the owning project.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The configuration this filter applies to.
    pub fn config(&self) -> &str {
        &self.config
    }

    /// Overrides an option for this configuration.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<&mut Self, GraphError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    /// Adds or replaces a define for this configuration.
    pub fn define(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        self.defines
            .insert(name.to_string(), value.map(DefineValue::from));
        self
    }

    /// Appends include directories for this configuration.
    pub fn include<I, P>(&mut self, dirs: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Appends library directories for this configuration.
    pub fn libpath<I, P>(&mut self, dirs: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.lib_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }
}

/// A buildable or export-only unit.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    kind: TargetKind,
    sources: Vec<PathBuf>,
    modules: Vec<ModuleInterface>,
    options: Options,
    defines: Defines,
    include_dirs: Vec<PathBuf>,
    lib_dirs: Vec<PathBuf>,
    compile_flags: Vec<String>,
    link_flags: Vec<String>,
    dependencies: Vec<DependencyRef>,
    exports: Exports,
    filters: BTreeMap<String, Filter>,
    script: Option<PathBuf>,
}

impl Project {
    /// Creates an empty project with default options.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sources: Vec::new(),
            modules: Vec::new(),
            options: Options::default(),
            defines: Defines::new(),
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            compile_flags: Vec::new(),
            link_flags: Vec::new(),
            dependencies: Vec::new(),
            exports: Exports::default(),
            filters: BTreeMap::new(),
            script: None,
        }
    }

    /// Freezes the project for sharing.
    pub fn into_ref(self) -> ProjectRef {
        Rc::new(self)
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The artifact kind.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Source files, deduplicated, in first-insertion order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Module-interface files.
    pub fn modules(&self) -> &[ModuleInterface] {
        &self.modules
    }

    /// Module-interface files consumers may import.
    pub fn public_modules(&self) -> Vec<PathBuf> {
        self.modules
            .iter()
            .filter(|m| m.visibility == Visibility::Public)
            .map(|m| m.path.clone())
            .collect()
    }

    /// Base options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable access to the base options.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Reads an option by key.
    ///
    /// Well-known keys always have a value; extension keys must have been set.
    pub fn option(&self, key: &str) -> Result<OptionValue, GraphError> {
        self.options.get(key).ok_or_else(|| GraphError::UnknownOption {
            project: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Sets an option by key.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<&mut Self, GraphError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    /// Returns `true` if the project only exports prebuilt inputs.
    pub fn is_binary_only(&self) -> bool {
        self.options.binary_only
    }

    /// Base defines.
    pub fn defines(&self) -> &Defines {
        &self.defines
    }

    /// Base include directories.
    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// Base library directories.
    pub fn lib_dirs(&self) -> &[PathBuf] {
        &self.lib_dirs
    }

    /// Raw compiler flags.
    pub fn compile_flags(&self) -> &[String] {
        &self.compile_flags
    }

    /// Raw linker flags.
    pub fn link_flags(&self) -> &[String] {
        &self.link_flags
    }

    /// Direct dependency edges in insertion order.
    pub fn dependencies(&self) -> &[DependencyRef] {
        &self.dependencies
    }

    /// Inputs exported to consumers.
    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    /// Mutable access to the exported inputs.
    pub fn exports_mut(&mut self) -> &mut Exports {
        &mut self.exports
    }

    /// Per-configuration filters.
    pub fn filters(&self) -> &BTreeMap<String, Filter> {
        &self.filters
    }

    /// The build script that defined this project, used as the cache hash input.
    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Records the defining build script.
    pub fn set_script(&mut self, script: impl Into<PathBuf>) -> &mut Self {
        self.script = Some(script.into());
        self
    }

    /// Adds source files, skipping any already present.
    pub fn add_sources<I, P>(&mut self, files: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for file in files {
            let file = file.into();
            if !self.sources.contains(&file) {
                self.sources.push(file);
            }
        }
        self
    }

    /// Drops repeated source entries, keeping first occurrences.
    ///
    /// Idempotent; [`Project::add_sources`] already maintains this.
    pub fn dedup_sources(&mut self) -> &mut Self {
        let files = std::mem::take(&mut self.sources);
        self.add_sources(files)
    }

    /// Adds a module-interface file.
    pub fn add_module(&mut self, path: impl Into<PathBuf>, visibility: Visibility) -> &mut Self {
        self.modules.push(ModuleInterface {
            path: path.into(),
            visibility,
        });
        self
    }

    /// Adds or replaces a define.
    pub fn define(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        self.defines
            .insert(name.to_string(), value.map(DefineValue::from));
        self
    }

    /// Removes a define.
    pub fn undefine(&mut self, name: &str) -> &mut Self {
        self.defines.remove(name);
        self
    }

    /// Appends include directories.
    pub fn include<I, P>(&mut self, dirs: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Appends library directories.
    pub fn libpath<I, P>(&mut self, dirs: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.lib_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Appends raw compiler flags.
    pub fn compile<I, S>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compile_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Appends raw linker flags.
    pub fn link<I, S>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Adds a dependency edge. Workspace expansions are flattened here.
    pub fn depend(&mut self, dependency: impl Into<Dependency>) -> &mut Self {
        match dependency.into() {
            Dependency::Project(p) => self.dependencies.push(DependencyRef::Project(p)),
            Dependency::External(name) => self.dependencies.push(DependencyRef::External(name)),
            Dependency::Workspace(libs) => self
                .dependencies
                .extend(libs.into_iter().map(DependencyRef::Project)),
        }
        self
    }

    /// Returns the filter for `config`, creating an empty one if needed.
    pub fn filter(&mut self, config: &str) -> &mut Filter {
        let owner = self.name.clone();
        self.filters
            .entry(config.to_string())
            .or_insert_with(|| Filter::new(&owner, config))
    }
}

//! Workspaces: named, ordered collections of registered projects.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use crate::error::GraphError;
use crate::project::ProjectRef;
use crate::resolve::{self, valid_dependency, ResolvedOptions};

/// Backend-facing workspace settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// Directory backends write artifacts into.
    pub output_dir: PathBuf,
    /// Language standard (e.g. "cpp17").
    pub language: String,
    /// C runtime flavour (e.g. "mt").
    pub runtime: String,
    /// Whether resolved options carry module-interface maps.
    pub modules: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("bin"),
            language: "cpp17".to_string(),
            runtime: "mt".to_string(),
            modules: false,
        }
    }
}

/// A named collection of projects plus its configuration names.
///
/// The project map only grows. The first project registered under a name
/// wins; later registrations of that name are ignored.
#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,
    configs: Vec<String>,
    settings: WorkspaceSettings,
    projects: Vec<ProjectRef>,
    index: HashMap<String, usize>,
    requested: Vec<String>,
}

impl Workspace {
    /// Creates an empty workspace with the `debug` and `release` configurations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configs: vec!["debug".to_string(), "release".to_string()],
            settings: WorkspaceSettings::default(),
            projects: Vec::new(),
            index: HashMap::new(),
            requested: Vec::new(),
        }
    }

    /// The workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered configuration names.
    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    /// Replaces the configuration names.
    pub fn set_configs<I, S>(&mut self, configs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configs = configs.into_iter().map(Into::into).collect();
        self
    }

    /// Backend settings.
    pub fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    /// Mutable backend settings.
    pub fn settings_mut(&mut self) -> &mut WorkspaceSettings {
        &mut self.settings
    }

    /// Registered projects in registration order.
    pub fn projects(&self) -> &[ProjectRef] {
        &self.projects
    }

    /// Names passed directly to [`Workspace::add`], in first-request order.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Looks up a registered project.
    pub fn get(&self, name: &str) -> Option<&ProjectRef> {
        self.index.get(name).map(|&i| &self.projects[i])
    }

    /// Returns `true` if a project with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered shared and static libraries, in registration order.
    pub fn libraries(&self) -> Vec<ProjectRef> {
        self.projects
            .iter()
            .filter(|p| p.kind().is_library())
            .cloned()
            .collect()
    }

    /// Requests projects explicitly and registers them with their buildable
    /// dependencies.
    ///
    /// Every given project is marked as explicitly requested, then registered
    /// along with each direct project dependency that is a valid dependency,
    /// recursively. Names already registered are skipped, even if the new
    /// definition differs.
    pub fn add<I>(&mut self, projects: I) -> &mut Self
    where
        I: IntoIterator<Item = ProjectRef>,
    {
        for project in projects {
            if !self.requested.iter().any(|n| n == project.name()) {
                self.requested.push(project.name().to_string());
            }
            self.register(&project);
        }
        self
    }

    fn register(&mut self, project: &ProjectRef) {
        if let Some(existing) = self.get(project.name()) {
            if !Rc::ptr_eq(existing, project) {
                debug!(
                    workspace = %self.name,
                    project = %project.name(),
                    "ignoring redefinition of registered project"
                );
            }
            return;
        }
        self.index
            .insert(project.name().to_string(), self.projects.len());
        self.projects.push(Rc::clone(project));

        for dep in project.dependencies() {
            if let Some(p) = dep.as_project() {
                if valid_dependency(p) {
                    self.register(p);
                }
            }
        }
    }

    /// Materializes a registered project for the given configurations.
    pub fn materialize(
        &self,
        name: &str,
        configs: &[String],
    ) -> Result<BTreeMap<String, ResolvedOptions>, GraphError> {
        let project = self
            .get(name)
            .ok_or_else(|| GraphError::UnknownProject(name.to_string()))?;
        resolve::materialize(self, project, configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use kiln_config::TargetKind;

    fn names(ws: &Workspace) -> Vec<&str> {
        ws.projects().iter().map(|p| p.name()).collect()
    }

    #[test]
    fn default_configs() {
        let ws = Workspace::new("w");
        assert_eq!(ws.configs(), &["debug".to_string(), "release".to_string()]);
    }

    #[test]
    fn add_registers_valid_dependencies_recursively() {
        let c = Project::new("c", TargetKind::StaticLibrary).into_ref();
        let mut b = Project::new("b", TargetKind::StaticLibrary);
        b.depend(&c);
        let b = b.into_ref();
        let mut a = Project::new("a", TargetKind::Executable);
        a.depend(&b).depend("z");
        let a = a.into_ref();

        let mut ws = Workspace::new("w");
        ws.add([a]);
        assert_eq!(names(&ws), vec!["a", "b", "c"]);
        assert_eq!(ws.requested(), &["a".to_string()]);
    }

    #[test]
    fn add_skips_binary_only_and_header_dependencies() {
        let mut sdk = Project::new("sdk", TargetKind::SharedLibrary);
        sdk.set("binary_only", true).unwrap();
        let sdk = sdk.into_ref();
        let headers = Project::new("hdr", TargetKind::HeaderLibrary).into_ref();
        let mut app = Project::new("app", TargetKind::Executable);
        app.depend(&sdk).depend(&headers);

        let mut ws = Workspace::new("w");
        ws.add([app.into_ref()]);
        assert_eq!(names(&ws), vec!["app"]);
    }

    #[test]
    fn explicitly_added_binary_only_project_is_registered() {
        let mut sdk = Project::new("vulkan", TargetKind::SharedLibrary);
        sdk.set("binary_only", true).unwrap();
        let mut ws = Workspace::new("vulkan");
        ws.add([sdk.into_ref()]);
        assert!(ws.contains("vulkan"));
    }

    #[test]
    fn first_registration_wins() {
        let first = Project::new("core", TargetKind::StaticLibrary).into_ref();
        let second = Project::new("core", TargetKind::SharedLibrary).into_ref();
        let mut ws = Workspace::new("w");
        ws.add([Rc::clone(&first)]);
        ws.add([second]);
        assert_eq!(ws.projects().len(), 1);
        assert_eq!(ws.get("core").unwrap().kind(), TargetKind::StaticLibrary);
        assert!(Rc::ptr_eq(ws.get("core").unwrap(), &first));
    }

    #[test]
    fn re_adding_keeps_single_request_entry() {
        let p = Project::new("app", TargetKind::Executable).into_ref();
        let mut ws = Workspace::new("w");
        ws.add([Rc::clone(&p)]);
        ws.add([p]);
        assert_eq!(ws.requested().len(), 1);
    }

    #[test]
    fn dependency_registered_before_request_is_marked_requested() {
        let lib = Project::new("lib", TargetKind::StaticLibrary).into_ref();
        let mut app = Project::new("app", TargetKind::Executable);
        app.depend(&lib);
        let mut ws = Workspace::new("w");
        ws.add([app.into_ref()]);
        assert_eq!(ws.requested(), &["app".to_string()]);
        ws.add([lib]);
        assert_eq!(ws.requested(), &["app".to_string(), "lib".to_string()]);
        assert_eq!(ws.projects().len(), 2);
    }

    #[test]
    fn libraries_lists_shared_and_static() {
        let mut ws = Workspace::new("w");
        ws.add([
            Project::new("exe", TargetKind::Executable).into_ref(),
            Project::new("dll", TargetKind::SharedLibrary).into_ref(),
            Project::new("hdr", TargetKind::HeaderLibrary).into_ref(),
            Project::new("lib", TargetKind::StaticLibrary).into_ref(),
        ]);
        let libs: Vec<_> = ws.libraries().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(libs, vec!["dll", "lib"]);
    }

    #[test]
    fn materialize_unknown_project_errors() {
        let ws = Workspace::new("w");
        let err = ws.materialize("ghost", &["debug".to_string()]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownProject(_)));
    }
}

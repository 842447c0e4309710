//! The embedding host seam: script roots and package resolution.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use kiln_config::DEFINITION_FILE;
use tracing::debug;

use crate::definition::load_workspace;
use crate::error::GraphError;
use crate::workspace::Workspace;

/// Services a definition source needs from whatever is hosting it.
pub trait ScriptHost {
    /// Root of the script currently being evaluated.
    ///
    /// Only used as a cache-hash input for projects with no script of their own.
    fn current_script_root(&self) -> PathBuf;

    /// Resolves a named package to its evaluated workspace.
    fn resolve_package(
        &self,
        name: &str,
        url: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Workspace, GraphError>;
}

/// A host backed by local package checkouts.
///
/// Package `name` lives at `<packages_dir>/<name>/kiln.toml`. Nothing is
/// fetched: a package without a local checkout is unavailable.
#[derive(Debug)]
pub struct LocalHost {
    root: PathBuf,
    packages_dir: PathBuf,
    loading: RefCell<Vec<String>>,
}

impl LocalHost {
    /// Creates a host rooted at `root`, with packages under `root/lib`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let packages_dir = root.join("lib");
        Self {
            root,
            packages_dir,
            loading: RefCell::new(Vec::new()),
        }
    }

    /// Overrides the package checkout directory.
    pub fn with_packages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.packages_dir = dir.into();
        self
    }

    /// Directory package checkouts are looked up in.
    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }
}

impl ScriptHost for LocalHost {
    fn current_script_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn resolve_package(
        &self,
        name: &str,
        url: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Workspace, GraphError> {
        let definition = self.packages_dir.join(name).join(DEFINITION_FILE);
        if !definition.is_file() {
            let reason = match url {
                Some(url) => format!(
                    "no local checkout at {} (remote {url}{} is not fetched)",
                    self.packages_dir.join(name).display(),
                    branch.map(|b| format!(" @ {b}")).unwrap_or_default()
                ),
                None => format!("no definition at {}", definition.display()),
            };
            return Err(GraphError::PackageUnavailable {
                name: name.to_string(),
                reason,
            });
        }

        if self.loading.borrow().iter().any(|n| n == name) {
            return Err(GraphError::PackageUnavailable {
                name: name.to_string(),
                reason: "package depends on itself".to_string(),
            });
        }

        debug!(package = %name, path = %definition.display(), "loading package");
        self.loading.borrow_mut().push(name.to_string());
        let result = load_workspace(&definition, self);
        self.loading.borrow_mut().pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_package(root: &Path, name: &str, body: &str) {
        let dir = root.join("lib").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(DEFINITION_FILE), body).unwrap();
    }

    #[test]
    fn script_root_is_host_root() {
        let host = LocalHost::new("/work/game");
        assert_eq!(host.current_script_root(), PathBuf::from("/work/game"));
        assert_eq!(host.packages_dir(), Path::new("/work/game/lib"));
    }

    #[test]
    fn missing_local_package_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path());
        let err = host.resolve_package("vulkan", None, None).unwrap_err();
        assert!(matches!(err, GraphError::PackageUnavailable { ref name, .. } if name == "vulkan"));
    }

    #[test]
    fn remote_package_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path());
        let err = host
            .resolve_package("premake", Some("https://example.com/premake.git"), Some("4.x"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/premake.git @ 4.x"));
        assert!(msg.contains("not fetched"));
    }

    #[test]
    fn resolves_local_package() {
        let dir = tempfile::tempdir().unwrap();
        write_package(
            dir.path(),
            "fmt",
            r#"
[workspace]
name = "fmt"

[[project]]
name = "fmt"
kind = "static-library"
sources = ["format.cc"]
"#,
        );
        let host = LocalHost::new(dir.path());
        let ws = host.resolve_package("fmt", None, None).unwrap();
        assert_eq!(ws.name(), "fmt");
        assert_eq!(ws.libraries().len(), 1);
        assert!(host.loading.borrow().is_empty());
    }

    #[test]
    fn self_referencing_package_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_package(
            dir.path(),
            "loop",
            r#"
[workspace]
name = "loop"

[packages.loop]

[[project]]
name = "a"
kind = "static-library"
packages = ["loop"]
"#,
        );
        let host = LocalHost::new(dir.path());
        let err = host.resolve_package("loop", None, None).unwrap_err();
        assert!(err.to_string().contains("depends on itself"));
    }
}

//! Shared helpers for locating and loading the workspace definition.

use std::path::{Path, PathBuf};

use kiln_config::DEFINITION_FILE;
use kiln_engine::GenerationContext;
use kiln_graph::{load_workspace, LocalHost, ScriptHost, Workspace};
use tracing::debug;

use crate::GlobalArgs;

/// A loaded workspace and where it came from.
pub struct Loaded {
    /// The built project graph.
    pub workspace: Workspace,
    /// Hash input for projects defined without a script.
    pub script_root: PathBuf,
}

impl Loaded {
    /// A generation context rooted at the definition, caching under the output dir.
    pub fn context(&self) -> GenerationContext {
        GenerationContext::for_output(&self.script_root, &self.workspace.settings().output_dir)
    }
}

/// Walks up from `start` looking for the nearest `kiln.toml`.
pub fn find_definition(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(DEFINITION_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {DEFINITION_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the definition file from global CLI args.
///
/// `--file` may name the file or its directory. Otherwise walks up from the
/// current directory.
pub fn resolve_definition(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.file {
        Some(ref path) if path.is_dir() => Ok(path.join(DEFINITION_FILE)),
        Some(ref path) => Ok(path.clone()),
        None => find_definition(&std::env::current_dir()?),
    }
}

/// Loads the workspace named by the global args.
pub fn load(global: &GlobalArgs) -> Result<Loaded, Box<dyn std::error::Error>> {
    let definition = resolve_definition(global)?;
    let root = match definition.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let host = LocalHost::new(&root);
    let workspace = load_workspace(&definition, &host)?;
    debug!(
        definition = %definition.display(),
        projects = workspace.projects().len(),
        "loaded workspace"
    );
    let script_root = host.current_script_root();
    Ok(Loaded {
        workspace,
        script_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global(file: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            file,
        }
    }

    #[test]
    fn find_definition_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(DEFINITION_FILE), "[workspace]\nname = \"w\"\n").unwrap();
        let found = find_definition(tmp.path()).unwrap();
        assert_eq!(found, tmp.path().join(DEFINITION_FILE));
    }

    #[test]
    fn find_definition_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(DEFINITION_FILE), "[workspace]\nname = \"w\"\n").unwrap();
        let sub = tmp.path().join("src").join("engine");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(
            find_definition(&sub).unwrap(),
            tmp.path().join(DEFINITION_FILE)
        );
    }

    #[test]
    fn find_definition_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_definition(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find kiln.toml"));
    }

    #[test]
    fn resolve_definition_from_directory_flag() {
        let tmp = TempDir::new().unwrap();
        let resolved = resolve_definition(&global(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(resolved, tmp.path().join(DEFINITION_FILE));
    }

    #[test]
    fn load_builds_workspace_and_context() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DEFINITION_FILE),
            "[workspace]\nname = \"w\"\noutput_dir = \"out\"\n\n[[project]]\nname = \"a\"\nkind = \"executable\"\n",
        )
        .unwrap();
        let loaded = load(&global(Some(tmp.path().join(DEFINITION_FILE)))).unwrap();
        assert_eq!(loaded.script_root, tmp.path());
        assert!(loaded.workspace.contains("a"));
        let ctx = loaded.context();
        assert_eq!(ctx.cache_dir, tmp.path().join("out").join(".kiln"));
        assert_eq!(ctx.script_root, tmp.path());
    }
}

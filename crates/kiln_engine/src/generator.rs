//! Backend seam and the built-in JSON backend.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::artifact::{AggregateArtifact, ProjectArtifact};
use crate::error::EngineError;

/// A renderer for one output format.
pub trait Generator {
    /// Renders one dirty project.
    fn render_project(&mut self, artifact: &ProjectArtifact) -> Result<(), EngineError>;

    /// Renders the workspace aggregate.
    fn render_aggregate(&mut self, artifact: &AggregateArtifact) -> Result<(), EngineError>;
}

/// Writes artifacts as pretty JSON: `<project>.json` per project and
/// `<workspace>.workspace.json` for the aggregate.
#[derive(Debug, Clone)]
pub struct JsonGenerator {
    output_dir: PathBuf,
}

impl JsonGenerator {
    /// Creates a generator writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory artifacts are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write<T: Serialize>(
        &self,
        name: &str,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, EngineError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| EngineError::Write {
            path: self.output_dir.clone(),
            source: e,
        })?;
        let json = serde_json::to_string_pretty(value).map_err(|e| EngineError::Serialization {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, json).map_err(|e| EngineError::Write {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "wrote artifact");
        Ok(path)
    }
}

/// Rejects names that would escape the output directory as a file stem.
fn check_file_stem(name: &str) -> Result<(), EngineError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name is a relative directory"
    } else if name.contains(['/', '\\']) {
        "contains a path separator"
    } else {
        return Ok(());
    };
    Err(EngineError::ArtifactName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

impl Generator for JsonGenerator {
    fn render_project(&mut self, artifact: &ProjectArtifact) -> Result<(), EngineError> {
        check_file_stem(&artifact.name)?;
        let file_name = format!("{}.json", artifact.name);
        self.write(&artifact.name, &file_name, artifact).map(|_| ())
    }

    fn render_aggregate(&mut self, artifact: &AggregateArtifact) -> Result<(), EngineError> {
        check_file_stem(&artifact.name)?;
        let stem = format!("{}.workspace", artifact.name);
        if let Some(clash) = artifact.projects.iter().find(|p| p.name == stem) {
            return Err(EngineError::ArtifactName {
                name: clash.name.clone(),
                reason: "collides with the workspace aggregate".to_string(),
            });
        }
        let file_name = format!("{stem}.json");
        self.write(&artifact.name, &file_name, artifact).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::AggregateEntry;
    use kiln_common::StableId;
    use kiln_config::TargetKind;
    use std::collections::BTreeMap;

    #[test]
    fn writes_project_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonGenerator::new(dir.path().join("bin"));
        let id = StableId::generate();
        let artifact = ProjectArtifact {
            name: "app".to_string(),
            identifier: id,
            kind: TargetKind::Executable,
            sources: vec![PathBuf::from("main.cpp")],
            modules: Vec::new(),
            references: Vec::new(),
            configs: BTreeMap::new(),
        };
        backend.render_project(&artifact).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("bin/app.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["identifier"].as_str(), Some(id.to_string().as_str()));
        assert_eq!(value["kind"].as_str(), Some("executable"));
    }

    #[test]
    fn writes_aggregate_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonGenerator::new(dir.path());
        let artifact = AggregateArtifact {
            name: "game".to_string(),
            configs: vec!["debug".to_string()],
            language: "cpp17".to_string(),
            runtime: "mt".to_string(),
            projects: vec![AggregateEntry {
                name: "lib".to_string(),
                identifier: StableId::generate(),
                kind: TargetKind::StaticLibrary,
                references: Vec::new(),
            }],
        };
        backend.render_aggregate(&artifact).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("game.workspace.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["projects"][0]["kind"].as_str(), Some("static-library"));
    }

    fn project(name: &str) -> ProjectArtifact {
        ProjectArtifact {
            name: name.to_string(),
            identifier: StableId::generate(),
            kind: TargetKind::Executable,
            sources: Vec::new(),
            modules: Vec::new(),
            references: Vec::new(),
            configs: BTreeMap::new(),
        }
    }

    #[test]
    fn rejects_names_escaping_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonGenerator::new(dir.path().join("bin"));
        for name in ["../escape", "nested/app", "..", ""] {
            let err = backend.render_project(&project(name)).unwrap_err();
            assert!(matches!(err, EngineError::ArtifactName { .. }), "{name}");
        }
        assert!(!dir.path().join("escape.json").exists());
        assert!(!dir.path().join("bin").exists());
    }

    #[test]
    fn rejects_project_named_like_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonGenerator::new(dir.path());
        let artifact = AggregateArtifact {
            name: "game".to_string(),
            configs: Vec::new(),
            language: "cpp17".to_string(),
            runtime: "mt".to_string(),
            projects: vec![AggregateEntry {
                name: "game.workspace".to_string(),
                identifier: StableId::generate(),
                kind: TargetKind::Executable,
                references: Vec::new(),
            }],
        };
        let err = backend.render_aggregate(&artifact).unwrap_err();
        assert!(err.to_string().contains("collides with the workspace aggregate"));
        assert!(!dir.path().join("game.workspace.json").exists());
    }

    #[test]
    fn unwritable_output_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("bin");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let mut backend = JsonGenerator::new(blocker.clone());
        let artifact = AggregateArtifact {
            name: "w".to_string(),
            configs: Vec::new(),
            language: "cpp17".to_string(),
            runtime: "mt".to_string(),
            projects: Vec::new(),
        };
        let err = backend.render_aggregate(&artifact).unwrap_err();
        assert!(matches!(err, EngineError::Write { .. }));
    }
}

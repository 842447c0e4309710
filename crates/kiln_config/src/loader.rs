//! Definition file loading and validation.

use crate::definition::{WorkspaceDef, DEFINITION_FILE};
use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

/// Loads and validates a workspace definition.
///
/// `path` may name the definition file itself or a directory containing
/// `kiln.toml`.
pub fn load_definition(path: &Path) -> Result<WorkspaceDef, ConfigError> {
    let file = if path.is_dir() {
        path.join(DEFINITION_FILE)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&file)?;
    load_definition_from_str(&content)
}

/// Parses and validates a workspace definition from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_definition_from_str(content: &str) -> Result<WorkspaceDef, ConfigError> {
    let def: WorkspaceDef =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_definition(&def)?;
    Ok(def)
}

/// Validates names, references, and defines.
fn validate_definition(def: &WorkspaceDef) -> Result<(), ConfigError> {
    if def.workspace.name.is_empty() {
        return Err(ConfigError::MissingField("workspace.name".to_string()));
    }
    if def.workspace.configs.is_empty() {
        return Err(ConfigError::MissingField("workspace.configs".to_string()));
    }

    let mut names = HashSet::new();
    for project in &def.projects {
        if project.name.is_empty() {
            return Err(ConfigError::MissingField("project.name".to_string()));
        }
        if !names.insert(project.name.as_str()) {
            return Err(ConfigError::DuplicateProject(project.name.clone()));
        }
        check_project_name(&project.name, &def.workspace.name)?;
    }

    for project in &def.projects {
        for dep in &project.depends {
            if !names.contains(dep.as_str()) {
                return Err(ConfigError::UnknownProject {
                    project: project.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        for package in &project.packages {
            if !def.packages.contains_key(package) {
                return Err(ConfigError::ValidationError(format!(
                    "project '{}' uses undeclared package '{package}'",
                    project.name
                )));
            }
        }
        project.parsed_defines()?;
        for (config, filter) in &project.filters {
            if !def.workspace.configs.contains(config) {
                return Err(ConfigError::ValidationError(format!(
                    "project '{}' filters unknown configuration '{config}'",
                    project.name
                )));
            }
            filter.parsed_defines()?;
        }
    }

    for requested in &def.workspace.add {
        if !names.contains(requested.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "workspace adds unknown project '{requested}'"
            )));
        }
    }
    Ok(())
}

/// Project names become artifact file stems next to the workspace aggregate.
fn check_project_name(name: &str, workspace: &str) -> Result<(), ConfigError> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "project name '{name}' is not a valid file name"
        )));
    }
    if name == format!("{workspace}.workspace") {
        return Err(ConfigError::ValidationError(format!(
            "project name '{name}' collides with the workspace aggregate"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_definition() {
        let toml = r#"
[workspace]
name = "hello"
"#;
        let def = load_definition_from_str(toml).unwrap();
        assert_eq!(def.workspace.name, "hello");
    }

    #[test]
    fn parse_full_definition() {
        let toml = r#"
[workspace]
name = "hello"
configs = ["debug", "release", "profile"]
output_dir = "build"
add = ["app"]

[[project]]
name = "library"
kind = "shared-library"
sources = ["src/lib.cpp", "src/lib.h"]
compile = ["/experimental:c11atomics"]
link = ["/export"]
filters.debug = { options = { debug = true, optimization = false }, defines = ["Debug=1"] }

[[project]]
name = "app"
kind = "executable"
sources = ["src/main.cpp"]
depends = ["library"]
links = ["pthread"]
"#;
        let def = load_definition_from_str(toml).unwrap();
        assert_eq!(def.workspace.configs.len(), 3);
        assert_eq!(def.workspace.output_dir, "build");
        assert_eq!(def.projects.len(), 2);
        assert_eq!(def.projects[0].compile, vec!["/experimental:c11atomics"]);
        assert_eq!(def.projects[1].depends, vec!["library"]);
        assert_eq!(def.projects[1].links, vec!["pthread"]);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[workspace]
name = ""
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn empty_configs_error() {
        let toml = r#"
[workspace]
name = "w"
configs = []
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn duplicate_project_errors() {
        let toml = r#"
[workspace]
name = "w"

[[project]]
name = "a"
kind = "executable"

[[project]]
name = "a"
kind = "static-library"
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProject(ref n) if n == "a"));
    }

    #[test]
    fn unknown_dependency_errors() {
        let toml = r#"
[workspace]
name = "w"

[[project]]
name = "app"
kind = "executable"
depends = ["ghost"]
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProject { .. }));
    }

    #[test]
    fn undeclared_package_errors() {
        let toml = r#"
[workspace]
name = "w"

[[project]]
name = "app"
kind = "executable"
packages = ["vulkan"]
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn filter_for_unknown_config_errors() {
        let toml = r#"
[workspace]
name = "w"

[[project]]
name = "app"
kind = "executable"
filters.profile = { options = { debug = true } }
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_define_errors() {
        let toml = r#"
[workspace]
name = "w"

[[project]]
name = "app"
kind = "executable"
defines = ["=oops"]
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_add_errors() {
        let toml = r#"
[workspace]
name = "w"
add = ["nope"]
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn path_like_project_name_errors() {
        for name in ["../escape", "tools/gen", ".."] {
            let toml = format!(
                "[workspace]\nname = \"w\"\n\n[[project]]\nname = \"{name}\"\nkind = \"executable\"\n"
            );
            let err = load_definition_from_str(&toml).unwrap_err();
            assert!(err.to_string().contains("is not a valid file name"), "{name}");
        }
    }

    #[test]
    fn project_named_like_aggregate_errors() {
        let toml = r#"
[workspace]
name = "game"

[[project]]
name = "game.workspace"
kind = "executable"
"#;
        let err = load_definition_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("collides with the workspace aggregate"));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_definition_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFINITION_FILE),
            "[workspace]\nname = \"ondisk\"\n",
        )
        .unwrap();
        let def = load_definition(dir.path()).unwrap();
        assert_eq!(def.workspace.name, "ondisk");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_definition(Path::new("/nonexistent/dir/kiln.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

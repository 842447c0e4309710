//! Error types for option handling and definition-file loading.

/// Errors that can occur when loading a `kiln.toml` definition or setting options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the definition file.
    #[error("failed to read definition: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse definition: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Two projects in one definition file share a name.
    #[error("project '{0}' is defined more than once")]
    DuplicateProject(String),

    /// A project names a dependency that is neither defined nor a package.
    #[error("project '{project}' depends on unknown project '{dependency}'")]
    UnknownProject {
        /// The project holding the reference.
        project: String,
        /// The name that could not be found.
        dependency: String,
    },

    /// A well-known option was given a value of the wrong type.
    #[error("option '{key}' expects a {expected}, found a {found}")]
    OptionType {
        /// The option key.
        key: String,
        /// The type the option requires.
        expected: &'static str,
        /// The type that was supplied.
        found: &'static str,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("workspace.name".to_string());
        assert_eq!(format!("{err}"), "missing required field: workspace.name");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse definition: expected '=' at line 3"
        );
    }

    #[test]
    fn display_duplicate_project() {
        let err = ConfigError::DuplicateProject("core".to_string());
        assert_eq!(format!("{err}"), "project 'core' is defined more than once");
    }

    #[test]
    fn display_unknown_project() {
        let err = ConfigError::UnknownProject {
            project: "app".to_string(),
            dependency: "missing".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "project 'app' depends on unknown project 'missing'"
        );
    }

    #[test]
    fn display_option_type() {
        let err = ConfigError::OptionType {
            key: "debug".to_string(),
            expected: "boolean",
            found: "string",
        };
        assert_eq!(format!("{err}"), "option 'debug' expects a boolean, found a string");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read definition:"));
    }
}

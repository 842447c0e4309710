//! Typed build options, per-configuration overrides, and define maps.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;

/// Architecture assumed when a project does not name one.
pub const DEFAULT_ARCHITECTURE: &str = "x64";

/// The kind of artifact a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// A runnable program.
    Executable,
    /// A dynamically linked library.
    SharedLibrary,
    /// A statically linked archive. Its own dependencies fold into consumers.
    StaticLibrary,
    /// Headers only; never compiled or linked, but may export inputs.
    HeaderLibrary,
}

impl TargetKind {
    /// Returns `true` for shared and static libraries.
    pub fn is_library(self) -> bool {
        matches!(self, TargetKind::SharedLibrary | TargetKind::StaticLibrary)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::Executable => "executable",
            TargetKind::SharedLibrary => "shared-library",
            TargetKind::StaticLibrary => "static-library",
            TargetKind::HeaderLibrary => "header-library",
        };
        f.write_str(s)
    }
}

/// A scalar option value as supplied by a definition script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer setting.
    Int(i64),
    /// A free-form string.
    Str(String),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Int(_) => "integer",
            OptionValue::Str(_) => "string",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Str(v) => f.write_str(v),
        }
    }
}

/// Well-known option keys. Hyphenated spellings are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WellKnown {
    Debug,
    Rtti,
    WarningLevel,
    BinaryOnly,
    Optimization,
    Architecture,
}

impl WellKnown {
    fn parse(key: &str) -> Option<Self> {
        match key.replace('-', "_").as_str() {
            "debug" => Some(WellKnown::Debug),
            "rtti" => Some(WellKnown::Rtti),
            "warning_level" | "warn" => Some(WellKnown::WarningLevel),
            "binary_only" => Some(WellKnown::BinaryOnly),
            "optimization" => Some(WellKnown::Optimization),
            "architecture" | "arch" => Some(WellKnown::Architecture),
            _ => None,
        }
    }
}

fn expect_bool(key: &str, value: OptionValue) -> Result<bool, ConfigError> {
    match value {
        OptionValue::Bool(b) => Ok(b),
        other => Err(ConfigError::OptionType {
            key: key.to_string(),
            expected: "boolean",
            found: other.type_name(),
        }),
    }
}

fn expect_level(key: &str, value: OptionValue) -> Result<u8, ConfigError> {
    match value {
        OptionValue::Int(n) => u8::try_from(n).map_err(|_| {
            ConfigError::ValidationError(format!("option '{key}' out of range: {n}"))
        }),
        other => Err(ConfigError::OptionType {
            key: key.to_string(),
            expected: "integer",
            found: other.type_name(),
        }),
    }
}

fn expect_str(key: &str, value: OptionValue) -> Result<String, ConfigError> {
    match value {
        OptionValue::Str(s) => Ok(s),
        other => Err(ConfigError::OptionType {
            key: key.to_string(),
            expected: "string",
            found: other.type_name(),
        }),
    }
}

/// The full option set of a project for one configuration.
///
/// Well-known fields are strongly typed and always present with defaults;
/// backend-specific keys live in `extra` and exist only once set. Deserialized
/// keys go through [`Options::set`], so aliases and hyphenated spellings land
/// on the typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Options {
    /// Build with debug information and runtime checks.
    pub debug: bool,
    /// Enable run-time type information.
    pub rtti: bool,
    /// Compiler warning level.
    pub warning_level: u8,
    /// The project is never compiled; it only exports prebuilt inputs.
    pub binary_only: bool,
    /// Enable compiler optimizations.
    pub optimization: bool,
    /// Target machine architecture (e.g. "x64").
    pub architecture: String,
    /// Open extension keys consumed by specific backends.
    #[serde(flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            rtti: true,
            warning_level: 3,
            binary_only: false,
            optimization: false,
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Options {
    /// Looks up an option by key, covering well-known fields and extensions.
    ///
    /// Returns `None` for an extension key that was never set.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        match WellKnown::parse(key) {
            Some(WellKnown::Debug) => Some(self.debug.into()),
            Some(WellKnown::Rtti) => Some(self.rtti.into()),
            Some(WellKnown::WarningLevel) => Some(OptionValue::Int(self.warning_level.into())),
            Some(WellKnown::BinaryOnly) => Some(self.binary_only.into()),
            Some(WellKnown::Optimization) => Some(self.optimization.into()),
            Some(WellKnown::Architecture) => Some(self.architecture.as_str().into()),
            None => self.extra.get(key).cloned(),
        }
    }

    /// Sets an option by key, type-checking well-known fields.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<(), ConfigError> {
        let value = value.into();
        match WellKnown::parse(key) {
            Some(WellKnown::Debug) => self.debug = expect_bool(key, value)?,
            Some(WellKnown::Rtti) => self.rtti = expect_bool(key, value)?,
            Some(WellKnown::WarningLevel) => self.warning_level = expect_level(key, value)?,
            Some(WellKnown::BinaryOnly) => self.binary_only = expect_bool(key, value)?,
            Some(WellKnown::Optimization) => self.optimization = expect_bool(key, value)?,
            Some(WellKnown::Architecture) => self.architecture = expect_str(key, value)?,
            None => {
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Returns a copy with every key set in `overrides` replaced.
    pub fn overridden(&self, overrides: &OptionOverrides) -> Options {
        let mut out = self.clone();
        if let Some(v) = overrides.debug {
            out.debug = v;
        }
        if let Some(v) = overrides.rtti {
            out.rtti = v;
        }
        if let Some(v) = overrides.warning_level {
            out.warning_level = v;
        }
        if let Some(v) = overrides.binary_only {
            out.binary_only = v;
        }
        if let Some(v) = overrides.optimization {
            out.optimization = v;
        }
        if let Some(ref v) = overrides.architecture {
            out.architecture = v.clone();
        }
        for (key, value) in &overrides.extra {
            out.extra.insert(key.clone(), value.clone());
        }
        out
    }
}

/// Sparse per-key option overrides carried by a configuration filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionOverrides {
    /// Overrides [`Options::debug`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Overrides [`Options::rtti`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtti: Option<bool>,
    /// Overrides [`Options::warning_level`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_level: Option<u8>,
    /// Overrides [`Options::binary_only`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_only: Option<bool>,
    /// Overrides [`Options::optimization`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<bool>,
    /// Overrides [`Options::architecture`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// Extension keys set or replaced by the filter.
    #[serde(flatten)]
    pub extra: BTreeMap<String, OptionValue>,
}

impl OptionOverrides {
    /// Records an override, type-checking well-known fields.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<(), ConfigError> {
        let value = value.into();
        match WellKnown::parse(key) {
            Some(WellKnown::Debug) => self.debug = Some(expect_bool(key, value)?),
            Some(WellKnown::Rtti) => self.rtti = Some(expect_bool(key, value)?),
            Some(WellKnown::WarningLevel) => self.warning_level = Some(expect_level(key, value)?),
            Some(WellKnown::BinaryOnly) => self.binary_only = Some(expect_bool(key, value)?),
            Some(WellKnown::Optimization) => self.optimization = Some(expect_bool(key, value)?),
            Some(WellKnown::Architecture) => self.architecture = Some(expect_str(key, value)?),
            None => {
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Returns `true` if no key is overridden.
    pub fn is_empty(&self) -> bool {
        *self == OptionOverrides::default()
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, OptionValue>::deserialize(deserializer)?;
        let mut options = Options::default();
        for (key, value) in raw {
            options.set(&key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(options)
    }
}

impl<'de> Deserialize<'de> for OptionOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, OptionValue>::deserialize(deserializer)?;
        let mut overrides = OptionOverrides::default();
        for (key, value) in raw {
            overrides.set(&key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(overrides)
    }
}

/// The value half of a preprocessor define.
pub type DefineValue = String;

/// Preprocessor defines: name to optional value, sorted by name.
pub type Defines = BTreeMap<String, Option<DefineValue>>;

/// Parses `NAME` or `NAME=VALUE` into a define entry.
pub fn parse_define(raw: &str) -> Result<(String, Option<DefineValue>), ConfigError> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.to_string())),
        None => (raw.trim(), None),
    };
    if name.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "define '{raw}' has an empty name"
        )));
    }
    Ok((name.to_string(), value))
}

//! Stable project identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An identifier assigned to a project the first time it is generated.
///
/// Backends embed it in their artifacts (for example as a project GUID), so
/// it must stay the same across runs even when the project's definition
/// changes. Displayed and persisted in upper-case hyphenated form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableId(Uuid);

impl StableId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Error returned when a string is not a valid [`StableId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stable identifier '{0}'")]
pub struct ParseIdError(pub String);

impl FromStr for StableId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buf))
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StableId({self})")
    }
}

impl Serialize for StableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_differ() {
        assert_ne!(StableId::generate(), StableId::generate());
    }

    #[test]
    fn display_is_upper_case_hyphenated() {
        let id = StableId::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s, s.to_uppercase());
        assert_eq!(s.matches('-').count(), 4);
    }

    #[test]
    fn parse_accepts_either_case() {
        let id = StableId::generate();
        let upper: StableId = id.to_string().parse().unwrap();
        let lower: StableId = id.to_string().to_lowercase().parse().unwrap();
        assert_eq!(id, upper);
        assert_eq!(id, lower);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<StableId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid stable identifier 'not-a-uuid'");
    }

    #[test]
    fn serde_roundtrip() {
        let id = StableId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let back: StableId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

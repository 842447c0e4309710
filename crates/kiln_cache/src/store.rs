//! The persisted per-project store.
//!
//! Stored as `kiln-cache.json` in the cache directory: a JSON object mapping
//! each project name to its stable identifier and last seen content hash.
//! Frontends keep the cache directory in [`CACHE_DIR`] under the output
//! directory so backends writing into the output directory cannot clobber it.

use std::collections::BTreeMap;
use std::path::Path;

use kiln_common::{ContentHash, StableId};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Reserved subdirectory of the output directory that holds the store.
pub const CACHE_DIR: &str = ".kiln";

/// Name of the store file within the cache directory.
pub const STORE_FILE: &str = "kiln-cache.json";

/// Persisted state for a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Identifier assigned on first sight, never changed afterwards.
    pub identifier: StableId,
    /// Digest of the defining script at the last pass.
    pub hash: ContentHash,
}

/// All persisted entries, keyed by project name.
///
/// Entries for projects no longer defined are kept until pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheStore {
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from `cache_dir`.
    ///
    /// Returns `Ok(None)` when no store file exists. An unreadable or
    /// unparsable file is an error; callers decide whether to recover.
    pub fn load(cache_dir: &Path) -> Result<Option<Self>, CacheError> {
        let path = cache_dir.join(STORE_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CacheError::StoreParse {
                path,
                reason: e.to_string(),
            })
    }

    /// Saves the store to `cache_dir`, creating the directory if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(STORE_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Looks up a project's entry.
    pub fn get(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// Inserts or replaces a project's entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Removes a project's entry.
    pub fn remove(&mut self, name: &str) -> Option<CacheEntry> {
        self.entries.remove(name)
    }

    /// Keeps only entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|name, _| keep(name));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

//! High-level regeneration cache.
//!
//! `RegenerationCache` loads the store once per pass, decides which projects
//! are dirty, and writes the merged store back when anything changed.

use std::path::{Path, PathBuf};

use kiln_common::{ContentHash, StableId};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::hasher::ScriptHasher;
use crate::store::{CacheEntry, CacheStore};

/// A project as the cache sees it: a name and the script that defines it.
#[derive(Debug, Clone, Copy)]
pub struct TrackedProject<'a> {
    /// Project name.
    pub name: &'a str,
    /// Defining script, the hash input.
    pub script: &'a Path,
}

/// Per-project outcome of a dirty check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    /// Stable identifier, reused from the store when present.
    pub identifier: StableId,
    /// Hash of the defining script for this pass.
    pub content_hash: ContentHash,
    /// Whether the project's artifacts must be rendered again.
    pub dirty: bool,
}

/// Result of [`RegenerationCache::compute_dirty`].
#[derive(Debug, Clone, Default)]
pub struct DirtySet {
    states: Vec<(String, ProjectState)>,
    /// Whether project membership changed and the aggregate must be redone.
    pub regenerate_aggregate: bool,
}

impl DirtySet {
    /// Looks up a project's state.
    pub fn get(&self, name: &str) -> Option<&ProjectState> {
        self.states.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Returns `true` if the named project is dirty.
    pub fn is_dirty(&self, name: &str) -> bool {
        self.get(name).is_some_and(|s| s.dirty)
    }

    /// States in the order projects were given.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectState)> {
        self.states.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of dirty projects.
    pub fn dirty_count(&self) -> usize {
        self.states.iter().filter(|(_, s)| s.dirty).count()
    }

    /// Returns `true` if any project is dirty.
    pub fn any_dirty(&self) -> bool {
        self.states.iter().any(|(_, s)| s.dirty)
    }
}

/// Tracks stable identifiers and content hashes across generation passes.
///
/// Reads are fail-safe: a missing or corrupt store means every project is new.
#[derive(Debug)]
pub struct RegenerationCache {
    cache_dir: PathBuf,
    store: CacheStore,
    existed: bool,
}

impl RegenerationCache {
    /// Loads the store from `cache_dir`, or starts empty.
    pub fn load_or_create(cache_dir: &Path) -> Self {
        let (store, existed) = match CacheStore::load(cache_dir) {
            Ok(Some(store)) => (store, true),
            Ok(None) => (CacheStore::new(), false),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cache store");
                (CacheStore::new(), false)
            }
        };
        debug!(
            cache_dir = %cache_dir.display(),
            entries = store.len(),
            existed,
            "loaded regeneration cache"
        );
        Self {
            cache_dir: cache_dir.to_path_buf(),
            store,
            existed,
        }
    }

    /// Directory the store lives in.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The in-memory store, including entries updated by the last dirty check.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns `true` if a store was loaded from disk.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Decides which projects must be regenerated.
    ///
    /// New projects get a fresh identifier and mark the aggregate for
    /// regeneration. Known projects are dirty when their script hash changed,
    /// keeping their identifier. Every name in `requested` is dirty
    /// regardless. The in-memory store is updated; nothing is written.
    pub fn compute_dirty(
        &mut self,
        projects: &[TrackedProject<'_>],
        requested: &[String],
    ) -> DirtySet {
        let mut hasher = ScriptHasher::new();
        let mut set = DirtySet {
            states: Vec::with_capacity(projects.len()),
            regenerate_aggregate: !self.existed,
        };

        for project in projects {
            let content_hash = hasher.hash_script(project.script);
            let (identifier, mut dirty) = match self.store.get(project.name) {
                Some(entry) => (entry.identifier, entry.hash != content_hash),
                None => {
                    set.regenerate_aggregate = true;
                    (StableId::generate(), true)
                }
            };
            if requested.iter().any(|r| r == project.name) {
                dirty = true;
            }

            debug!(project = %project.name, dirty, "checked project");
            self.store.insert(
                project.name,
                CacheEntry {
                    identifier,
                    hash: content_hash,
                },
            );
            set.states.push((
                project.name.to_string(),
                ProjectState {
                    identifier,
                    content_hash,
                    dirty,
                },
            ));
        }
        set
    }

    /// Persists the store if `set` found anything dirty.
    ///
    /// Returns whether a write happened.
    pub fn commit(&mut self, set: &DirtySet) -> Result<bool, CacheError> {
        if !set.any_dirty() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Writes the store unconditionally.
    pub fn save(&mut self) -> Result<(), CacheError> {
        self.store.save(&self.cache_dir)?;
        self.existed = true;
        Ok(())
    }

    /// Drops entries for projects not in `live`. Returns how many were removed.
    pub fn prune(&mut self, live: &[&str]) -> usize {
        let before = self.store.len();
        self.store.retain(|name| live.iter().any(|l| *l == name));
        let removed = before - self.store.len();
        if removed > 0 {
            debug!(removed, "pruned stale cache entries");
        }
        removed
    }
}

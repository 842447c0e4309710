//! Per-invocation generation state.

use std::path::{Path, PathBuf};

use kiln_cache::CACHE_DIR;

/// How a pass treats the regeneration cache and the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Render only dirty projects; render the aggregate when membership changed.
    #[default]
    Incremental,
    /// Treat every project as dirty and always render the aggregate.
    Full,
    /// Compute and report, but render nothing and write no cache.
    DryRun,
}

/// Everything a pass needs that is not the workspace itself.
///
/// Created once per invocation and passed by reference.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Hash input for projects that record no script of their own.
    pub script_root: PathBuf,
    /// Directory holding the cache store.
    pub cache_dir: PathBuf,
    /// Cache and backend behavior.
    pub mode: GenerationMode,
    /// Extra project names forced dirty for this invocation only.
    pub requested: Vec<String>,
    /// Drop cache entries for projects no longer in the workspace.
    pub prune: bool,
}

impl GenerationContext {
    /// Creates an incremental context.
    pub fn new(script_root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_root: script_root.into(),
            cache_dir: cache_dir.into(),
            mode: GenerationMode::Incremental,
            requested: Vec::new(),
            prune: false,
        }
    }

    /// Creates an incremental context caching in the reserved subdirectory of
    /// `output_dir`.
    pub fn for_output(script_root: impl Into<PathBuf>, output_dir: &Path) -> Self {
        Self::new(script_root, output_dir.join(CACHE_DIR))
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Forces the given projects dirty.
    pub fn with_requested<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested.extend(names.into_iter().map(Into::into));
        self
    }

    /// Enables pruning of stale cache entries.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Returns `true` if nothing may be written.
    pub fn is_dry_run(&self) -> bool {
        self.mode == GenerationMode::DryRun
    }
}

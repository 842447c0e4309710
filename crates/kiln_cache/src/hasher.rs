//! Content hashing of defining scripts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;
use tracing::warn;

use crate::error::CacheError;

/// Computes content hashes for the scripts projects are defined in.
///
/// Many projects usually share one script, so hashes are memoized per path.
#[derive(Debug, Default)]
pub struct ScriptHasher {
    seen: HashMap<PathBuf, ContentHash>,
}

impl ScriptHasher {
    /// Creates a hasher with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and hashes a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        ContentHash::from_file(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Hashes a project's script.
    ///
    /// A script that cannot be read hashes as its path, so the project stays
    /// trackable until the script reappears.
    pub fn hash_script(&mut self, path: &Path) -> ContentHash {
        if let Some(hash) = self.seen.get(path) {
            return *hash;
        }
        let hash = match Self::hash_file(path) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(script = %path.display(), error = %e, "hashing script path instead of content");
                ContentHash::from_bytes(path.to_string_lossy().as_bytes())
            }
        };
        self.seen.insert(path.to_path_buf(), hash);
        hash
    }
}

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from persisting the cache. Load never produces these; a missing
/// or corrupt file is a cold start, not an error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable identifier→payload mapping for one enrichment kind.
///
/// On disk this is a pretty-printed JSON object keyed by the stringified
/// movie id. A key that is present is never fetched again within a run.
#[derive(Debug)]
pub struct Cache<P> {
    path: PathBuf,
    entries: HashMap<String, P>,
}

impl<P: Serialize + DeserializeOwned> Cache<P> {
    /// Load the cache from `path`. Missing or malformed content starts cold.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!(
                        "Cache file {} is malformed ({}), starting with an empty cache",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!(
                    "Could not read cache file {} ({}), starting with an empty cache",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self { path, entries }
    }

    /// Persist the whole mapping.
    ///
    /// Writes to a sibling `.tmp` file and renames over the target so a
    /// crash mid-write leaves the previous checkpoint readable.
    pub fn checkpoint(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id.to_string())
    }

    pub fn get(&self, id: u64) -> Option<&P> {
        self.entries.get(&id.to_string())
    }

    pub fn insert(&mut self, id: u64, payload: P) {
        self.entries.insert(id.to_string(), payload);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;

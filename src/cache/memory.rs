//! In-memory configuration cache
//!
//! Stores encoded envelopes keyed by path together with a modification time.
//! Dependency timestamps are registered with [`InMemoryPersister::touch`].
//! Useful for testing code that depends on a [`ConfigurationPersister`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use tracing::debug;

use crate::config::MissingDependencyPolicy;
use crate::error::{CacheError, CacheResult};

use super::{format, CachedConfiguration, ConfigurationPersister};

#[derive(Debug, Clone)]
struct MemoryEntry {
    bytes: Vec<u8>,
    modified: SystemTime,
}

/// Keeps cached configurations and file timestamps in memory
#[derive(Debug, Default)]
pub struct InMemoryPersister {
    entries: Mutex<HashMap<PathBuf, MemoryEntry>>,
    missing_dependency: MissingDependencyPolicy,
}

impl InMemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with a specific policy for unknown dependencies
    pub fn with_missing_dependency(policy: MissingDependencyPolicy) -> Self {
        Self {
            entries: Mutex::default(),
            missing_dependency: policy,
        }
    }

    /// Registers `path` as existing with the given modification time
    ///
    /// Keeps any stored bytes, so this also backdates a cache entry.
    pub fn touch(&self, path: impl Into<PathBuf>, modified: SystemTime) {
        self.entries()
            .entry(path.into())
            .and_modify(|entry| entry.modified = modified)
            .or_insert_with(|| MemoryEntry {
                bytes: Vec::new(),
                modified,
            });
    }

    /// Stores raw bytes at `path`, bypassing the envelope encoder
    pub fn insert_raw(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.entries().insert(
            path.into(),
            MemoryEntry {
                bytes,
                modified: SystemTime::now(),
            },
        );
    }

    /// Removes `path`, returning whether it existed
    pub fn remove(&self, path: &Path) -> bool {
        self.entries().remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, MemoryEntry>> {
        // A poisoned map is still structurally valid
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.entries().get(path).map(|entry| entry.modified)
    }
}

impl ConfigurationPersister for InMemoryPersister {
    fn read_configuration<T: CachedConfiguration>(&self, path: &Path) -> CacheResult<Option<T>> {
        let bytes = self
            .entries()
            .get(path)
            .map(|entry| entry.bytes.clone())
            .ok_or_else(|| CacheError::NotFound {
                path: path.to_path_buf(),
            })?;
        format::decode(&bytes, path)
    }

    fn write_configuration<T: CachedConfiguration>(
        &self,
        path: &Path,
        config: &T,
    ) -> CacheResult<()> {
        let bytes = format::encode(config, false)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored configuration in memory");
        self.insert_raw(path, bytes);
        Ok(())
    }

    fn is_new_configuration_required<P: AsRef<Path>>(
        &self,
        path: &Path,
        dependencies: &[P],
    ) -> CacheResult<bool> {
        let Some(cache_modified) = self.modified(path) else {
            return Ok(true);
        };

        for dependency in dependencies {
            let dependency = dependency.as_ref();
            match self.modified(dependency) {
                Some(modified) if modified > cache_modified => return Ok(true),
                Some(_) => {}
                None => match self.missing_dependency {
                    MissingDependencyPolicy::Error => {
                        return Err(CacheError::NotFound {
                            path: dependency.to_path_buf(),
                        })
                    }
                    MissingDependencyPolicy::Stale => return Ok(true),
                    MissingDependencyPolicy::Ignore => {}
                },
            }
        }

        Ok(false)
    }
}

//! Filesystem-backed configuration cache
//!
//! Reads take a shared lock and writes take an exclusive lock on the cache
//! file for the lifetime of the handle. Staleness compares OS modification
//! times of the cache file against each dependency.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use fs2::FileExt;
use tracing::debug;

use crate::config::{LockMode, MissingDependencyPolicy, PersisterOptions};
use crate::error::{CacheError, CacheResult};

use super::{format, CachedConfiguration, ConfigurationPersister};

/// Reads and writes cached configurations as files on disk
#[derive(Debug, Clone, Default)]
pub struct FileConfigurationPersister {
    options: PersisterOptions,
}

impl FileConfigurationPersister {
    /// Creates a persister with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a persister with custom options
    pub fn with_options(options: PersisterOptions) -> Self {
        Self { options }
    }

    /// Reads only the envelope metadata of a cache file
    pub fn read_header(&self, path: &Path) -> CacheResult<format::EnvelopeHeader> {
        let bytes = self.read_locked(path)?;
        format::read_header(&bytes, path)
    }

    fn lock_shared(&self, file: &File) -> io::Result<()> {
        // Fully qualified: std::fs::File has inherent lock methods with other signatures
        match self.options.lock {
            LockMode::Blocking => FileExt::lock_shared(file),
            LockMode::NonBlocking => FileExt::try_lock_shared(file),
        }
    }

    fn lock_exclusive(&self, file: &File) -> io::Result<()> {
        match self.options.lock {
            LockMode::Blocking => FileExt::lock_exclusive(file),
            LockMode::NonBlocking => FileExt::try_lock_exclusive(file),
        }
    }

    fn read_locked(&self, path: &Path) -> CacheResult<Vec<u8>> {
        let mut file =
            File::open(path).map_err(|e| CacheError::io("opening cache file", path, e))?;
        self.lock_shared(&file)
            .map_err(|e| CacheError::io("locking cache file for read", path, e))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| CacheError::io("reading cache file", path, e))?;
        Ok(bytes)
    }
}

/// Last-modified time of a file
fn modified_time(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

impl ConfigurationPersister for FileConfigurationPersister {
    fn read_configuration<T: CachedConfiguration>(&self, path: &Path) -> CacheResult<Option<T>> {
        let bytes = self.read_locked(path)?;
        let config = format::decode(&bytes, path)?;
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            matched = config.is_some(),
            "Read cached configuration"
        );
        Ok(config)
    }

    fn write_configuration<T: CachedConfiguration>(
        &self,
        path: &Path,
        config: &T,
    ) -> CacheResult<()> {
        // Encode before opening so a serialization failure leaves the file untouched
        let bytes = format::encode(config, self.options.pretty)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| CacheError::write_io("opening cache file for write", path, e))?;
        self.lock_exclusive(&file)
            .map_err(|e| CacheError::write_io("locking cache file for write", path, e))?;

        // Truncate only once the lock is held
        file.set_len(0)
            .map_err(|e| CacheError::write_io("truncating cache file", path, e))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_all())
            .map_err(|e| CacheError::write_io("writing cache file", path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote cached configuration");
        Ok(())
    }

    fn is_new_configuration_required<P: AsRef<Path>>(
        &self,
        path: &Path,
        dependencies: &[P],
    ) -> CacheResult<bool> {
        let cache_modified = match modified_time(path) {
            Ok(time) => time,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Cache file missing, new configuration required");
                return Ok(true);
            }
            Err(e) => return Err(CacheError::io("reading cache timestamp", path, e)),
        };

        for dependency in dependencies {
            let dependency = dependency.as_ref();
            let dependency_modified = match modified_time(dependency) {
                Ok(time) => time,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    match self.options.missing_dependency {
                        MissingDependencyPolicy::Error => {
                            return Err(CacheError::NotFound {
                                path: dependency.to_path_buf(),
                            })
                        }
                        MissingDependencyPolicy::Stale => {
                            debug!(dependency = %dependency.display(), "Dependency missing, treating cache as stale");
                            return Ok(true);
                        }
                        MissingDependencyPolicy::Ignore => continue,
                    }
                }
                Err(e) => {
                    return Err(CacheError::io(
                        "reading dependency timestamp",
                        dependency,
                        e,
                    ))
                }
            };

            if dependency_modified > cache_modified {
                debug!(
                    path = %path.display(),
                    dependency = %dependency.display(),
                    "Dependency is newer than cache"
                );
                return Ok(true);
            }
        }

        Ok(false)
    }
}

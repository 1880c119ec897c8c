//! Configuration cache stores
//!
//! A store persists a previously built configuration, reads it back, and
//! decides whether the cached copy is older than the files it was built from.
//! `FileConfigurationPersister` works against the filesystem;
//! `InMemoryPersister` keeps everything in a map and is meant for tests.

mod file;
pub mod format;
mod memory;

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CacheResult;

pub use file::FileConfigurationPersister;
pub use format::EnvelopeHeader;
pub use memory::InMemoryPersister;

/// A configuration object that can be cached as a whole
///
/// The store never looks inside the value. `SCHEMA` names the type in the
/// envelope so a cache file written for another type reads back as `None`;
/// bump `SCHEMA_VERSION` whenever the serialized shape changes.
pub trait CachedConfiguration: Serialize + DeserializeOwned {
    const SCHEMA: &'static str;
    const SCHEMA_VERSION: u32 = 1;
}

/// Read, write and staleness check for a cached configuration
pub trait ConfigurationPersister {
    /// Reads the configuration stored at `path`
    ///
    /// Returns `Ok(None)` if the file holds a configuration of another type.
    fn read_configuration<T: CachedConfiguration>(&self, path: &Path) -> CacheResult<Option<T>>;

    /// Writes `config` to `path`, creating or overwriting the file
    fn write_configuration<T: CachedConfiguration>(&self, path: &Path, config: &T)
        -> CacheResult<()>;

    /// Returns `true` if the cache at `path` is missing or older than any dependency
    fn is_new_configuration_required<P: AsRef<Path>>(
        &self,
        path: &Path,
        dependencies: &[P],
    ) -> CacheResult<bool>;
}

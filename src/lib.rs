//! cfgcache
//!
//! Persists a compiled configuration object to a cache file, reads it back,
//! and decides whether the cache is stale relative to the files it was built
//! from.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod facility;

pub use cache::{
    CachedConfiguration, ConfigurationPersister, FileConfigurationPersister, InMemoryPersister,
};
pub use error::{CacheError, CacheResult, ErrorKind};
pub use facility::{load_or_build, Loaded, Origin};

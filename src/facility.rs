//! Load a configuration from cache, or build and cache it
//!
//! Any failure to read or validate the cache falls back to building a new
//! configuration. A failed write is logged and the built configuration is
//! still returned, so a broken cache never blocks startup.

use std::path::Path;

use tracing::{debug, warn};

use crate::cache::{CachedConfiguration, ConfigurationPersister};

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read back from the cache file
    Cache,
    /// Built fresh by the caller's builder
    Built,
}

/// A configuration along with its origin
#[derive(Debug)]
pub struct Loaded<T> {
    pub config: T,
    pub origin: Origin,
}

/// Returns the cached configuration at `path` if it is still valid, otherwise
/// calls `build` and caches the result.
///
/// Only errors from `build` are returned.
pub fn load_or_build<T, P, D, E, F>(
    persister: &P,
    path: &Path,
    dependencies: &[D],
    build: F,
) -> Result<Loaded<T>, E>
where
    T: CachedConfiguration,
    P: ConfigurationPersister,
    D: AsRef<Path>,
    F: FnOnce() -> Result<T, E>,
{
    let rebuild = match persister.is_new_configuration_required(path, dependencies) {
        Ok(required) => required,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not validate configuration cache");
            true
        }
    };

    if !rebuild {
        match persister.read_configuration::<T>(path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "Using cached configuration");
                return Ok(Loaded {
                    config,
                    origin: Origin::Cache,
                });
            }
            Ok(None) => {
                warn!(path = %path.display(), schema = T::SCHEMA, "Cache holds another configuration type");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read configuration cache");
            }
        }
    }

    let config = build()?;
    if let Err(e) = persister.write_configuration(path, &config) {
        warn!(path = %path.display(), error = %e, "Could not write configuration cache, continuing without it");
    }

    Ok(Loaded {
        config,
        origin: Origin::Built,
    })
}

//! Options controlling how the file-backed store behaves
//!
//! `PersisterOptions` derives `Deserialize` so a host application can embed it
//! in its own configuration file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// What a staleness check does when a dependency file does not exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Propagate a `NotFound` error
    #[default]
    Error,
    /// Treat the missing dependency as newer than the cache
    Stale,
    /// Treat the missing dependency as infinitely old
    Ignore,
}

impl MissingDependencyPolicy {
    /// Parses a policy name as used on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "stale" => Some(Self::Stale),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// How file locks are acquired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Wait until the lock is available
    #[default]
    Blocking,
    /// Fail with an I/O error if the file is held incompatibly
    NonBlocking,
}

/// Configuration for [`FileConfigurationPersister`](crate::cache::FileConfigurationPersister)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersisterOptions {
    /// Behaviour for dependencies that do not exist
    pub missing_dependency: MissingDependencyPolicy,
    /// Lock acquisition mode for reads and writes
    pub lock: LockMode,
    /// Pretty-print the JSON envelope
    pub pretty: bool,
}

/// Returns the XDG-compliant cache directory for an application
///
/// Uses `~/.cache/<app>/` on Linux, or the platform equivalent elsewhere.
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir(app: &str) -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", app)?;
    Some(project_dirs.cache_dir().to_path_buf())
}

/// Resolves a cache path given by the user
///
/// A bare file name is placed inside `cache_dir`. Absolute paths and paths
/// with a directory component (including `./name`) are used as given.
pub fn resolve_cache_path(path: &Path, cache_dir: Option<&Path>) -> PathBuf {
    let is_bare_name = !path.as_os_str().is_empty()
        && path
            .parent()
            .is_some_and(|parent| parent.as_os_str().is_empty());
    match cache_dir {
        Some(dir) if is_bare_name => dir.join(path),
        _ => path.to_path_buf(),
    }
}

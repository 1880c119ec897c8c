//! Command-line interface for inspecting configuration caches
//!
//! `cfgcache status` answers whether a cache file must be rebuilt and
//! `cfgcache inspect` prints the metadata stored in a cache file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{default_cache_dir, MissingDependencyPolicy, PersisterOptions};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The missing-dependency policy name is not recognized
    #[error("Invalid missing-dependency policy: '{0}'. Valid policies: error, stale, ignore")]
    InvalidPolicy(String),
}

/// Configuration cache inspection tool
#[derive(Parser, Debug)]
#[command(name = "cfgcache")]
#[command(about = "Check and inspect cached configuration files")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory for bare cache file names (defaults to the XDG cache dir)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report whether the cache is fresh (exit 0) or stale (exit 1)
    Status {
        /// Path to the cache file
        cache: PathBuf,

        /// Files the cached configuration was built from
        dependencies: Vec<PathBuf>,

        /// What to do when a dependency does not exist: error, stale, ignore
        #[arg(long, value_name = "POLICY", default_value = "error")]
        missing: String,
    },
    /// Print the metadata stored in a cache file
    Inspect {
        /// Path to the cache file
        cache: PathBuf,
    },
}

impl Cli {
    /// Directory that bare cache file names are resolved against
    ///
    /// `--cache-dir` wins; otherwise the platform cache directory for cfgcache.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| default_cache_dir("cfgcache"))
    }
}

/// Parses a missing-dependency policy argument
pub fn parse_policy_arg(s: &str) -> Result<MissingDependencyPolicy, CliError> {
    MissingDependencyPolicy::from_str(s).ok_or_else(|| CliError::InvalidPolicy(s.to_string()))
}

/// Builds persister options from a policy argument
pub fn options_for_policy(missing: &str) -> Result<PersisterOptions, CliError> {
    Ok(PersisterOptions {
        missing_dependency: parse_policy_arg(missing)?,
        ..PersisterOptions::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_arg_valid() {
        assert_eq!(
            parse_policy_arg("error").unwrap(),
            MissingDependencyPolicy::Error
        );
        assert_eq!(
            parse_policy_arg("stale").unwrap(),
            MissingDependencyPolicy::Stale
        );
        assert_eq!(
            parse_policy_arg("ignore").unwrap(),
            MissingDependencyPolicy::Ignore
        );
    }

    #[test]
    fn test_parse_policy_arg_invalid() {
        let err = parse_policy_arg("sometimes").unwrap_err();
        assert!(err.to_string().contains("Invalid missing-dependency policy"));
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn test_cli_parse_status_with_dependencies() {
        let cli = Cli::parse_from(["cfgcache", "status", "app.cache", "a.xml", "b.xml"]);
        match cli.command {
            Commands::Status {
                cache,
                dependencies,
                missing,
            } => {
                assert_eq!(cache, PathBuf::from("app.cache"));
                assert_eq!(dependencies.len(), 2);
                assert_eq!(missing, "error");
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_verbose_count() {
        let cli = Cli::parse_from(["cfgcache", "-vv", "inspect", "app.cache"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Inspect { .. }));
    }

    #[test]
    fn test_cli_cache_dir_flag_overrides_default() {
        let cli = Cli::parse_from([
            "cfgcache",
            "inspect",
            "app.cache",
            "--cache-dir",
            "/srv/cache",
        ]);
        assert_eq!(cli.cache_dir(), Some(PathBuf::from("/srv/cache")));
    }

    #[test]
    fn test_parse_policy_arg_rejects_unknown_alias() {
        assert!(parse_policy_arg("old").is_err());
    }

    #[test]
    fn test_options_for_policy() {
        let options = options_for_policy("ignore").unwrap();
        assert_eq!(options.missing_dependency, MissingDependencyPolicy::Ignore);
        assert!(options_for_policy("bogus").is_err());
    }
}

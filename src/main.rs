//! cfgcache - check and inspect cached configuration files
//!
//! Exit codes: 0 fresh (or success), 1 stale, 2 error.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cfgcache::cache::{ConfigurationPersister, FileConfigurationPersister};
use cfgcache::cli::{options_for_policy, Cli, Commands};
use cfgcache::config::resolve_cache_path;
use cfgcache::error::CacheError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("cfgcache=warn"),
        1 => EnvFilter::new("cfgcache=info"),
        _ => EnvFilter::new("cfgcache=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cache_dir = cli.cache_dir();

    match cli.command {
        Commands::Status {
            cache,
            dependencies,
            missing,
        } => {
            let options = match options_for_policy(&missing) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            };
            let cache = resolve_cache_path(&cache, cache_dir.as_deref());
            debug!(path = %cache.display(), "Checking cache status");
            let persister = FileConfigurationPersister::with_options(options);
            match persister.is_new_configuration_required(&cache, &dependencies) {
                Ok(true) => {
                    println!("stale");
                    ExitCode::from(1)
                }
                Ok(false) => {
                    println!("fresh");
                    ExitCode::SUCCESS
                }
                Err(e) => report(&e),
            }
        }
        Commands::Inspect { cache } => {
            let cache = resolve_cache_path(&cache, cache_dir.as_deref());
            match inspect(&cache) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report(&e),
            }
        }
    }
}

fn inspect(cache: &Path) -> Result<(), CacheError> {
    let persister = FileConfigurationPersister::new();
    let header = persister.read_header(cache)?;
    let size = std::fs::metadata(cache)
        .map_err(|e| CacheError::io("reading cache metadata", cache, e))?
        .len();
    debug!(path = %cache.display(), "Read cache header");

    println!("path:           {}", cache.display());
    println!("format:         {} v{}", header.format, header.format_version);
    println!("schema:         {} v{}", header.schema, header.schema_version);
    println!("written_at:     {}", header.written_at.to_rfc3339());
    println!("size:           {} bytes", size);
    Ok(())
}

fn report(e: &CacheError) -> ExitCode {
    eprintln!("Error: {}", e);
    if let Some(hint) = e.hint() {
        eprintln!("Hint: {}", hint);
    }
    ExitCode::from(2)
}

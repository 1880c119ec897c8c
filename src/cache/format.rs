//! Versioned on-disk envelope for cached configurations
//!
//! The configuration is wrapped in a JSON envelope carrying a format tag, a
//! format version and the schema of the stored type, so version mismatches
//! are reported instead of silently producing garbage.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

use super::CachedConfiguration;

/// Tag identifying files written by this crate
pub const FORMAT_TAG: &str = "cfgcache";

/// Current envelope layout version
pub const FORMAT_VERSION: u32 = 1;

/// Envelope written to disk around the configuration
#[derive(Debug, Serialize)]
struct Envelope<'a, T> {
    format: &'a str,
    format_version: u32,
    schema: &'a str,
    schema_version: u32,
    written_at: DateTime<Utc>,
    data: &'a T,
}

/// Envelope as read back, before the payload is interpreted
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(flatten)]
    header: EnvelopeHeader,
    data: serde_json::Value,
}

/// Metadata stored alongside a cached configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub format: String,
    pub format_version: u32,
    pub schema: String,
    pub schema_version: u32,
    pub written_at: DateTime<Utc>,
}

/// Serializes a configuration into envelope bytes
pub fn encode<T: CachedConfiguration>(config: &T, pretty: bool) -> CacheResult<Vec<u8>> {
    let envelope = Envelope {
        format: FORMAT_TAG,
        format_version: FORMAT_VERSION,
        schema: T::SCHEMA,
        schema_version: T::SCHEMA_VERSION,
        written_at: Utc::now(),
        data: config,
    };

    let bytes = if pretty {
        serde_json::to_vec_pretty(&envelope)
    } else {
        serde_json::to_vec(&envelope)
    };
    bytes.map_err(|source| CacheError::Serialize { source })
}

/// Decodes envelope bytes into a configuration
///
/// Returns `Ok(None)` when the envelope is valid but holds a different schema.
/// `path` is only used for error messages.
pub fn decode<T: CachedConfiguration>(bytes: &[u8], path: &Path) -> CacheResult<Option<T>> {
    let raw: RawEnvelope =
        serde_json::from_slice(bytes).map_err(|e| CacheError::corrupt(path, e))?;
    check_format(&raw.header, path)?;

    if raw.header.schema != T::SCHEMA {
        return Ok(None);
    }
    if raw.header.schema_version != T::SCHEMA_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            what: "schema version",
            found: raw.header.schema_version.to_string(),
            expected: T::SCHEMA_VERSION.to_string(),
        });
    }

    let config = serde_json::from_value(raw.data).map_err(|e| CacheError::corrupt(path, e))?;
    Ok(Some(config))
}

/// Decodes only the envelope metadata, without knowing the stored type
pub fn read_header(bytes: &[u8], path: &Path) -> CacheResult<EnvelopeHeader> {
    let raw: RawEnvelope =
        serde_json::from_slice(bytes).map_err(|e| CacheError::corrupt(path, e))?;
    check_format(&raw.header, path)?;
    Ok(raw.header)
}

fn check_format(header: &EnvelopeHeader, path: &Path) -> CacheResult<()> {
    if header.format != FORMAT_TAG {
        return Err(CacheError::corrupt(
            path,
            format!("unknown format tag '{}'", header.format),
        ));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            what: "format version",
            found: header.format_version.to_string(),
            expected: FORMAT_VERSION.to_string(),
        });
    }
    Ok(())
}

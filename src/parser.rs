//! Single-file parsing and alias resolution.
//!
//! Each call reads and parses exactly one file. Includes are handled by
//! [`crate::include`], which calls back into this module per included file.

use crate::descriptor::OptionDescriptor;
use crate::error::{ConfigError, Result};
use crate::value::{RawMapping, Value, mapping_from_yaml};
use std::path::Path;
use tracing::{debug, trace};

/// Read, parse and alias-resolve one config file.
///
/// Only I/O failures are reported as [`ConfigError::FileRead`]; content that
/// is not valid UTF-8 is a [`ConfigError::Parse`] like any other malformed
/// document.
pub fn parse_file(path: &Path, descriptors: &[OptionDescriptor]) -> Result<RawMapping> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = serde_yaml::from_slice(&bytes).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    parse_value(raw, path, descriptors)
}

/// Parse already-loaded content. `origin` is only used for error reporting.
pub fn parse_str(
    content: &str,
    origin: &Path,
    descriptors: &[OptionDescriptor],
) -> Result<RawMapping> {
    let raw = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    parse_value(raw, origin, descriptors)
}

/// Expand merge keys (`<<: *anchor`), convert and alias-resolve a parsed
/// document.
fn parse_value(
    mut raw: serde_yaml::Value,
    origin: &Path,
    descriptors: &[OptionDescriptor],
) -> Result<RawMapping> {
    raw.apply_merge().map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut mapping = match raw {
        // An empty file parses to null
        serde_yaml::Value::Null => RawMapping::new(),
        serde_yaml::Value::Mapping(map) => mapping_from_yaml(map),
        other => {
            return Err(ConfigError::NotAMapping {
                path: origin.to_path_buf(),
                found: Value::from_yaml(other).type_name().to_string(),
            });
        }
    };

    resolve_aliases(&mut mapping, descriptors);
    debug!(path = %origin.display(), keys = mapping.len(), "Parsed config file");
    Ok(mapping)
}

/// Copy alias values onto their canonical keys.
///
/// Aliases are visited in declared order and always overwrite, so when a
/// file sets more than one alias of the same option the last declared alias
/// wins, regardless of where the keys appear in the file. Alias keys are
/// left in place.
pub fn resolve_aliases(mapping: &mut RawMapping, descriptors: &[OptionDescriptor]) {
    for descriptor in descriptors {
        for alias in &descriptor.aliases {
            if let Some(value) = mapping.get(alias).cloned() {
                trace!(alias = %alias, canonical = %descriptor.canonical, "Resolved alias");
                mapping.insert(descriptor.canonical.clone(), value);
            }
        }
    }
}

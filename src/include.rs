//! Include directive handling.
//!
//! A config file may name other config files under the reserved `include`
//! key, either as a single string or as a list of strings. Included files
//! are merged over the including file in the order listed, whole values
//! replacing whole values, so the last file to set a key wins.
//!
//! Includes are expanded transitively: an included file's own `include`
//! list is resolved relative to that file and applied over it before it is
//! merged into its includer. A file that (directly or indirectly) includes
//! itself is rejected with [`ConfigError::IncludeCycle`]. Naming the same
//! file from two sibling includes is fine; it is read from disk each time.

use crate::descriptor::OptionDescriptor;
use crate::error::{ConfigError, Result};
use crate::parser::parse_file;
use crate::value::{RawMapping, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved key naming files to include.
pub const INCLUDE_KEY: &str = "include";

/// The list of files named by an `include` key, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub paths: Vec<String>,
}

impl IncludeDirective {
    /// Extract the directive from the value stored under `include`.
    ///
    /// Accepts a string or a sequence of strings; anything else fails with
    /// [`ConfigError::InvalidIncludeType`] naming `declared_in`.
    pub fn from_value(value: &Value, declared_in: &Path) -> Result<Self> {
        if let Some(path) = value.as_str() {
            return Ok(Self {
                paths: vec![path.to_string()],
            });
        }
        if let Some(paths) = value.as_string_sequence() {
            return Ok(Self { paths });
        }

        let found = match value {
            Value::Sequence(items) => items
                .iter()
                .find(|item| item.as_str().is_none())
                .map(|item| format!("sequence containing {}", item.type_name()))
                .unwrap_or_else(|| "sequence".to_string()),
            other => other.type_name().to_string(),
        };
        Err(ConfigError::InvalidIncludeType {
            path: declared_in.to_path_buf(),
            found,
        })
    }
}

/// Resolve an include entry against the file that declared it.
///
/// Absolute paths are returned verbatim; relative paths are joined onto the
/// declaring file's directory.
pub fn resolve_include_path(declared_in: &Path, include: &str) -> PathBuf {
    let include = Path::new(include);
    if include.is_absolute() {
        return include.to_path_buf();
    }
    match declared_in.parent() {
        Some(dir) => dir.join(include),
        None => include.to_path_buf(),
    }
}

/// Apply the `include` directive of `base` (parsed from `base_path`).
///
/// Returns `base` unchanged when it has no `include` key. Otherwise each
/// included file is parsed with the same descriptors, resolved recursively,
/// and merged over `base` in order. The `include` key is removed from the
/// result. The first error aborts the resolution.
pub fn resolve(
    base: RawMapping,
    base_path: &Path,
    descriptors: &[OptionDescriptor],
) -> Result<RawMapping> {
    let mut chain = vec![chain_key(base_path)];
    resolve_nested(base, base_path, descriptors, &mut chain)
}

fn resolve_nested(
    mut mapping: RawMapping,
    path: &Path,
    descriptors: &[OptionDescriptor],
    chain: &mut Vec<PathBuf>,
) -> Result<RawMapping> {
    let Some(directive) = mapping.remove(INCLUDE_KEY) else {
        return Ok(mapping);
    };
    let directive = IncludeDirective::from_value(&directive, path)?;

    for include in &directive.paths {
        let include_path = resolve_include_path(path, include);
        let key = chain_key(&include_path);
        if chain.contains(&key) {
            let mut cycle = chain.clone();
            cycle.push(key);
            return Err(ConfigError::IncludeCycle {
                path: include_path,
                chain: cycle,
            });
        }

        let included = parse_file(&include_path, descriptors)?;
        chain.push(key);
        let included = resolve_nested(included, &include_path, descriptors, chain);
        chain.pop();
        let included = included?;

        debug!(
            from = %path.display(),
            path = %include_path.display(),
            keys = included.len(),
            "Merging included config file"
        );
        mapping.extend(included);
    }

    Ok(mapping)
}

/// Identity of a file on the include chain. Falls back to the path as given
/// when it cannot be canonicalized (e.g. it does not exist yet; reading it
/// will report the real error).
fn chain_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::fs;
    use tempfile::TempDir;

    fn value(s: &str) -> Value {
        Value::from_yaml(serde_yaml::from_str(s).unwrap())
    }

    #[test]
    fn test_directive_single_string() {
        let d = IncludeDirective::from_value(&value("override.yml"), Path::new("a.yml")).unwrap();
        assert_eq!(d.paths, vec!["override.yml"]);
    }

    #[test]
    fn test_directive_string_list_keeps_order() {
        let d = IncludeDirective::from_value(&value("[b.yml, a.yml]"), Path::new("a.yml")).unwrap();
        assert_eq!(d.paths, vec!["b.yml", "a.yml"]);
    }

    #[test]
    fn test_directive_rejects_integer() {
        let err = IncludeDirective::from_value(&value("42"), Path::new("a.yml")).unwrap_err();
        match err {
            ConfigError::InvalidIncludeType { found, path } => {
                assert_eq!(found, "integer");
                assert_eq!(path, PathBuf::from("a.yml"));
            }
            other => panic!("expected InvalidIncludeType, got {other:?}"),
        }
    }

    #[test]
    fn test_directive_rejects_mixed_list() {
        let err =
            IncludeDirective::from_value(&value("[ok.yml, 1]"), Path::new("a.yml")).unwrap_err();
        match err {
            ConfigError::InvalidIncludeType { found, .. } => {
                assert_eq!(found, "sequence containing integer")
            }
            other => panic!("expected InvalidIncludeType, got {other:?}"),
        }
    }

    #[test]
    fn test_directive_rejects_mapping() {
        let err =
            IncludeDirective::from_value(&value("{file: a.yml}"), Path::new("a.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIncludeType { .. }));
    }

    #[test]
    fn test_resolve_include_path_relative_and_absolute() {
        let declared_in = Path::new("/etc/app/server.yml");
        assert_eq!(
            resolve_include_path(declared_in, "override.yml"),
            PathBuf::from("/etc/app/override.yml")
        );
        assert_eq!(
            resolve_include_path(declared_in, "conf.d/extra.yml"),
            PathBuf::from("/etc/app/conf.d/extra.yml")
        );
        assert_eq!(
            resolve_include_path(declared_in, "/opt/shared.yml"),
            PathBuf::from("/opt/shared.yml")
        );
        assert_eq!(
            resolve_include_path(Path::new("server.yml"), "override.yml"),
            PathBuf::from("override.yml")
        );
    }

    #[test]
    fn test_no_include_returns_mapping_unchanged() {
        let base = parse_str("a: 1\n", Path::new("server.yml"), &[]).unwrap();
        let resolved = resolve(base.clone(), Path::new("server.yml"), &[]).unwrap();
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_include_overrides_base_and_is_removed() {
        let tmp = TempDir::new().expect("tmp");
        let base_path = tmp.path().join("server.yml");
        fs::write(&base_path, "k: 1\nother: kept\ninclude: override.yml\n").expect("write");
        fs::write(tmp.path().join("override.yml"), "k: 2\n").expect("write");

        let base = parse_file(&base_path, &[]).unwrap();
        let resolved = resolve(base, &base_path, &[]).unwrap();
        assert_eq!(resolved["k"], Value::Integer(2));
        assert_eq!(resolved["other"], Value::from("kept"));
        assert!(!resolved.contains_key(INCLUDE_KEY));
    }

    #[test]
    fn test_nested_values_replaced_wholesale() {
        let tmp = TempDir::new().expect("tmp");
        let base_path = tmp.path().join("server.yml");
        fs::write(
            &base_path,
            "server:\n  host: localhost\n  port: 80\nlist: [1, 2, 3]\ninclude: o.yml\n",
        )
        .expect("write");
        fs::write(tmp.path().join("o.yml"), "server:\n  port: 81\nlist: [4]\n").expect("write");

        let base = parse_file(&base_path, &[]).unwrap();
        let resolved = resolve(base, &base_path, &[]).unwrap();
        assert_eq!(resolved["server"], value("{port: 81}"));
        assert_eq!(resolved["list"], value("[4]"));
    }

    #[test]
    fn test_self_include_is_cycle() {
        let tmp = TempDir::new().expect("tmp");
        let base_path = tmp.path().join("loop.yml");
        fs::write(&base_path, "include: loop.yml\n").expect("write");

        let base = parse_file(&base_path, &[]).unwrap();
        let err = resolve(base, &base_path, &[]).unwrap_err();
        match err {
            ConfigError::IncludeCycle { chain, .. } => assert_eq!(chain.len(), 2),
            other => panic!("expected IncludeCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_include_propagates_read_error() {
        let tmp = TempDir::new().expect("tmp");
        let base_path = tmp.path().join("server.yml");
        fs::write(&base_path, "a: 1\ninclude: [missing.yml]\n").expect("write");

        let base = parse_file(&base_path, &[]).unwrap();
        let err = resolve(base, &base_path, &[]).unwrap_err();
        match err {
            ConfigError::FileRead { path, .. } => assert_eq!(path, tmp.path().join("missing.yml")),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }
}

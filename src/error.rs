//! Structured error types for configuration loading and lookup.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Load errors
    ConfigFileNotFound,
    FileReadError,
    ParseError,
    InvalidIncludeType,
    IncludeCycle,

    // Lookup errors
    KeyNotFound,
    TypeMismatch,
}

/// Errors produced while loading a config file or reading values out of it.
///
/// Every load error is terminal: the first one raised anywhere in the
/// include tree aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config file {} must contain a mapping at the top level, found {found}", path.display())]
    NotAMapping { path: PathBuf, found: String },

    #[error("config item \"include\" in {} must be of type `string` or `[]string`, found {found}", path.display())]
    InvalidIncludeType { path: PathBuf, found: String },

    #[error("include cycle detected at {}: {}", path.display(), format_chain(chain))]
    IncludeCycle { path: PathBuf, chain: Vec<PathBuf> },

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("config item \"{key}\" must be of type {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::ConfigFileNotFound { .. } => ErrorCode::ConfigFileNotFound,
            ConfigError::FileRead { .. } => ErrorCode::FileReadError,
            ConfigError::Parse { .. } | ConfigError::NotAMapping { .. } => ErrorCode::ParseError,
            ConfigError::InvalidIncludeType { .. } => ErrorCode::InvalidIncludeType,
            ConfigError::IncludeCycle { .. } => ErrorCode::IncludeCycle,
            ConfigError::KeyNotFound { .. } => ErrorCode::KeyNotFound,
            ConfigError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
        }
    }

    /// The file the error originated from, for load errors.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::ConfigFileNotFound { path }
            | ConfigError::FileRead { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::NotAMapping { path, .. }
            | ConfigError::InvalidIncludeType { path, .. }
            | ConfigError::IncludeCycle { path, .. } => Some(path),
            ConfigError::KeyNotFound { .. } | ConfigError::TypeMismatch { .. } => None,
        }
    }

    // Convenience constructors

    pub fn key_not_found(key: &str) -> Self {
        ConfigError::KeyNotFound {
            key: key.to_string(),
        }
    }

    pub fn type_mismatch(key: &str, expected: &'static str, found: &'static str) -> Self {
        ConfigError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }
}

/// Machine-readable error report, printed by the binary with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Absent when the failure did not come from config loading or lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ErrorReport {
    /// Build a report from an error chain, taking the code and path from the
    /// first [`ConfigError`] found in it.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let config = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<ConfigError>());
        Self {
            code: config.map(ConfigError::code),
            message: format!("{:#}", err),
            path: config.and_then(ConfigError::path).map(Path::to_path_buf),
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::InvalidIncludeType).unwrap();
        assert_eq!(json, "\"INVALID_INCLUDE_TYPE\"");
    }

    #[test]
    fn test_not_a_mapping_reports_as_parse_error() {
        let err = ConfigError::NotAMapping {
            path: PathBuf::from("/etc/app/server.yml"),
            found: "sequence".into(),
        };
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert_eq!(err.path(), Some(Path::new("/etc/app/server.yml")));
    }

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = ConfigError::IncludeCycle {
            path: PathBuf::from("a.yml"),
            chain: vec![PathBuf::from("a.yml"), PathBuf::from("b.yml"), PathBuf::from("a.yml")],
        };
        assert_eq!(
            err.to_string(),
            "include cycle detected at a.yml: a.yml -> b.yml -> a.yml"
        );
    }

    #[test]
    fn test_lookup_errors_have_no_path() {
        let err = ConfigError::type_mismatch("listen-http", "string", "integer");
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
        assert!(err.path().is_none());
        assert_eq!(
            err.to_string(),
            "config item \"listen-http\" must be of type string, found integer"
        );
    }

    #[test]
    fn test_report_carries_code_and_path_through_context() {
        let err = anyhow::Error::new(ConfigError::ConfigFileNotFound {
            path: PathBuf::from("/etc/app/server.yml"),
        })
        .context("Failed loading config from /etc/app/server.yml");
        let json = serde_json::to_value(ErrorReport::from_anyhow(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "CONFIG_FILE_NOT_FOUND",
                "message": "Failed loading config from /etc/app/server.yml: config file /etc/app/server.yml does not exist",
                "path": "/etc/app/server.yml",
            })
        );
    }

    #[test]
    fn test_report_without_config_error_omits_code() {
        let err = anyhow::anyhow!("Unknown output format 'toml'");
        let json = serde_json::to_value(ErrorReport::from_anyhow(&err)).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Unknown output format 'toml'" }));
    }

    #[test]
    fn test_report_from_lookup_error() {
        let report = ErrorReport::from_anyhow(&ConfigError::key_not_found("base-url").into());
        assert_eq!(report.code, Some(ErrorCode::KeyNotFound));
        assert_eq!(report.message, "key not found: base-url");
        assert!(report.path.is_none());
    }
}

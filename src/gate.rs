//! Deciding whether a config file is loaded at all, and loading it.

use crate::descriptor::OptionRegistry;
use crate::error::{ConfigError, Result};
use crate::include;
use crate::parser::parse_file;
use crate::source::MergedSource;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file for the `flagfile` binary.
pub const CONFIG_ENV_VAR: &str = "FLAGFILE_CONFIG";

/// What to do with a config-file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The path was explicitly requested but is missing.
    Fail,
    /// The path is an optional default location that is missing.
    Skip,
    /// The file exists.
    Load,
}

/// Decide what to do given whether the path was explicitly supplied and
/// whether it exists.
pub fn decide(explicit: bool, exists: bool) -> GateDecision {
    match (explicit, exists) {
        (_, true) => GateDecision::Load,
        (true, false) => GateDecision::Fail,
        (false, false) => GateDecision::Skip,
    }
}

/// A config-file path together with whether the user asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileArg {
    pub path: PathBuf,
    pub explicit: bool,
}

impl ConfigFileArg {
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: true,
        }
    }

    pub fn default_location(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: false,
        }
    }

    /// Pick the config path: a flag value wins, then [`CONFIG_ENV_VAR`],
    /// then the default location. Flag and environment values count as
    /// explicit.
    pub fn discover(flag: Option<&Path>) -> Self {
        Self::discover_with(flag, std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
    }

    /// Like [`ConfigFileArg::discover`], with the environment value supplied.
    pub fn discover_with(flag: Option<&Path>, env: Option<PathBuf>) -> Self {
        if let Some(path) = flag {
            return Self::explicit(path);
        }
        match env {
            Some(path) if !path.as_os_str().is_empty() => Self::explicit(path),
            _ => Self::default_location(default_config_path()),
        }
    }

    /// Load this config file through the gate.
    pub fn load<R: OptionRegistry + ?Sized>(&self, registry: &R) -> Result<MergedSource> {
        load_config_file(&self.path, self.explicit, registry)
    }
}

/// Default config location: `<config dir>/flagfile/config.yml`, falling
/// back to `./flagfile.yml` when the platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("flagfile").join("config.yml"))
        .unwrap_or_else(|| PathBuf::from("flagfile.yml"))
}

/// Load `path` if the gate allows it.
///
/// A missing explicit path fails with [`ConfigError::ConfigFileNotFound`];
/// a missing default path yields an empty source.
pub fn load_config_file<R: OptionRegistry + ?Sized>(
    path: &Path,
    explicit: bool,
    registry: &R,
) -> Result<MergedSource> {
    match decide(explicit, path.exists()) {
        GateDecision::Fail => Err(ConfigError::ConfigFileNotFound {
            path: path.to_path_buf(),
        }),
        GateDecision::Skip => {
            debug!(path = %path.display(), "Default config file not found, skipping");
            Ok(MergedSource::empty())
        }
        GateDecision::Load => load_source(path, registry),
    }
}

/// Parse `path`, resolve its includes and wrap the result.
pub fn load_source<R: OptionRegistry + ?Sized>(path: &Path, registry: &R) -> Result<MergedSource> {
    let descriptors = registry.descriptors();
    let base = parse_file(path, descriptors)?;
    let merged = include::resolve(base, path, descriptors)?;
    debug!(path = %path.display(), keys = merged.len(), "Loaded config");
    Ok(MergedSource::new(merged, path))
}

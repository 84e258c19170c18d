//! Precedence stack applied on top of a loaded config file.
//!
//! A flag-binding layer fills each option from the highest tier that has a
//! value: explicit command-line values, then environment variables, then the
//! config file, then the option's built-in default.

use crate::descriptor::{OptionDescriptor, OptionRegistry};
use crate::error::{ConfigError, Result};
use crate::source::{KeyValueSource, MergedSource};
use std::collections::HashMap;

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in default (lowest priority)
    Defaults = 0,
    /// Config file, including its includes
    File = 1,
    /// Environment variables
    Environment = 2,
    /// Explicitly set on the command line (highest priority)
    Explicit = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "default"),
            ConfigTier::File => write!(f, "file"),
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::Explicit => write!(f, "command line"),
        }
    }
}

/// A resolved option value and the tier it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub tier: ConfigTier,
    /// Set when the value came from an environment variable.
    pub env_var: Option<String>,
}

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// Layers explicit values and environment variables over a [`MergedSource`].
pub struct Overlay<'a, R: OptionRegistry + ?Sized> {
    registry: &'a R,
    file: &'a MergedSource,
    explicit: HashMap<String, String>,
    env: EnvLookup<'a>,
}

impl<'a, R: OptionRegistry + ?Sized> Overlay<'a, R> {
    pub fn new(registry: &'a R, file: &'a MergedSource) -> Self {
        Self {
            registry,
            file,
            explicit: HashMap::new(),
            env: Box::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Record a value explicitly set on the command line.
    pub fn with_explicit(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.explicit.insert(name.into(), value.into());
        self
    }

    /// Replace the environment lookup (the process environment by default).
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Resolve `name`, surfacing a file value of the wrong type as
    /// [`ConfigError::TypeMismatch`]. Unknown options resolve only from the
    /// explicit and file tiers.
    pub fn try_resolve(&self, name: &str) -> Result<Option<Resolved>> {
        if let Some(value) = self.explicit.get(name) {
            return Ok(Some(Resolved {
                value: value.clone(),
                tier: ConfigTier::Explicit,
                env_var: None,
            }));
        }

        let descriptor = self.registry.find(name);
        if let Some(resolved) = descriptor.and_then(|d| self.from_env(d)) {
            return Ok(Some(resolved));
        }

        if self.file.is_set(name) {
            let value = self.file.get_string(name)?;
            return Ok(Some(Resolved {
                value,
                tier: ConfigTier::File,
                env_var: None,
            }));
        }

        Ok(descriptor
            .and_then(|d| d.default.clone())
            .map(|value| Resolved {
                value,
                tier: ConfigTier::Defaults,
                env_var: None,
            }))
    }

    /// Resolve `name`, treating a mistyped file value as absent.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        match self.try_resolve(name) {
            Ok(resolved) => resolved,
            Err(ConfigError::TypeMismatch { .. }) => self
                .registry
                .find(name)
                .and_then(|d| d.default.clone())
                .map(|value| Resolved {
                    value,
                    tier: ConfigTier::Defaults,
                    env_var: None,
                }),
            Err(_) => None,
        }
    }

    /// Resolve every registered option that has a value in some tier.
    pub fn resolve_all(&self) -> Result<Vec<(String, Resolved)>> {
        let mut out = Vec::new();
        for descriptor in self.registry.descriptors() {
            if let Some(resolved) = self.try_resolve(&descriptor.canonical)? {
                out.push((descriptor.canonical.clone(), resolved));
            }
        }
        Ok(out)
    }

    /// Explicit names that match no declared option, sorted. `resolve_all`
    /// never reports these, so callers should reject them up front.
    pub fn undeclared_explicit(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .explicit
            .keys()
            .map(String::as_str)
            .filter(|name| self.registry.find(name).is_none())
            .collect();
        names.sort_unstable();
        names
    }

    fn from_env(&self, descriptor: &OptionDescriptor) -> Option<Resolved> {
        descriptor.env.iter().find_map(|var| {
            (self.env)(var).map(|value| Resolved {
                value,
                tier: ConfigTier::Environment,
                env_var: Some(var.clone()),
            })
        })
    }
}

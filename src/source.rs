//! The merged, read-only key/value view handed to the flag-binding layer.

use crate::error::{ConfigError, Result};
use crate::value::{RawMapping, Value};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Narrow lookup interface a flag framework adapts to.
pub trait KeyValueSource {
    /// Look up a string value by canonical key.
    fn get_string(&self, key: &str) -> Result<String>;

    /// Whether the source holds a value for `key`.
    fn is_set(&self, key: &str) -> bool;
}

/// Result of loading one config file and all of its includes.
///
/// Immutable once built. Lookups are by canonical key; a key containing
/// dots that is not present verbatim is looked up through nested mappings
/// (`server.port` reads `port` inside `server`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedSource {
    values: RawMapping,
    #[serde(skip)]
    origin: Option<PathBuf>,
}

impl MergedSource {
    /// A source with no values, used when no config file is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(values: RawMapping, origin: impl Into<PathBuf>) -> Self {
        Self {
            values,
            origin: Some(origin.into()),
        }
    }

    /// The top-level file this source was loaded from.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn as_mapping(&self) -> &RawMapping {
        &self.values
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Raw value for `key`, or [`ConfigError::KeyNotFound`].
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.lookup(key).ok_or_else(|| ConfigError::key_not_found(key))
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        let value = self.get(key)?;
        value
            .as_str()
            .ok_or_else(|| ConfigError::type_mismatch(key, "string", value.type_name()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        value
            .as_bool()
            .ok_or_else(|| ConfigError::type_mismatch(key, "bool", value.type_name()))
    }

    pub fn get_i64(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        value
            .as_i64()
            .ok_or_else(|| ConfigError::type_mismatch(key, "integer", value.type_name()))
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        value
            .as_f64()
            .ok_or_else(|| ConfigError::type_mismatch(key, "float", value.type_name()))
    }

    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
        let value = self.get(key)?;
        value
            .as_string_sequence()
            .ok_or_else(|| ConfigError::type_mismatch(key, "[]string", value.type_name()))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(key) {
            return Some(value);
        }
        if !key.contains('.') {
            return None;
        }

        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_mapping()?.get(part)?;
        }
        Some(current)
    }
}

impl KeyValueSource for MergedSource {
    fn get_string(&self, key: &str) -> Result<String> {
        self.get_str(key).map(str::to_string)
    }

    fn is_set(&self, key: &str) -> bool {
        self.contains(key)
    }
}

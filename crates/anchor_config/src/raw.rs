//! The persisted key/value document.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use crate::config::EffectConfig;
use crate::error::ConfigError;
use crate::keys;

/// A typed read of one key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Field<T> {
    /// The key is not in the document.
    Absent,
    /// The key holds a value of the requested type.
    Present(T),
    /// The key holds something else, rendered for diagnostics.
    Mistyped(String),
}

/// An unvalidated configuration document.
///
/// Values keep whatever JSON type they were written with; type and range
/// checks happen in [`load`](crate::load).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    values: Map<String, Value>,
}

impl RawConfig {
    /// An empty document. Every key reads as absent.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// The document written when no config file exists yet.
    #[must_use]
    pub fn default_document() -> Self {
        let defaults = EffectConfig::default();
        Self::new()
            .with(keys::ANCHOR_BLOCK_TYPE, defaults.anchor_block.name())
            .with(keys::ACTIVATION_ITEM_TYPE, defaults.activation_item.name())
            .with(keys::EFFECT_RADIUS, defaults.effect_radius)
            .with(keys::EFFECT_DURATION_TICKS, defaults.effect_duration_ticks)
            .with(keys::EFFECT_AMPLIFIER, defaults.effect_amplifier)
            .with(keys::DISTORTION_TYPE, defaults.distortion.name())
            .with(keys::ENABLE_PARTICLES, defaults.particles_enabled)
            .with(keys::PARTICLE_TYPE, defaults.particle_kind.name())
            .with(keys::PARTICLE_COUNT, defaults.particle_count)
    }

    /// Wrap a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] unless `value` is an object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed JSON and
    /// [`ConfigError::NotAnObject`] for non-object documents.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(contents).map_err(ConfigError::ParseError)?;
        Self::from_value(value)
    }

    /// Read the document at `path`, writing [`default_document`] there first
    /// if the file does not exist.
    ///
    /// [`default_document`]: RawConfig::default_document
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, written, or parsed.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
            let raw = Self::from_json_str(&contents)?;
            info!(path = %path.display(), "read config file");
            Ok(raw)
        } else {
            let raw = Self::default_document();
            raw.save(path)?;
            info!(path = %path.display(), "created default config file");
            Ok(raw)
        }
    }

    /// Write the document to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WriteError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let serialized = serde_json::to_string_pretty(&self.values)
            .map_err(|e| ConfigError::WriteError(e.into()))?;
        std::fs::write(path, serialized).map_err(ConfigError::WriteError)
    }

    /// Set a key, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// The raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub(crate) fn string(&self, key: &str) -> Field<&str> {
        match self.values.get(key) {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(s.as_str()),
            Some(other) => Field::Mistyped(other.to_string()),
        }
    }

    pub(crate) fn integer(&self, key: &str) -> Field<i64> {
        match self.values.get(key) {
            None => Field::Absent,
            Some(value) => match value.as_i64() {
                Some(n) => Field::Present(n),
                None => Field::Mistyped(value.to_string()),
            },
        }
    }

    pub(crate) fn number(&self, key: &str) -> Field<f64> {
        match self.values.get(key) {
            None => Field::Absent,
            Some(value) => match value.as_f64() {
                Some(n) => Field::Present(n),
                None => Field::Mistyped(value.to_string()),
            },
        }
    }

    pub(crate) fn boolean(&self, key: &str) -> Field<bool> {
        match self.values.get(key) {
            None => Field::Absent,
            Some(Value::Bool(b)) => Field::Present(*b),
            Some(other) => Field::Mistyped(other.to_string()),
        }
    }
}

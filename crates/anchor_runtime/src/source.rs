//! Where configuration documents come from.

use std::path::{Path, PathBuf};

use anchor_config::{ConfigError, RawConfig};

/// Produces a fresh [`RawConfig`] each time the configuration is (re)loaded.
pub trait ConfigSource: Send {
    /// Read the current document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document cannot be read or parsed.
    fn read(&mut self) -> Result<RawConfig, ConfigError>;
}

/// A JSON file on disk, created with defaults on first read.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn read(&mut self) -> Result<RawConfig, ConfigError> {
        RawConfig::load_or_create(&self.path)
    }
}

impl<F> ConfigSource for F
where
    F: FnMut() -> Result<RawConfig, ConfigError> + Send,
{
    fn read(&mut self) -> Result<RawConfig, ConfigError> {
        self()
    }
}

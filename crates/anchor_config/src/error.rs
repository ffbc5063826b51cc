//! Configuration error types.

/// Errors that abort a configuration load.
///
/// Only these are fatal. Every other bad value is defaulted and reported as
/// a [`ConfigWarning`](crate::ConfigWarning).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the default config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The config file is not valid JSON.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] serde_json::Error),

    /// The config document is valid JSON but not an object.
    #[error("config document must be a JSON object")]
    NotAnObject,

    /// A block or item type key names no known material.
    #[error("invalid material '{value}' for '{key}'")]
    InvalidMaterial {
        /// The offending key.
        key: &'static str,
        /// The value as written in the document.
        value: String,
    },
}

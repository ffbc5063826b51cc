//! # anchor_config
//!
//! Tunable parameters for the distortion scheduler.
//!
//! - [`RawConfig`]: the persisted key/value document, read with per-key
//!   defaults.
//! - [`EffectConfig`]: the validated, immutable snapshot the scheduler
//!   runs on.
//! - [`load`]: turns a [`RawConfig`] into an [`EffectConfig`], defaulting
//!   bad fields one at a time and collecting a [`ConfigWarning`] for each.

mod config;
mod error;
pub mod keys;
mod loader;
mod raw;

pub use config::EffectConfig;
pub use error::ConfigError;
pub use loader::{ConfigWarning, LoadedConfig, load};
pub use raw::RawConfig;

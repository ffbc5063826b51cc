//! Validating loader: [`RawConfig`] → [`EffectConfig`].
//!
//! Material keys are all-or-nothing: an unknown block or item name fails the
//! whole load, because the anchor system cannot work without them. Every
//! other key is checked on its own and falls back to its default with one
//! [`ConfigWarning`] when the stored value is unusable.

use anchor_core::{DistortionKind, Material, ParticleKind};
use tracing::{info, warn};

use crate::config::EffectConfig;
use crate::error::ConfigError;
use crate::keys;
use crate::raw::{Field, RawConfig};

/// A field that was replaced by its default during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The key whose value was rejected.
    pub key: &'static str,
    /// The rejected value, as written.
    pub found: String,
    /// Why it was rejected.
    pub reason: &'static str,
    /// The default used instead.
    pub fallback: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (found {}), using default {}",
            self.key, self.reason, self.found, self.fallback
        )
    }
}

/// The outcome of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: EffectConfig,
    /// One entry per defaulted field, in key order.
    pub warnings: Vec<ConfigWarning>,
}

/// Validate `raw` into an [`EffectConfig`].
///
/// Each defaulted field is logged at warn level and returned in
/// [`LoadedConfig::warnings`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidMaterial`] if the anchor block or
/// activation item names no known material.
pub fn load(raw: &RawConfig) -> Result<LoadedConfig, ConfigError> {
    let mut warnings = Vec::new();
    let defaults = EffectConfig::default();

    let anchor_block = material(raw, keys::ANCHOR_BLOCK_TYPE, defaults.anchor_block)?;
    let activation_item = material(raw, keys::ACTIVATION_ITEM_TYPE, defaults.activation_item)?;

    let effect_radius = match raw.number(keys::EFFECT_RADIUS) {
        Field::Absent => defaults.effect_radius,
        Field::Present(r) => r,
        Field::Mistyped(found) => {
            warnings.push(rejected(
                keys::EFFECT_RADIUS,
                found,
                "not a number",
                defaults.effect_radius,
            ));
            defaults.effect_radius
        }
    };

    let effect_duration_ticks = bounded(
        raw,
        keys::EFFECT_DURATION_TICKS,
        1,
        "must be at least 1",
        defaults.effect_duration_ticks,
        &mut warnings,
    );

    let effect_amplifier = bounded(
        raw,
        keys::EFFECT_AMPLIFIER,
        0,
        "cannot be negative",
        defaults.effect_amplifier,
        &mut warnings,
    );

    let distortion = named(
        raw,
        keys::DISTORTION_TYPE,
        DistortionKind::from_name,
        "must be SLOW or FAST",
        defaults.distortion,
        &mut warnings,
    );

    let particles_enabled = match raw.boolean(keys::ENABLE_PARTICLES) {
        Field::Absent => defaults.particles_enabled,
        Field::Present(b) => b,
        Field::Mistyped(found) => {
            warnings.push(rejected(
                keys::ENABLE_PARTICLES,
                found,
                "not a boolean",
                defaults.particles_enabled,
            ));
            defaults.particles_enabled
        }
    };

    let particle_kind = named(
        raw,
        keys::PARTICLE_TYPE,
        ParticleKind::from_name,
        "unknown particle type",
        defaults.particle_kind,
        &mut warnings,
    );

    let particle_count = bounded(
        raw,
        keys::PARTICLE_COUNT,
        0,
        "cannot be negative",
        defaults.particle_count,
        &mut warnings,
    );

    for warning in &warnings {
        warn!(
            key = warning.key,
            found = %warning.found,
            fallback = %warning.fallback,
            "{}",
            warning.reason
        );
    }

    let config = EffectConfig {
        anchor_block,
        activation_item,
        effect_radius,
        effect_duration_ticks,
        effect_amplifier,
        distortion,
        particles_enabled,
        particle_kind,
        particle_count,
    };
    info!(
        anchor_block = %config.anchor_block,
        activation_item = %config.activation_item,
        radius = config.effect_radius,
        duration_ticks = config.effect_duration_ticks,
        amplifier = config.effect_amplifier,
        distortion = %config.distortion,
        warnings = warnings.len(),
        "configuration loaded"
    );

    Ok(LoadedConfig { config, warnings })
}

fn rejected(
    key: &'static str,
    found: impl Into<String>,
    reason: &'static str,
    fallback: impl std::fmt::Display,
) -> ConfigWarning {
    ConfigWarning {
        key,
        found: found.into(),
        reason,
        fallback: fallback.to_string(),
    }
}

fn material(raw: &RawConfig, key: &'static str, default: Material) -> Result<Material, ConfigError> {
    match raw.string(key) {
        Field::Absent => Ok(default),
        Field::Present(name) => {
            Material::from_name(name).ok_or_else(|| ConfigError::InvalidMaterial {
                key,
                value: name.to_string(),
            })
        }
        Field::Mistyped(value) => Err(ConfigError::InvalidMaterial { key, value }),
    }
}

/// Read an integer key that must be at least `min` and fit in a `u32`.
fn bounded(
    raw: &RawConfig,
    key: &'static str,
    min: i64,
    reason: &'static str,
    default: u32,
    warnings: &mut Vec<ConfigWarning>,
) -> u32 {
    match raw.integer(key) {
        Field::Absent => default,
        Field::Present(n) if n < min => {
            warnings.push(rejected(key, n.to_string(), reason, default));
            default
        }
        Field::Present(n) => match u32::try_from(n) {
            Ok(v) => v,
            Err(_) => {
                warnings.push(rejected(key, n.to_string(), "out of range", default));
                default
            }
        },
        Field::Mistyped(found) => {
            warnings.push(rejected(key, found, "not an integer", default));
            default
        }
    }
}

fn named<K: Copy + std::fmt::Display>(
    raw: &RawConfig,
    key: &'static str,
    parse: fn(&str) -> Option<K>,
    reason: &'static str,
    default: K,
    warnings: &mut Vec<ConfigWarning>,
) -> K {
    match raw.string(key) {
        Field::Absent => default,
        Field::Present(name) => parse(name).unwrap_or_else(|| {
            warnings.push(rejected(key, name, reason, default));
            default
        }),
        Field::Mistyped(found) => {
            warnings.push(rejected(key, found, "not a string", default));
            default
        }
    }
}

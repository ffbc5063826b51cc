//! The validated effect configuration.

use anchor_core::{
    DistortionKind, EffectApplication, Location, Material, PARTICLE_SPEED, ParticleBurst,
    ParticleKind,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Fraction of the effect radius used as particle spread.
const PARTICLE_SPREAD_FACTOR: f64 = 0.8;

/// An immutable snapshot of every tunable parameter.
///
/// A reload builds a whole new `EffectConfig` and swaps it in; a running
/// cycle always sees one consistent snapshot. Share it as
/// `Arc<EffectConfig>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Block kind that can become an anchor.
    pub anchor_block: Material,
    /// Item kind that toggles an anchor when used on it.
    pub activation_item: Material,
    /// Half extent of the selection cube. Negative values select nothing.
    pub effect_radius: f64,
    /// Effect duration and scheduler interval, in ticks. Always at least 1.
    pub effect_duration_ticks: u32,
    /// Zero-based effect level.
    pub effect_amplifier: u32,
    pub distortion: DistortionKind,
    pub particles_enabled: bool,
    pub particle_kind: ParticleKind,
    pub particle_count: u32,
}

impl EffectConfig {
    pub const DEFAULT_RADIUS: f64 = 8.0;
    pub const DEFAULT_DURATION_TICKS: u32 = 40;
    pub const DEFAULT_AMPLIFIER: u32 = 1;
    pub const DEFAULT_PARTICLE_COUNT: u32 = 10;

    /// The effect applied to each living target.
    #[must_use]
    pub fn effect_application(&self) -> EffectApplication {
        EffectApplication {
            effect: self.distortion.effect(),
            duration_ticks: self.effect_duration_ticks,
            amplifier: self.effect_amplifier,
            ambient: true,
            show_particles: false,
        }
    }

    /// Half extents of the selection cube; the radius applies to each axis
    /// independently.
    #[must_use]
    pub fn half_extents(&self) -> DVec3 {
        DVec3::splat(self.effect_radius)
    }

    /// The particle burst rendered above `anchor`.
    #[must_use]
    pub fn particle_burst(&self, anchor: &Location) -> ParticleBurst {
        ParticleBurst {
            kind: self.particle_kind,
            origin: anchor.particle_origin(),
            count: self.particle_count,
            spread: DVec3::splat(self.effect_radius * PARTICLE_SPREAD_FACTOR),
            speed: PARTICLE_SPEED,
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            anchor_block: Material::Beacon,
            activation_item: Material::Clock,
            effect_radius: Self::DEFAULT_RADIUS,
            effect_duration_ticks: Self::DEFAULT_DURATION_TICKS,
            effect_amplifier: Self::DEFAULT_AMPLIFIER,
            distortion: DistortionKind::Slow,
            particles_enabled: true,
            particle_kind: ParticleKind::Portal,
            particle_count: Self::DEFAULT_PARTICLE_COUNT,
        }
    }
}

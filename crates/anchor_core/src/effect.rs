//! Requests handed to the host world.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::kinds::{ParticleKind, StatusEffect};

/// Speed passed with every anchor particle burst.
pub const PARTICLE_SPEED: f64 = 0.01;

/// A status effect to apply to one living entity.
///
/// Applying an effect of the same [`StatusEffect`] replaces whatever the
/// entity already carries; effects never stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectApplication {
    /// The effect to apply.
    pub effect: StatusEffect,
    /// How long the effect lasts, in ticks.
    pub duration_ticks: u32,
    /// Zero-based effect level.
    pub amplifier: u32,
    /// Whether the effect is ambient (sourced from the environment).
    pub ambient: bool,
    /// Whether the effect renders its own particles.
    pub show_particles: bool,
}

/// A decorative particle burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleBurst {
    pub kind: ParticleKind,
    /// Centre of the burst in world space.
    pub origin: DVec3,
    pub count: u32,
    /// Random offset range on each axis.
    pub spread: DVec3,
    pub speed: f64,
}

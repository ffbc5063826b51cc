//! Recognised configuration keys.

pub const ANCHOR_BLOCK_TYPE: &str = "anchor-block-type";
pub const ACTIVATION_ITEM_TYPE: &str = "activation-item-type";
pub const EFFECT_RADIUS: &str = "effect-radius";
pub const EFFECT_DURATION_TICKS: &str = "effect-duration-ticks";
pub const EFFECT_AMPLIFIER: &str = "effect-amplifier";
pub const DISTORTION_TYPE: &str = "distortion-type";
pub const ENABLE_PARTICLES: &str = "enable-particles";
pub const PARTICLE_TYPE: &str = "particle-type";
pub const PARTICLE_COUNT: &str = "particle-count";

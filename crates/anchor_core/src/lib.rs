//! # anchor_core
//!
//! The shared vocabulary of the chrono anchor system.
//!
//! This crate provides:
//!
//! - [`Location`] and [`WorldId`]: by-value block addresses.
//! - [`EntityId`]: opaque handles to host entities.
//! - [`Material`], [`DistortionKind`], [`StatusEffect`], [`ParticleKind`]:
//!   closed kind enums parsed through explicit name tables.
//! - [`EffectApplication`] and [`ParticleBurst`]: the requests handed to
//!   the host world.
//! - [`AnchorRegistry`]: the set of active anchors.
//! - [`WorldHost`]: the contract the host simulation implements.

pub mod effect;
pub mod entity;
pub mod error;
pub mod host;
pub mod kinds;
pub mod location;
pub mod registry;

pub use effect::{EffectApplication, PARTICLE_SPEED, ParticleBurst};
pub use entity::EntityId;
pub use error::{HostError, UnknownKind};
pub use host::{WorldHost, WorldInfo};
pub use kinds::{DistortionKind, Material, ParticleKind, StatusEffect};
pub use location::{Location, WorldId};
pub use registry::AnchorRegistry;

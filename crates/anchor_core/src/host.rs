//! The host world contract.
//!
//! The anchor system owns no world state of its own. Block lookups, spatial
//! queries, effect application and particle rendering are all delegated to
//! an implementation of [`WorldHost`].

use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::effect::{EffectApplication, ParticleBurst};
use crate::entity::EntityId;
use crate::error::HostError;
use crate::kinds::Material;
use crate::location::{Location, WorldId};

/// A world that the host reports as currently loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub id: WorldId,
    pub name: String,
}

/// Operations the distortion cycle needs from the host simulation.
///
/// All methods take `&self`; implementations serialise their own mutation.
/// Calls are expected to be synchronous and bounded.
pub trait WorldHost: Send + Sync {
    /// The material of the block at `location`, or `None` when the block
    /// cannot be read (for example because its world is not loaded).
    fn block_kind_at(&self, location: &Location) -> Option<Material>;

    /// Resolve a world identifier to a loaded world.
    fn resolve_world(&self, world: WorldId) -> Option<WorldInfo>;

    /// Entities whose position lies inside the axis-aligned box centred on
    /// `center` with the given half extents.
    ///
    /// A negative half extent on any axis selects nothing.
    fn nearby_entities(&self, world: &WorldInfo, center: DVec3, half_extents: DVec3)
    -> Vec<EntityId>;

    /// Whether the entity can carry status effects.
    fn is_living(&self, entity: EntityId) -> bool;

    /// Apply (or refresh) a status effect on a living entity.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the entity disappeared or the host refused.
    fn apply_status_effect(
        &self,
        entity: EntityId,
        application: &EffectApplication,
    ) -> Result<(), HostError>;

    /// Render a decorative particle burst.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host could not render the burst.
    fn spawn_particles(&self, world: &WorldInfo, burst: &ParticleBurst) -> Result<(), HostError>;
}

impl<T: WorldHost + ?Sized> WorldHost for Arc<T> {
    fn block_kind_at(&self, location: &Location) -> Option<Material> {
        (**self).block_kind_at(location)
    }

    fn resolve_world(&self, world: WorldId) -> Option<WorldInfo> {
        (**self).resolve_world(world)
    }

    fn nearby_entities(
        &self,
        world: &WorldInfo,
        center: DVec3,
        half_extents: DVec3,
    ) -> Vec<EntityId> {
        (**self).nearby_entities(world, center, half_extents)
    }

    fn is_living(&self, entity: EntityId) -> bool {
        (**self).is_living(entity)
    }

    fn apply_status_effect(
        &self,
        entity: EntityId,
        application: &EffectApplication,
    ) -> Result<(), HostError> {
        (**self).apply_status_effect(entity, application)
    }

    fn spawn_particles(&self, world: &WorldInfo, burst: &ParticleBurst) -> Result<(), HostError> {
        (**self).spawn_particles(world, burst)
    }
}

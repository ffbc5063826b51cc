//! In-memory world host.
//!
//! [`SimWorld`] keeps blocks, entities and their active effects in sharded
//! maps, so every [`WorldHost`] method can take `&self`. It backs the
//! console binary and the tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use anchor_core::{
    EffectApplication, EntityId, HostError, Location, Material, ParticleBurst, StatusEffect,
    WorldHost, WorldId, WorldInfo,
};
use dashmap::DashMap;
use glam::DVec3;
use serde::Serialize;

/// An effect currently carried by a simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveEffect {
    pub remaining_ticks: u32,
    pub amplifier: u32,
    pub ambient: bool,
    pub show_particles: bool,
}

/// A simulated entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEntity {
    pub world: WorldId,
    pub position: DVec3,
    /// Whether the entity can carry status effects.
    pub living: bool,
    pub effects: HashMap<StatusEffect, ActiveEffect>,
}

/// A world host that lives entirely in memory.
#[derive(Debug, Default)]
pub struct SimWorld {
    /// Worlds currently loaded.
    loaded: DashMap<WorldId, WorldInfo>,
    /// Every world ever created, loaded or not, by name.
    names: DashMap<String, WorldId>,
    /// Non-air blocks. Survive world unloads.
    blocks: DashMap<Location, Material>,
    entities: DashMap<EntityId, SimEntity>,
    /// The most recent bursts, oldest first, at most [`SimWorld::PARTICLE_LOG`].
    bursts: Mutex<VecDeque<(WorldId, ParticleBurst)>>,
}

impl SimWorld {
    /// How many particle bursts the log keeps.
    pub const PARTICLE_LOG: usize = 256;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the world called `name`, creating it on first use.
    pub fn load_world(&self, name: &str) -> WorldId {
        let id = *self
            .names
            .entry(name.to_string())
            .or_insert_with(WorldId::new_random);
        self.loaded.insert(
            id,
            WorldInfo {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Unload a world. Its blocks are kept for the next load.
    pub fn unload_world(&self, id: WorldId) -> bool {
        self.loaded.remove(&id).is_some()
    }

    /// Place a block. Placing [`Material::Air`] clears the position.
    pub fn set_block(&self, location: Location, material: Material) {
        if material == Material::Air {
            self.blocks.remove(&location);
        } else {
            self.blocks.insert(location, material);
        }
    }

    /// The block at `location`, ignoring whether its world is loaded.
    #[must_use]
    pub fn block(&self, location: &Location) -> Material {
        self.blocks
            .get(location)
            .map_or(Material::Air, |entry| *entry.value())
    }

    /// Spawn an entity at `position`.
    pub fn spawn_entity(&self, world: WorldId, position: DVec3, living: bool) -> EntityId {
        let id = EntityId::new_random();
        self.entities.insert(
            id,
            SimEntity {
                world,
                position,
                living,
                effects: HashMap::new(),
            },
        );
        id
    }

    pub fn despawn(&self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    /// Remove every entity standing inside the block at `block`. Returns how
    /// many were removed.
    pub fn despawn_at(&self, block: &Location) -> usize {
        let inside: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|entry| Location::containing(entry.world, entry.position) == *block)
            .map(|entry| *entry.key())
            .collect();
        inside.into_iter().filter(|&id| self.despawn(id)).count()
    }

    /// All entities, in no particular order.
    #[must_use]
    pub fn entities(&self) -> Vec<(EntityId, SimEntity)> {
        self.entities
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// The effect of kind `effect` the entity carries, if any.
    #[must_use]
    pub fn effect_on(&self, id: EntityId, effect: StatusEffect) -> Option<ActiveEffect> {
        self.entities
            .get(&id)
            .and_then(|entry| entry.effects.get(&effect).copied())
    }

    /// The logged particle bursts, oldest first.
    #[must_use]
    pub fn particle_bursts(&self) -> Vec<(WorldId, ParticleBurst)> {
        self.bursts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Drain the particle log.
    pub fn take_particle_bursts(&self) -> Vec<(WorldId, ParticleBurst)> {
        self.bursts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Let `ticks` ticks pass: effect durations count down and expire.
    pub fn advance(&self, ticks: u32) {
        for mut entry in self.entities.iter_mut() {
            entry.effects.retain(|_, effect| {
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(ticks);
                effect.remaining_ticks > 0
            });
        }
    }
}

impl WorldHost for SimWorld {
    fn block_kind_at(&self, location: &Location) -> Option<Material> {
        self.loaded
            .contains_key(&location.world)
            .then(|| self.block(location))
    }

    fn resolve_world(&self, world: WorldId) -> Option<WorldInfo> {
        self.loaded.get(&world).map(|entry| entry.value().clone())
    }

    fn nearby_entities(
        &self,
        world: &WorldInfo,
        center: DVec3,
        half_extents: DVec3,
    ) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|entry| entry.world == world.id)
            .filter(|entry| {
                let d = (entry.position - center).abs();
                d.cmple(half_extents).all()
            })
            .map(|entry| *entry.key())
            .collect()
    }

    fn is_living(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|entry| entry.living)
    }

    fn apply_status_effect(
        &self,
        entity: EntityId,
        application: &EffectApplication,
    ) -> Result<(), HostError> {
        let mut entry = self
            .entities
            .get_mut(&entity)
            .ok_or(HostError::EntityGone(entity))?;
        if !entry.living {
            return Err(HostError::Rejected(format!(
                "{entity} cannot carry status effects"
            )));
        }
        entry.effects.insert(
            application.effect,
            ActiveEffect {
                remaining_ticks: application.duration_ticks,
                amplifier: application.amplifier,
                ambient: application.ambient,
                show_particles: application.show_particles,
            },
        );
        Ok(())
    }

    fn spawn_particles(&self, world: &WorldInfo, burst: &ParticleBurst) -> Result<(), HostError> {
        if !self.loaded.contains_key(&world.id) {
            return Err(HostError::WorldNotLoaded(world.id));
        }
        let mut log = self.bursts.lock().unwrap_or_else(PoisonError::into_inner);
        if log.len() == Self::PARTICLE_LOG {
            log.pop_front();
        }
        log.push_back((world.id, *burst));
        Ok(())
    }
}

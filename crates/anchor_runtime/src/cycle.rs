//! The distortion cycle: one pass over every active anchor.
//!
//! Per anchor, in order:
//!
//! 1. **Liveness.** If the host reports a block other than the anchor block,
//!    the anchor is dropped from the registry and nothing else happens.
//! 2. **World resolution.** An anchor in an unloaded world is skipped for
//!    this cycle but stays registered.
//! 3. **Targets.** Living entities inside the cube of half extent
//!    `effect_radius` around the anchor.
//! 4. **Effect.** The configured effect is (re)applied to every target.
//! 5. **Particles.** A cosmetic burst above the anchor, if enabled.
//!
//! Anchors are isolated from each other: a collaborator error or panic while
//! processing one anchor is logged and the cycle moves on.

use std::panic::{AssertUnwindSafe, catch_unwind};

use anchor_config::EffectConfig;
use anchor_core::{AnchorRegistry, EntityId, Location, WorldHost, WorldInfo};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to a single anchor during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// The anchor block was gone; the anchor was removed.
    Healed,
    /// The anchor's world was not loaded; skipped this cycle.
    WorldUnavailable,
    /// The effect was applied to `targets` entities.
    Distorted {
        targets: usize,
        /// Whether a particle burst was rendered.
        particles: bool,
    },
}

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Anchors in the snapshot.
    pub anchors: usize,
    pub healed: usize,
    pub skipped: usize,
    /// Anchors whose processing panicked.
    pub failed: usize,
    /// Effect applications that succeeded.
    pub targets: usize,
    /// Effect applications the host refused.
    pub effect_errors: usize,
    pub bursts: usize,
}

/// One execution of the distortion algorithm against a fixed config.
#[derive(Clone, Copy)]
pub struct DistortionCycle<'a> {
    config: &'a EffectConfig,
    registry: &'a AnchorRegistry,
    host: &'a dyn WorldHost,
}

impl<'a> DistortionCycle<'a> {
    #[must_use]
    pub fn new(
        config: &'a EffectConfig,
        registry: &'a AnchorRegistry,
        host: &'a dyn WorldHost,
    ) -> Self {
        Self {
            config,
            registry,
            host,
        }
    }

    /// Process every anchor in a fresh registry snapshot.
    pub fn run(&self) -> CycleReport {
        let anchors = self.registry.snapshot_all();
        let mut report = CycleReport {
            anchors: anchors.len(),
            ..CycleReport::default()
        };

        for anchor in &anchors {
            match catch_unwind(AssertUnwindSafe(|| self.process_anchor(anchor, &mut report))) {
                Ok(AnchorOutcome::Healed) => report.healed += 1,
                Ok(AnchorOutcome::WorldUnavailable) => report.skipped += 1,
                Ok(AnchorOutcome::Distorted { targets, particles }) => {
                    report.targets += targets;
                    if particles {
                        report.bursts += 1;
                    }
                }
                Err(_) => {
                    warn!(%anchor, "anchor processing panicked; continuing with next anchor");
                    report.failed += 1;
                }
            }
        }

        debug!(
            anchors = report.anchors,
            healed = report.healed,
            skipped = report.skipped,
            failed = report.failed,
            targets = report.targets,
            "distortion cycle complete"
        );
        report
    }

    /// Run the per-anchor steps for a single anchor.
    pub fn process_anchor(&self, anchor: &Location, report: &mut CycleReport) -> AnchorOutcome {
        // `None` means the block could not be read; world resolution decides.
        if let Some(kind) = self.host.block_kind_at(anchor)
            && kind != self.config.anchor_block
        {
            if self.registry.remove(anchor) {
                info!(
                    %anchor,
                    found = %kind,
                    expected = %self.config.anchor_block,
                    "anchor block no longer present; anchor removed"
                );
            }
            return AnchorOutcome::Healed;
        }

        let Some(world) = self.host.resolve_world(anchor.world) else {
            warn!(%anchor, "anchor world is not loaded; skipping this cycle");
            return AnchorOutcome::WorldUnavailable;
        };

        let targets = self.select_targets(&world, anchor);
        let application = self.config.effect_application();
        let mut applied = 0;
        for entity in targets {
            match self.host.apply_status_effect(entity, &application) {
                Ok(()) => applied += 1,
                Err(e) => {
                    warn!(%anchor, %entity, error = %e, "failed to apply distortion effect");
                    report.effect_errors += 1;
                }
            }
        }

        let particles = self.config.particles_enabled && self.emit_particles(&world, anchor);

        AnchorOutcome::Distorted {
            targets: applied,
            particles,
        }
    }

    /// Living entities inside the selection cube.
    fn select_targets(&self, world: &WorldInfo, anchor: &Location) -> Vec<EntityId> {
        let radius = self.config.effect_radius;
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        self.host
            .nearby_entities(world, anchor.corner(), self.config.half_extents())
            .into_iter()
            .filter(|&entity| self.host.is_living(entity))
            .collect()
    }

    fn emit_particles(&self, world: &WorldInfo, anchor: &Location) -> bool {
        let burst = self.config.particle_burst(anchor);
        match self.host.spawn_particles(world, &burst) {
            Ok(()) => true,
            Err(e) => {
                warn!(%anchor, error = %e, "failed to spawn anchor particles");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anchor_core::{
        EffectApplication, HostError, Material, ParticleBurst, StatusEffect, WorldId,
    };
    use glam::DVec3;

    use super::*;
    use crate::sim::SimWorld;

    struct Fixture {
        sim: SimWorld,
        registry: AnchorRegistry,
        config: EffectConfig,
        world: WorldId,
    }

    impl Fixture {
        fn new() -> Self {
            let sim = SimWorld::new();
            let world = sim.load_world("overworld");
            Self {
                sim,
                registry: AnchorRegistry::new(),
                config: EffectConfig::default(),
                world,
            }
        }

        fn anchor(&self, x: i32, y: i32, z: i32) -> Location {
            let loc = Location::new(self.world, x, y, z);
            self.sim.set_block(loc, Material::Beacon);
            self.registry.add(loc);
            loc
        }

        fn run(&self) -> CycleReport {
            DistortionCycle::new(&self.config, &self.registry, &self.sim).run()
        }
    }

    #[test]
    fn test_living_entities_receive_effect() {
        let fx = Fixture::new();
        fx.anchor(0, 64, 0);
        let zombie = fx.sim.spawn_entity(fx.world, DVec3::new(2.0, 64.0, 1.0), true);
        let item = fx.sim.spawn_entity(fx.world, DVec3::new(1.0, 64.0, 1.0), false);

        let report = fx.run();

        assert_eq!(report.targets, 1);
        assert_eq!(report.bursts, 1);
        let effect = fx.sim.effect_on(zombie, StatusEffect::Slowness).unwrap();
        assert_eq!(effect.remaining_ticks, 40);
        assert_eq!(effect.amplifier, 1);
        assert!(effect.ambient);
        assert!(!effect.show_particles);
        assert!(fx.sim.effect_on(item, StatusEffect::Slowness).is_none());
    }

    #[test]
    fn test_stale_anchor_is_removed_without_effect() {
        let fx = Fixture::new();
        let anchor = fx.anchor(0, 64, 0);
        let cow = fx.sim.spawn_entity(fx.world, DVec3::new(1.0, 64.0, 1.0), true);
        fx.sim.set_block(anchor, Material::Stone);

        let report = fx.run();

        assert_eq!(report.healed, 1);
        assert!(!fx.registry.contains(&anchor));
        assert!(fx.sim.effect_on(cow, StatusEffect::Slowness).is_none());
        assert!(fx.sim.particle_bursts().is_empty());
    }

    #[test]
    fn test_selection_is_a_cube() {
        let mut fx = Fixture::new();
        fx.config.effect_radius = 5.0;
        fx.config.particles_enabled = false;
        fx.anchor(0, 0, 0);
        let outside = fx.sim.spawn_entity(fx.world, DVec3::new(6.0, 0.0, 0.0), true);
        let corner = fx.sim.spawn_entity(fx.world, DVec3::new(4.0, 4.0, 4.0), true);

        fx.run();

        assert!(fx.sim.effect_on(outside, StatusEffect::Slowness).is_none());
        assert!(
            fx.sim.effect_on(corner, StatusEffect::Slowness).is_some(),
            "(4,4,4) lies outside a sphere of radius 5 but inside the cube"
        );
    }

    #[test]
    fn test_negative_radius_selects_nothing() {
        let mut fx = Fixture::new();
        fx.config.effect_radius = -1.0;
        fx.anchor(0, 0, 0);
        let on_top = fx.sim.spawn_entity(fx.world, DVec3::ZERO, true);

        let report = fx.run();

        assert_eq!(report.targets, 0);
        assert!(fx.sim.effect_on(on_top, StatusEffect::Slowness).is_none());
    }

    #[test]
    fn test_unloaded_world_does_not_block_other_anchors() {
        let fx = Fixture::new();
        let other = fx.sim.load_world("nether");
        let stranded = Location::new(other, 0, 64, 0);
        fx.sim.set_block(stranded, Material::Beacon);
        fx.registry.add(stranded);
        fx.sim.unload_world(other);

        fx.anchor(100, 64, 100);
        let target = fx.sim.spawn_entity(fx.world, DVec3::new(101.0, 64.0, 99.0), true);

        let report = fx.run();

        assert_eq!(report.skipped, 1);
        assert!(fx.registry.contains(&stranded), "skipped anchors stay registered");
        assert!(fx.sim.effect_on(target, StatusEffect::Slowness).is_some());
        assert_eq!(fx.sim.particle_bursts().len(), 1);
    }

    #[test]
    fn test_reapplication_refreshes_instead_of_stacking() {
        let fx = Fixture::new();
        let entity = fx.sim.spawn_entity(fx.world, DVec3::ZERO, true);
        let app = fx.config.effect_application();

        fx.sim.apply_status_effect(entity, &app).unwrap();
        let once = fx.sim.effect_on(entity, StatusEffect::Slowness).unwrap();
        fx.sim.apply_status_effect(entity, &app).unwrap();
        let twice = fx.sim.effect_on(entity, StatusEffect::Slowness).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_overlapping_anchors_apply_same_effect() {
        let fx = Fixture::new();
        fx.anchor(0, 64, 0);
        fx.anchor(2, 64, 0);
        let entity = fx.sim.spawn_entity(fx.world, DVec3::new(1.0, 64.0, 0.0), true);

        let report = fx.run();

        assert_eq!(report.targets, 2);
        let effect = fx.sim.effect_on(entity, StatusEffect::Slowness).unwrap();
        assert_eq!(effect.remaining_ticks, 40);
        assert_eq!(effect.amplifier, 1);
    }

    #[test]
    fn test_particles_disabled() {
        let mut fx = Fixture::new();
        fx.config.particles_enabled = false;
        fx.anchor(0, 64, 0);

        let report = fx.run();

        assert_eq!(report.bursts, 0);
        assert!(fx.sim.particle_bursts().is_empty());
    }

    /// Wraps a [`SimWorld`] and misbehaves on request.
    struct FaultyHost {
        inner: SimWorld,
        /// Spatial queries centred on this anchor panic.
        panic_at: Option<Location>,
        reject_particles: bool,
    }

    impl WorldHost for FaultyHost {
        fn block_kind_at(&self, location: &Location) -> Option<Material> {
            self.inner.block_kind_at(location)
        }

        fn resolve_world(&self, world: WorldId) -> Option<WorldInfo> {
            self.inner.resolve_world(world)
        }

        fn nearby_entities(
            &self,
            world: &WorldInfo,
            center: DVec3,
            half_extents: DVec3,
        ) -> Vec<EntityId> {
            if self.panic_at.is_some_and(|anchor| anchor.corner() == center) {
                panic!("spatial index corrupted");
            }
            self.inner.nearby_entities(world, center, half_extents)
        }

        fn is_living(&self, entity: EntityId) -> bool {
            self.inner.is_living(entity)
        }

        fn apply_status_effect(
            &self,
            entity: EntityId,
            application: &EffectApplication,
        ) -> Result<(), HostError> {
            self.inner.apply_status_effect(entity, application)
        }

        fn spawn_particles(
            &self,
            world: &WorldInfo,
            burst: &ParticleBurst,
        ) -> Result<(), HostError> {
            if self.reject_particles {
                return Err(HostError::Rejected("particle budget exhausted".into()));
            }
            self.inner.spawn_particles(world, burst)
        }
    }

    #[test]
    fn test_panicking_anchor_is_isolated() {
        let fx = Fixture::new();
        let bad = fx.anchor(0, 64, 0);
        fx.anchor(50, 64, 50);
        let target = fx.sim.spawn_entity(fx.world, DVec3::new(51.0, 64.0, 51.0), true);
        let host = FaultyHost {
            inner: fx.sim,
            panic_at: Some(bad),
            reject_particles: false,
        };

        let report = DistortionCycle::new(&fx.config, &fx.registry, &host).run();

        assert_eq!(report.failed, 1);
        assert_eq!(report.bursts, 1);
        assert!(host.inner.effect_on(target, StatusEffect::Slowness).is_some());
        assert!(fx.registry.contains(&bad), "a failed anchor is not removed");
    }

    #[test]
    fn test_particle_failure_keeps_effect() {
        let fx = Fixture::new();
        fx.anchor(0, 64, 0);
        fx.anchor(30, 64, 0);
        let first = fx.sim.spawn_entity(fx.world, DVec3::new(0.0, 65.0, 0.0), true);
        let second = fx.sim.spawn_entity(fx.world, DVec3::new(30.0, 65.0, 0.0), true);
        let host = FaultyHost {
            inner: fx.sim,
            panic_at: None,
            reject_particles: true,
        };

        let report = DistortionCycle::new(&fx.config, &fx.registry, &host).run();

        assert_eq!(report.targets, 2);
        assert_eq!(report.bursts, 0);
        assert_eq!(report.failed, 0);
        assert!(host.inner.effect_on(first, StatusEffect::Slowness).is_some());
        assert!(host.inner.effect_on(second, StatusEffect::Slowness).is_some());
    }

    #[test]
    fn test_process_anchor_outcomes() {
        let fx = Fixture::new();
        let live = fx.anchor(0, 64, 0);
        fx.sim.spawn_entity(fx.world, DVec3::new(1.0, 64.0, 0.0), true);
        fx.sim.spawn_entity(fx.world, DVec3::new(0.0, 65.0, 1.0), false);

        let other = fx.sim.load_world("the_end");
        let stranded = Location::new(other, 0, 64, 0);
        fx.sim.set_block(stranded, Material::Beacon);
        fx.registry.add(stranded);
        fx.sim.unload_world(other);

        let broken = fx.anchor(50, 64, 50);
        fx.sim.set_block(broken, Material::Dirt);

        let cycle = DistortionCycle::new(&fx.config, &fx.registry, &fx.sim);
        let mut report = CycleReport::default();
        assert_eq!(
            cycle.process_anchor(&live, &mut report),
            AnchorOutcome::Distorted {
                targets: 1,
                particles: true
            }
        );
        assert_eq!(
            cycle.process_anchor(&stranded, &mut report),
            AnchorOutcome::WorldUnavailable
        );
        assert_eq!(cycle.process_anchor(&broken, &mut report), AnchorOutcome::Healed);
        assert_eq!(report, CycleReport::default(), "outcomes are tallied by run");
    }
}

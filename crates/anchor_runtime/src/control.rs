//! Serialised access to the anchor registry.
//!
//! The distortion cycle and every registry change from outside it share one
//! [`CycleGate`]. A cycle holds the gate from its snapshot to its last
//! anchor, so a player action either lands before the cycle starts or waits
//! until it has finished. The cycle's read-then-remove self-heal never
//! interleaves with a toggle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anchor_core::{AnchorRegistry, Location};

/// The lock that orders cycles and registry changes.
#[derive(Debug, Clone, Default)]
pub struct CycleGate(Arc<Mutex<()>>);

impl CycleGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the gate. A poisoned gate is taken over as-is: it guards no
    /// data of its own.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cloneable handle for changing the registry from outside a cycle.
#[derive(Debug, Clone)]
pub struct AnchorControl {
    registry: Arc<AnchorRegistry>,
    gate: CycleGate,
}

impl AnchorControl {
    #[must_use]
    pub fn new(registry: Arc<AnchorRegistry>, gate: CycleGate) -> Self {
        Self { registry, gate }
    }

    /// Mark `location` active. Returns `true` if it was not already.
    pub fn activate(&self, location: Location) -> bool {
        let _turn = self.gate.lock();
        self.registry.add(location)
    }

    /// Mark `location` inactive. Returns `true` if it was active.
    pub fn deactivate(&self, location: &Location) -> bool {
        let _turn = self.gate.lock();
        self.registry.remove(location)
    }

    #[must_use]
    pub fn is_active(&self, location: &Location) -> bool {
        let _turn = self.gate.lock();
        self.registry.contains(location)
    }

    /// Flip `location` and return whether it is active afterwards.
    pub fn toggle(&self, location: Location) -> bool {
        let _turn = self.gate.lock();
        if self.registry.remove(&location) {
            false
        } else {
            self.registry.add(location)
        }
    }

    /// Forget every anchor. Returns how many there were.
    pub fn clear(&self) -> usize {
        let _turn = self.gate.lock();
        self.registry.clear()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<AnchorRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use anchor_config::EffectConfig;
    use anchor_core::{
        EffectApplication, EntityId, HostError, Material, ParticleBurst, WorldHost, WorldId,
        WorldInfo,
    };
    use glam::DVec3;

    use super::*;
    use crate::scheduler::DistortionScheduler;
    use crate::sim::SimWorld;
    use crate::ticker::ManualTicker;

    fn control() -> (AnchorControl, CycleGate) {
        let gate = CycleGate::new();
        let control = AnchorControl::new(Arc::new(AnchorRegistry::new()), gate.clone());
        (control, gate)
    }

    #[test]
    fn test_toggle_flips_membership() {
        let (control, _) = control();
        let loc = Location::new(WorldId::new_random(), 1, 2, 3);

        assert!(control.toggle(loc));
        assert!(control.is_active(&loc));
        assert!(!control.toggle(loc));
        assert!(!control.is_active(&loc));
    }

    #[test]
    fn test_activation_waits_for_held_gate() {
        let (control, gate) = control();
        let loc = Location::new(WorldId::new_random(), 0, 64, 0);
        let (done_tx, done_rx) = mpsc::channel();

        let turn = gate.lock();
        let worker = {
            let control = control.clone();
            thread::spawn(move || {
                control.activate(loc);
                let _ = done_tx.send(());
            })
        };

        assert!(
            done_rx.recv_timeout(Duration::from_millis(50)).is_err(),
            "activation must wait while a cycle holds the gate"
        );
        drop(turn);
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        worker.join().unwrap();
        assert!(control.registry().contains(&loc));
    }

    /// Reports a stale block read for `anchor`, then lets a player re-place
    /// and re-activate it on another thread before the cycle continues.
    struct PlayerActsMidCycle {
        inner: SimWorld,
        player: OnceLock<(AnchorControl, Location)>,
        acted: Mutex<Option<JoinHandle<()>>>,
    }

    impl WorldHost for PlayerActsMidCycle {
        fn block_kind_at(&self, location: &Location) -> Option<Material> {
            let read = self.inner.block_kind_at(location);
            let mut acted = self.acted.lock().unwrap();
            if let Some((control, anchor)) = self.player.get()
                && anchor == location
                && acted.is_none()
            {
                self.inner.set_block(*anchor, Material::Beacon);
                let control = control.clone();
                let anchor = *anchor;
                *acted = Some(thread::spawn(move || {
                    control.deactivate(&anchor);
                    control.activate(anchor);
                }));
                thread::sleep(Duration::from_millis(50));
            }
            read
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
            self.inner.spawn_particles(world, burst)
        }
    }

    #[test]
    fn test_player_reactivation_during_cycle_survives_self_heal() {
        let host = Arc::new(PlayerActsMidCycle {
            inner: SimWorld::new(),
            player: OnceLock::new(),
            acted: Mutex::new(None),
        });
        let world = host.inner.load_world("overworld");
        let anchor = Location::new(world, 0, 64, 0);

        let registry = Arc::new(AnchorRegistry::new());
        let dyn_host: Arc<dyn WorldHost> = host.clone();
        let mut scheduler =
            DistortionScheduler::new(ManualTicker::new(), Arc::clone(&registry), dyn_host);
        let control = AnchorControl::new(registry, scheduler.gate().clone());

        // The beacon was broken without a break event reaching us.
        host.inner.set_block(anchor, Material::Stone);
        control.activate(anchor);
        let _ = host.player.set((control.clone(), anchor));

        scheduler.start(Arc::new(EffectConfig::default()));
        scheduler.ticker_mut().tick();
        let player = host.acted.lock().unwrap().take().unwrap();
        player.join().unwrap();

        assert_eq!(host.inner.block(&anchor), Material::Beacon);
        assert!(
            control.is_active(&anchor),
            "the player's activation came after the self-heal and must stand"
        );
    }
}

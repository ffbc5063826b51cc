//! Anchor service: the front door for event sources and commands.
//!
//! The service owns the current [`EffectConfig`], an [`AnchorControl`]
//! over the shared [`AnchorRegistry`] and the [`DistortionScheduler`].
//! Registry changes go through the control, so they never interleave with
//! a running cycle. Every method
//! that changes configuration takes `&mut self`, so one owner drives all
//! reconfiguration.

use std::sync::Arc;

use anchor_config::{ConfigError, EffectConfig, LoadedConfig};
use anchor_core::{AnchorRegistry, Location, WorldHost};
use tracing::{error, info};

use crate::control::AnchorControl;
use crate::scheduler::DistortionScheduler;
use crate::source::ConfigSource;
use crate::ticker::Ticker;

/// Anchor lifecycle plus the distortion scheduler behind it.
pub struct AnchorService<T: Ticker, S: ConfigSource> {
    control: AnchorControl,
    config: Arc<EffectConfig>,
    scheduler: DistortionScheduler<T>,
    source: S,
}

impl<T: Ticker, S: ConfigSource> AnchorService<T, S> {
    /// Load the initial configuration from `source` and build a stopped
    /// service around an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the initial configuration cannot be read
    /// or names an unknown material. There is no earlier config to fall back
    /// on.
    pub fn new(host: Arc<dyn WorldHost>, ticker: T, mut source: S) -> Result<Self, ConfigError> {
        let loaded = source.read().and_then(|raw| anchor_config::load(&raw));
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "failed to load configuration");
                return Err(e);
            }
        };

        let registry = Arc::new(AnchorRegistry::new());
        let scheduler = DistortionScheduler::new(ticker, Arc::clone(&registry), host);
        let control = AnchorControl::new(registry, scheduler.gate().clone());
        Ok(Self {
            control,
            config: Arc::new(loaded.config),
            scheduler,
            source,
        })
    }

    /// Start the distortion scheduler.
    pub fn enable(&mut self) {
        info!("chrono anchors enabled");
        self.scheduler.start(Arc::clone(&self.config));
    }

    /// Stop the scheduler and forget every anchor.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        let cleared = self.control.clear();
        info!(cleared, "chrono anchors disabled");
    }

    /// Mark `location` active. Returns `true` if it was not already.
    pub fn activate(&self, location: Location) -> bool {
        self.control.activate(location)
    }

    /// Mark `location` inactive. Returns `true` if it was active.
    pub fn deactivate(&self, location: &Location) -> bool {
        self.control.deactivate(location)
    }

    #[must_use]
    pub fn is_active(&self, location: &Location) -> bool {
        self.control.is_active(location)
    }

    /// Flip `location` in one step. Returns whether it is active afterwards.
    pub fn toggle(&self, location: Location) -> bool {
        self.control.toggle(location)
    }

    /// Re-read the configuration source, swap in the new snapshot and
    /// restart the scheduler on it.
    ///
    /// On error nothing changes: the previous config keeps running.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the source cannot be read or names an
    /// unknown material.
    pub fn reload_configuration(&mut self) -> Result<LoadedConfig, ConfigError> {
        let loaded = match self.source.read().and_then(|raw| anchor_config::load(&raw)) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "configuration reload failed; keeping previous configuration");
                return Err(e);
            }
        };

        self.config = Arc::new(loaded.config.clone());
        self.scheduler.reload(Arc::clone(&self.config));
        info!(warnings = loaded.warnings.len(), "configuration reloaded");
        Ok(loaded)
    }

    /// The config currently in effect.
    #[must_use]
    pub fn config(&self) -> &Arc<EffectConfig> {
        &self.config
    }

    /// A shared handle to the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<AnchorRegistry> {
        self.control.registry()
    }

    #[must_use]
    pub fn scheduler(&self) -> &DistortionScheduler<T> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut DistortionScheduler<T> {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anchor_config::{RawConfig, keys};
    use anchor_core::{Material, StatusEffect, WorldId};
    use glam::DVec3;

    use super::*;
    use crate::scheduler::SchedulerState;
    use crate::sim::SimWorld;
    use crate::ticker::ManualTicker;

    /// A config source whose document tests can swap between reloads.
    #[derive(Clone, Default)]
    struct SharedSource(Arc<Mutex<RawConfig>>);

    impl SharedSource {
        fn set(&self, raw: RawConfig) {
            *self.0.lock().unwrap() = raw;
        }
    }

    impl ConfigSource for SharedSource {
        fn read(&mut self) -> Result<RawConfig, ConfigError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct Fixture {
        sim: Arc<SimWorld>,
        world: WorldId,
        source: SharedSource,
        service: AnchorService<ManualTicker, SharedSource>,
    }

    fn fixture() -> Fixture {
        let sim = Arc::new(SimWorld::new());
        let world = sim.load_world("overworld");
        let source = SharedSource::default();
        source.set(RawConfig::default_document());
        let service = AnchorService::new(sim.clone(), ManualTicker::new(), source.clone()).unwrap();
        Fixture {
            sim,
            world,
            source,
            service,
        }
    }

    #[test]
    fn test_activate_deactivate_round_trip() {
        let fx = fixture();
        let loc = Location::new(fx.world, 4, 70, 4);

        assert!(fx.service.activate(loc));
        assert!(!fx.service.activate(loc));
        assert!(fx.service.is_active(&loc));
        assert_eq!(fx.service.registry().len(), 1);

        assert!(fx.service.deactivate(&loc));
        assert!(!fx.service.is_active(&loc));
        assert!(!fx.service.deactivate(&loc));
    }

    #[test]
    fn test_initial_load_failure_is_error() {
        let sim = Arc::new(SimWorld::new());
        let source = SharedSource::default();
        source.set(RawConfig::new().with(keys::ANCHOR_BLOCK_TYPE, "UNOBTAINIUM"));
        assert!(AnchorService::new(sim, ManualTicker::new(), source).is_err());
    }

    #[test]
    fn test_enable_starts_scheduler() {
        let mut fx = fixture();
        fx.service.enable();
        assert_eq!(
            fx.service.scheduler().state(),
            SchedulerState::Running { interval_ticks: 40 }
        );
    }

    #[test]
    fn test_reload_swaps_config_and_restarts() {
        let mut fx = fixture();
        fx.service.enable();
        fx.source.set(
            RawConfig::default_document()
                .with(keys::EFFECT_DURATION_TICKS, 10)
                .with(keys::DISTORTION_TYPE, "FAST"),
        );

        let loaded = fx.service.reload_configuration().unwrap();

        assert!(loaded.warnings.is_empty());
        assert_eq!(fx.service.config().effect_duration_ticks, 10);
        let ticker = fx.service.scheduler().ticker();
        assert_eq!(ticker.live_jobs(), 1);
        assert_eq!(ticker.interval_ticks(), Some(10));
        assert_eq!(ticker.starts(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_previous_config() {
        let mut fx = fixture();
        fx.service.enable();
        fx.source
            .set(RawConfig::default_document().with(keys::ACTIVATION_ITEM_TYPE, "NOPE"));

        assert!(fx.service.reload_configuration().is_err());

        assert_eq!(**fx.service.config(), EffectConfig::default());
        let ticker = fx.service.scheduler().ticker();
        assert_eq!(ticker.live_jobs(), 1);
        assert_eq!(ticker.starts(), 1, "a failed reload must not restart");
    }

    #[test]
    fn test_reload_reports_warnings() {
        let mut fx = fixture();
        fx.source
            .set(RawConfig::default_document().with(keys::EFFECT_AMPLIFIER, -5));

        let loaded = fx.service.reload_configuration().unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(fx.service.config().effect_amplifier, 1);
    }

    #[test]
    fn test_shutdown_stops_and_clears() {
        let mut fx = fixture();
        fx.service.enable();
        fx.service.activate(Location::new(fx.world, 0, 0, 0));
        fx.service.activate(Location::new(fx.world, 1, 0, 0));

        fx.service.shutdown();

        assert!(fx.service.registry().is_empty());
        assert!(!fx.service.scheduler().is_running());
        assert_eq!(fx.service.scheduler().ticker().live_jobs(), 0);
    }

    #[test]
    fn test_end_to_end_cycle_after_reload() {
        let mut fx = fixture();
        let anchor = Location::new(fx.world, 0, 64, 0);
        fx.sim.set_block(anchor, Material::Beacon);
        fx.service.activate(anchor);
        let player = fx.sim.spawn_entity(fx.world, DVec3::new(3.0, 65.0, -3.0), true);

        fx.service.enable();
        fx.service.scheduler_mut().ticker_mut().tick();
        assert!(fx.sim.effect_on(player, StatusEffect::Slowness).is_some());

        fx.source
            .set(RawConfig::default_document().with(keys::DISTORTION_TYPE, "fast"));
        fx.service.reload_configuration().unwrap();
        fx.service.scheduler_mut().ticker_mut().tick();
        assert!(fx.sim.effect_on(player, StatusEffect::Speed).is_some());
    }
}

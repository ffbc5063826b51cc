//! Distortion scheduler: the lifecycle of the single repeating job.
//!
//! ```text
//!   Stopped ──start──▶ Running ──stop──▶ Stopped
//!                        │  ▲
//!                        └──┘ reload (stop, then start)
//! ```
//!
//! The job captures one [`EffectConfig`] snapshot for its whole life. A
//! reload cancels it and starts a new job around the new snapshot, so no
//! cycle for the old config can begin after the new one is installed.
//! Cycles from both jobs pass through the same gate, so a cycle still in
//! flight when the old job was cancelled finishes before the new job's
//! first cycle begins. Registry changes made through
//! [`AnchorControl`](crate::AnchorControl) wait on that gate as well.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anchor_config::EffectConfig;
use anchor_core::{AnchorRegistry, WorldHost};
use tracing::{error, info, warn};

use crate::control::CycleGate;
use crate::cycle::{CycleReport, DistortionCycle};
use crate::ticker::{TickJob, Ticker};

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running {
        /// Ticks between cycles.
        interval_ticks: u32,
    },
}

/// Shared between the scheduler and every job it starts.
#[derive(Debug, Default)]
struct CycleStats {
    completed: AtomicU64,
    panicked: AtomicU64,
    last: Mutex<Option<CycleReport>>,
}

/// Owns the repeating distortion job.
pub struct DistortionScheduler<T: Ticker> {
    ticker: T,
    registry: Arc<AnchorRegistry>,
    host: Arc<dyn WorldHost>,
    /// The snapshot driving the live job.
    config: Option<Arc<EffectConfig>>,
    /// Serialises cycles across jobs and against registry changes.
    gate: CycleGate,
    stats: Arc<CycleStats>,
}

impl<T: Ticker> DistortionScheduler<T> {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new(ticker: T, registry: Arc<AnchorRegistry>, host: Arc<dyn WorldHost>) -> Self {
        Self {
            ticker,
            registry,
            host,
            config: None,
            gate: CycleGate::new(),
            stats: Arc::new(CycleStats::default()),
        }
    }

    /// Start running a cycle every `config.effect_duration_ticks` ticks,
    /// beginning immediately.
    ///
    /// Callers stop the scheduler before starting it again; if they don't,
    /// the previous job is cancelled here and a warning is logged.
    pub fn start(&mut self, config: Arc<EffectConfig>) {
        if self.ticker.is_running() {
            warn!("distortion scheduler started while running; stopping previous job");
            self.stop();
        }

        let interval_ticks = config.effect_duration_ticks;
        let job = self.job(Arc::clone(&config));
        self.ticker.start(interval_ticks, job);
        self.config = Some(config);

        info!(interval_ticks, "distortion scheduler started");
    }

    /// Cancel the job. A no-op when already stopped.
    pub fn stop(&mut self) {
        if self.config.take().is_some() || self.ticker.is_running() {
            self.ticker.stop();
            info!("distortion scheduler stopped");
        }
    }

    /// Replace the running config: stop, then start with `config`.
    ///
    /// The first cycle under the new config runs immediately.
    pub fn reload(&mut self, config: Arc<EffectConfig>) {
        self.stop();
        self.start(config);
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        match &self.config {
            Some(config) if self.ticker.is_running() => SchedulerState::Running {
                interval_ticks: config.effect_duration_ticks,
            },
            _ => SchedulerState::Stopped,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state(), SchedulerState::Running { .. })
    }

    /// The config snapshot driving the live job.
    #[must_use]
    pub fn active_config(&self) -> Option<&Arc<EffectConfig>> {
        self.config.as_ref()
    }

    /// Cycles that ran to completion, across every job.
    #[must_use]
    pub fn cycles_completed(&self) -> u64 {
        self.stats.completed.load(Ordering::Relaxed)
    }

    /// Cycles that panicked outside per-anchor isolation.
    #[must_use]
    pub fn cycles_panicked(&self) -> u64 {
        self.stats.panicked.load(Ordering::Relaxed)
    }

    /// Counters from the most recent completed cycle.
    #[must_use]
    pub fn last_report(&self) -> Option<CycleReport> {
        *self
            .stats
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    /// The gate every cycle holds while it runs.
    ///
    /// Registry changes from outside the cycle take it too; see
    /// [`AnchorControl`](crate::AnchorControl).
    #[must_use]
    pub fn gate(&self) -> &CycleGate {
        &self.gate
    }

    /// Build the job closure for one config snapshot.
    fn job(&self, config: Arc<EffectConfig>) -> TickJob {
        let registry = Arc::clone(&self.registry);
        let host = Arc::clone(&self.host);
        self.job_with(move || DistortionCycle::new(&config, &registry, host.as_ref()).run())
    }

    /// Wrap one cycle body: take the gate, contain a panic, record the outcome.
    fn job_with<F>(&self, mut cycle: F) -> TickJob
    where
        F: FnMut() -> CycleReport + Send + 'static,
    {
        let gate = self.gate.clone();
        let stats = Arc::clone(&self.stats);

        Box::new(move || {
            let _turn = gate.lock();
            match catch_unwind(AssertUnwindSafe(&mut cycle)) {
                Ok(report) => {
                    stats.completed.fetch_add(1, Ordering::Relaxed);
                    *stats.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
                }
                Err(_) => {
                    stats.panicked.fetch_add(1, Ordering::Relaxed);
                    error!("distortion cycle panicked; the next cycle stays scheduled");
                }
            }
        })
    }
}

impl<T: Ticker> Drop for DistortionScheduler<T> {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}

impl<T: Ticker + std::fmt::Debug> std::fmt::Debug for DistortionScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistortionScheduler")
            .field("ticker", &self.ticker)
            .field("state", &self.state())
            .field("anchors", &self.registry.len())
            .field("cycles_completed", &self.cycles_completed())
            .finish()
    }
}

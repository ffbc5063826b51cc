//! Repeating-job timers.
//!
//! A [`Ticker`] owns at most one repeating job. Intervals are expressed in
//! simulation ticks; each implementation decides how a tick maps to time.
//! The first invocation after [`Ticker::start`] is immediate.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// The callback a ticker invokes once per interval.
pub type TickJob = Box<dyn FnMut() + Send + 'static>;

/// A timer that drives one repeating job.
pub trait Ticker {
    /// Begin invoking `job` every `interval_ticks` ticks, starting now.
    ///
    /// Any job already running is cancelled first, so at most one job is
    /// ever live.
    fn start(&mut self, interval_ticks: u32, job: TickJob);

    /// Cancel the running job. Does nothing when stopped.
    fn stop(&mut self);

    /// Returns `true` while a job is live.
    fn is_running(&self) -> bool;
}

/// A ticker backed by a tokio interval task.
///
/// Cancellation aborts the task. The job itself is synchronous, so an
/// invocation that has already begun always runs to completion; only later
/// invocations are cancelled.
#[derive(Debug)]
pub struct TokioTicker {
    runtime: Handle,
    /// Wall-clock length of one simulation tick.
    tick: Duration,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    /// The usual simulation tick: 20 ticks per second.
    pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

    /// Create a stopped ticker that spawns onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle, tick: Duration) -> Self {
        Self {
            runtime,
            tick,
            task: None,
        }
    }

    /// Wall-clock length of one simulation tick.
    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl Ticker for TokioTicker {
    fn start(&mut self, interval_ticks: u32, mut job: TickJob) {
        if self.is_running() {
            warn!("ticker started while running; cancelling previous job");
            self.stop();
        }

        let period = self.tick * interval_ticks.max(1);
        debug!(period_ms = period.as_millis() as u64, "starting ticker task");

        self.task = Some(self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                job();
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("ticker task aborted");
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A ticker advanced by hand, one simulation tick at a time.
///
/// Tests drive it with [`ManualTicker::tick`] or [`ManualTicker::advance`]
/// and observe exactly which ticks fire the job.
#[derive(Default)]
pub struct ManualTicker {
    job: Option<TickJob>,
    interval_ticks: u32,
    /// Ticks elapsed since the current job started.
    elapsed: u64,
    starts: usize,
    stops: usize,
    runs: u64,
}

impl ManualTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick. Returns `true` if the job fired.
    pub fn tick(&mut self) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        let due = self.elapsed % u64::from(self.interval_ticks.max(1)) == 0;
        self.elapsed += 1;
        if due {
            job();
            self.runs += 1;
        }
        due
    }

    /// Advance `ticks` ticks. Returns how many times the job fired.
    pub fn advance(&mut self, ticks: u64) -> u64 {
        (0..ticks).filter(|_| self.tick()).count() as u64
    }

    /// Number of live jobs: 0 or 1.
    #[must_use]
    pub fn live_jobs(&self) -> usize {
        usize::from(self.job.is_some())
    }

    /// Interval of the live job, if any.
    #[must_use]
    pub fn interval_ticks(&self) -> Option<u32> {
        self.job.as_ref().map(|_| self.interval_ticks)
    }

    /// How many times [`Ticker::start`] was called.
    #[must_use]
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// How many times a live job was cancelled.
    #[must_use]
    pub fn stops(&self) -> usize {
        self.stops
    }

    /// Total job invocations across every job this ticker ran.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl std::fmt::Debug for ManualTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTicker")
            .field("running", &self.job.is_some())
            .field("interval_ticks", &self.interval_ticks)
            .field("elapsed", &self.elapsed)
            .field("starts", &self.starts)
            .field("stops", &self.stops)
            .field("runs", &self.runs)
            .finish()
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, interval_ticks: u32, job: TickJob) {
        self.stop();
        self.job = Some(job);
        self.interval_ticks = interval_ticks.max(1);
        self.elapsed = 0;
        self.starts += 1;
    }

    fn stop(&mut self) {
        if self.job.take().is_some() {
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.job.is_some()
    }
}

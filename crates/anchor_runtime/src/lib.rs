//! # anchor_runtime
//!
//! Everything that runs on a schedule.
//!
//! - [`Ticker`]: the repeating-job abstraction, with a real
//!   [`TokioTicker`] and a synchronous [`ManualTicker`] for tests.
//! - [`DistortionCycle`]: one pass over every active anchor.
//! - [`DistortionScheduler`]: owns the single live job and restarts it on
//!   reconfiguration.
//! - [`AnchorService`]: the front door used by event sources and the
//!   command layer.
//! - [`SimWorld`]: an in-memory [`WorldHost`](anchor_core::WorldHost).
//!
//! ## Execution model
//!
//! Cycles and registry changes are serialised by one [`CycleGate`]: a cycle
//! holds it for its whole run, and [`AnchorControl`] takes it for every
//! activation, deactivation and toggle. The service itself is driven from
//! one owner (`&mut self` for every reconfiguration).

pub mod command;
pub mod control;
pub mod cycle;
pub mod interaction;
pub mod scheduler;
pub mod service;
pub mod sim;
pub mod source;
pub mod ticker;

pub use command::{CommandReply, CommandSender, RELOAD_PERMISSION};
pub use control::{AnchorControl, CycleGate};
pub use cycle::{AnchorOutcome, CycleReport, DistortionCycle};
pub use interaction::{
    Action, BreakEvent, ClickedBlock, Feedback, Hand, InteractEvent, InteractOutcome,
};
pub use scheduler::{DistortionScheduler, SchedulerState};
pub use service::AnchorService;
pub use sim::{ActiveEffect, SimEntity, SimWorld};
pub use source::{ConfigSource, FileSource};
pub use ticker::{ManualTicker, TickJob, Ticker, TokioTicker};

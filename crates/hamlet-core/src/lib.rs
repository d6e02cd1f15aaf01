//! Simulation clock, scheduling, and tick orchestration for Hamlet.
//!
//! This crate owns the per-tick cycle that drives the village:
//! clock advance, resource despawn, animal wandering, the per-NPC state
//! machine, and summary collection.
//!
//! # Modules
//!
//! - [`clock`] -- Simulation clock with tick counter, in-game hour, and
//!   time-of-day derivation.
//! - [`command`] -- Player commands for controlled NPCs.
//! - [`config`] -- Configuration loading from `hamlet-config.yaml` into
//!   strongly-typed structs.
//! - [`event`] -- Events recorded during a tick.
//! - [`runner`] -- The async run loop with pause, stop, and a command queue.
//! - [`schedule`] -- Work-hour checks.
//! - [`scheduler`] -- The per-NPC state machine.
//! - [`tick`] -- [`Simulation`] and the tick cycle.
//!
//! [`Simulation`]: tick::Simulation

pub mod clock;
pub mod command;
pub mod config;
pub mod event;
pub mod runner;
pub mod schedule;
pub mod scheduler;
pub mod tick;

pub use command::{Command, CommandError};
pub use config::{ConfigError, SimulationConfig};
pub use event::{AbandonReason, TickEvent};
pub use runner::{
    NoOpCallback, RunControl, RunnerError, SimulationEndReason, SimulationResult, TickCallback,
    run_simulation,
};
pub use tick::{SetupError, Simulation, StateCounts, TickError, TickSummary};

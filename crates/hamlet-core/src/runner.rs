//! Simulation loop runner with run controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` (0 = unlimited)
//! - **Pause/resume**: the loop halts until resumed
//! - **Queued commands**: player commands are applied at the start of the
//!   next tick, rejections are reported as events
//! - **Clean shutdown**: a stop request ends the loop between ticks
//!
//! The runner wraps [`Simulation::run_tick`] and adds the control plane
//! around it. One tick advances simulation time by the configured tick
//! interval; ticks are paced by a [`tokio::time::interval`] of the same
//! period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::info;

use crate::command::Command;
use crate::event::TickEvent;
use crate::tick::{Simulation, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason why the simulation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Reached the configured tick limit.
    MaxTicksReached,
    /// A stop was requested.
    Stopped,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Shared run control state.
///
/// Wrapped in [`Arc`] and shared between the tick loop and whatever drives
/// it (signal handlers, an input layer). Flags are atomics so the loop
/// reads them without locking.
#[derive(Debug)]
pub struct RunControl {
    /// Whether the loop is currently paused.
    paused: AtomicBool,
    /// Wakes the loop when resumed.
    resume_notify: Notify,
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,
    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,
    /// Commands waiting for the next tick.
    pending: Mutex<Vec<Command>>,
}

impl RunControl {
    /// Create run controls with a tick limit (0 = unlimited).
    pub fn new(max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            max_ticks,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Check whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop. It sleeps until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop and wake it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    /// Request a clean stop. Also wakes a paused loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// The tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` is at or past the tick limit.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }

    /// Queue a command for the next tick.
    pub async fn queue_command(&self, command: Command) {
        self.pending.lock().await.push(command);
    }

    /// Take every queued command, oldest first.
    pub async fn drain_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.pending.lock().await)
    }
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulation);
}

/// A no-op tick callback for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _sim: &Simulation) {}
}

/// Apply queued commands. Rejections become [`TickEvent::CommandRejected`].
fn apply_commands(sim: &mut Simulation, commands: Vec<Command>) -> Vec<TickEvent> {
    let mut events = Vec::new();
    for command in commands {
        match sim.dispatch(command) {
            Ok(applied) => events.extend(applied),
            Err(err) => events.push(TickEvent::CommandRejected {
                npc: command.npc(),
                reason: err.to_string(),
            }),
        }
    }
    events
}

/// Run the simulation loop until the tick limit or a stop request.
///
/// Each iteration applies queued commands, runs one tick of
/// `world.tick_interval_ms` simulated milliseconds, notifies `callback`,
/// and waits for the next interval.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    sim: &mut Simulation,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let delta_ms = sim.config().world.tick_interval_ms;
    let mut interval = tokio::time::interval(Duration::from_millis(delta_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = delta_ms,
        npcs = sim.npcs().len(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Stopped,
                final_summary: last_summary,
                total_ticks,
            });
        }

        interval.tick().await;

        // --- Execute tick ---
        let mut events = apply_commands(sim, control.drain_commands().await);
        let mut summary = sim.run_tick(delta_ms)?;
        events.append(&mut summary.events);
        summary.events = events;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, sim);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_working = result.final_summary.as_ref().map(|s| s.states.working),
        "Simulation ended"
    );
}

//! Tick callback that logs village activity and writes renderer snapshots.
//!
//! After each tick, notable events are logged at `info`/`debug`. Every
//! `interval` ticks the callback logs the state counts and, when an output
//! path is configured, writes the [`WorldSnapshot`](hamlet_types::WorldSnapshot)
//! as JSON for the renderer.

use std::path::PathBuf;

use hamlet_core::runner::TickCallback;
use hamlet_core::{Simulation, TickEvent, TickSummary};
use tracing::{debug, info, warn};

/// Callback that bridges the tick loop to logs and the renderer.
#[derive(Debug)]
pub struct SnapshotCallback {
    interval: u64,
    output: Option<PathBuf>,
    written: u64,
}

impl SnapshotCallback {
    /// Report every `interval` ticks (at least 1). `output` is where the
    /// JSON snapshot goes, if anywhere.
    pub fn new(interval: u64, output: Option<PathBuf>) -> Self {
        Self {
            interval: interval.max(1),
            output,
            written: 0,
        }
    }

    /// Snapshots written so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    fn write_snapshot(&mut self, sim: &Simulation) {
        let Some(path) = &self.output else {
            return;
        };
        let json = match serde_json::to_vec(&sim.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize snapshot");
                return;
            }
        };
        match std::fs::write(path, json) {
            Ok(()) => {
                self.written = self.written.saturating_add(1);
                debug!(path = %path.display(), "Snapshot written");
            }
            Err(e) => warn!(error = %e, path = %path.display(), "Failed to write snapshot"),
        }
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulation) {
        for event in &summary.events {
            log_event(summary.tick, event);
        }

        if summary.tick.checked_rem(self.interval) == Some(0) {
            info!(
                tick = summary.tick,
                hour = summary.hour,
                idle = summary.states.idle,
                moving = summary.states.moving,
                working = summary.states.working,
                returning_home = summary.states.returning_home,
                animals_moved = summary.animals_moved,
                "Village status"
            );
            self.write_snapshot(sim);
        }
    }
}

/// Log one event at a level matching its weight.
fn log_event(tick: u64, event: &TickEvent) {
    match event {
        TickEvent::Harvested {
            npc,
            item,
            quantity,
        } => info!(tick, npc = %npc, ?item, quantity, "Harvested"),
        TickEvent::Deposited { npc, house, units } => {
            info!(tick, npc = %npc, house = %house, units, "Deposited at home");
        }
        TickEvent::StorageFailed {
            npc,
            item,
            quantity,
            reason,
        } => info!(tick, npc = %npc, ?item, quantity, %reason, "Yield lost"),
        TickEvent::CommandRejected { npc, reason } => {
            info!(tick, npc = %npc, %reason, "Command rejected");
        }
        other => debug!(tick, event = ?other, "Tick event"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use hamlet_agents::SpawnParams;
    use hamlet_core::SimulationConfig;
    use hamlet_types::{Position, Profession};

    use super::*;

    #[test]
    fn writes_snapshot_on_interval() {
        let path = std::env::temp_dir().join(format!(
            "hamlet-snapshot-{}.json",
            hamlet_types::NpcId::new()
        ));
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.spawn_npc(SpawnParams::new("Kit", Position::new(0, 0), Profession::Farmer))
            .unwrap();
        let mut callback = SnapshotCallback::new(2, Some(path.clone()));

        for _ in 0..4 {
            let summary = sim.run_tick(100).unwrap();
            callback.on_tick(&summary, &sim);
        }
        assert_eq!(callback.written(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["tick"], 4);
        assert_eq!(value["npcs"][0]["name"], "Kit");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn no_output_path_writes_nothing() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let mut callback = SnapshotCallback::new(0, None);
        let summary = sim.run_tick(100).unwrap();
        callback.on_tick(&summary, &sim);
        assert_eq!(callback.written(), 0);
    }
}

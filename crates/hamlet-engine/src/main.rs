//! Engine binary for the Hamlet simulation.
//!
//! This is the main entry point that wires together configuration, the
//! village spawner, and the tick loop. It runs until the configured tick
//! limit is reached or the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `HAMLET_CONFIG` (default `hamlet-config.yaml`)
//! 3. Build the simulation
//! 4. Spawn the village and generate the surrounding chunks
//! 5. Install the Ctrl-C stop handler
//! 6. Run the simulation loop
//! 7. Log the result

mod error;
mod snapshot_callback;
mod spawner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hamlet_core::config::SimulationConfig;
use hamlet_core::runner::{self, RunControl};
use hamlet_core::tick::Simulation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_callback::SnapshotCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "hamlet-config.yaml";

/// Ticks between status lines and snapshot writes.
const STATUS_INTERVAL_TICKS: u64 = 600;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("hamlet-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Build the simulation.
    let max_ticks = config.world.max_ticks;
    let mut sim = Simulation::new(config)?;

    // 4. Spawn the village.
    let spawned = spawner::spawn_village(&mut sim)?;
    info!(
        villagers = spawned.npcs.len(),
        houses = spawned.houses.len(),
        resources = spawned.resources,
        "Village ready"
    );
    sim.log_overview();

    // 5. Stop cleanly on Ctrl-C.
    let control = Arc::new(RunControl::new(max_ticks));
    let signal_control = Arc::clone(&control);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping after the current tick");
                signal_control.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    // 6. Run the simulation.
    let snapshot_path = std::env::var_os("HAMLET_SNAPSHOT").map(PathBuf::from);
    if let Some(path) = &snapshot_path {
        info!(path = %path.display(), "Writing snapshots");
    }
    let mut callback = SnapshotCallback::new(STATUS_INTERVAL_TICKS, snapshot_path);
    let result = runner::run_simulation(&mut sim, &control, &mut callback).await?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    sim.log_overview();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        snapshots = callback.written(),
        "hamlet-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the path from `HAMLET_CONFIG`, falling back to
/// `hamlet-config.yaml` in the working directory. A missing file means
/// built-in defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var_os("HAMLET_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    load_config_from(&config_path)
}

fn load_config_from(config_path: &Path) -> Result<SimulationConfig, EngineError> {
    if config_path.exists() {
        info!(path = %config_path.display(), "Loading config file");
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config_from(Path::new("does-not-exist.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn project_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        let config = load_config_from(&path).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }
}

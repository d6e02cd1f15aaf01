//! Configuration loading and typed config structures for the Hamlet
//! simulation.
//!
//! The canonical configuration lives in `hamlet-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has a
//! default, so an empty document yields a runnable configuration.

use std::path::Path;

use hamlet_agents::{NpcConfig, ProfessionsConfig};
use hamlet_types::{HouseType, Profession};
use hamlet_world::SpawnDensities;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `hamlet-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid, seed, and tick pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// In-game day/night clock.
    #[serde(default)]
    pub time: TimeConfig,

    /// Resource spawning and despawning.
    #[serde(default)]
    pub resources: ResourcesConfig,

    /// NPC movement and carry capacity.
    #[serde(default)]
    pub npc: NpcConfig,

    /// Per-profession tuning.
    #[serde(default)]
    pub professions: ProfessionsConfig,

    /// Starting villagers and their houses.
    #[serde(default)]
    pub village: VillageConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.world.half_extent < 0 {
            return invalid("world.half_extent must not be negative");
        }
        if self.world.chunk_size == 0 {
            return invalid("world.chunk_size must be at least 1");
        }
        if self.time.start_hour >= 24 {
            return invalid("time.start_hour must be below 24");
        }
        if self.time.ms_per_game_hour == 0 {
            return invalid("time.ms_per_game_hour must be at least 1");
        }
        let hours = self.npc.default_work_hours;
        if hours.start_hour >= 24 || hours.end_hour >= 24 {
            return invalid("npc.default_work_hours must use hours below 24");
        }
        if self.resources.animal_wander_chance_pct > 100 {
            return invalid("resources.animal_wander_chance_pct must not exceed 100");
        }
        let densities = [
            self.resources.tree_density,
            self.resources.stone_density,
            self.resources.animal_density,
        ];
        if densities.iter().any(|density| *density > 1_000) {
            return invalid("resource densities are per mille and must not exceed 1000");
        }
        if self.village.house_spacing < 1 {
            return invalid("village.house_spacing must be at least 1");
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for chunk generation and animal wandering.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Valid tiles satisfy `|x| <= half_extent` and `|z| <= half_extent`.
    #[serde(default = "default_half_extent")]
    pub half_extent: i32,

    /// Edge length of a generation chunk in tiles.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Chunks within this radius (in chunks) of the origin are generated at
    /// startup.
    #[serde(default = "default_initial_chunk_radius")]
    pub initial_chunk_radius: u32,

    /// Real-time milliseconds between ticks. Also the simulated delta per
    /// tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. 0 runs until interrupted.
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            half_extent: default_half_extent(),
            chunk_size: default_chunk_size(),
            initial_chunk_radius: default_initial_chunk_radius(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// In-game clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// In-game hour at simulation time zero.
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,

    /// Simulation milliseconds per in-game hour.
    #[serde(default = "default_ms_per_game_hour")]
    pub ms_per_game_hour: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            ms_per_game_hour: default_ms_per_game_hour(),
        }
    }
}

/// Resource spawning and despawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResourcesConfig {
    /// Delay between destruction and removal from the registry.
    #[serde(default = "default_despawn_delay_ms")]
    pub despawn_delay_ms: u64,

    /// Trees per 1000 tiles.
    #[serde(default = "default_tree_density")]
    pub tree_density: u32,

    /// Stones per 1000 tiles.
    #[serde(default = "default_stone_density")]
    pub stone_density: u32,

    /// Animals per 1000 tiles.
    #[serde(default = "default_animal_density")]
    pub animal_density: u32,

    /// Chance (percent) that an animal tries to step each tick.
    #[serde(default = "default_animal_wander_chance_pct")]
    pub animal_wander_chance_pct: u32,
}

impl ResourcesConfig {
    /// Densities in the form chunk generation takes.
    pub const fn densities(&self) -> SpawnDensities {
        SpawnDensities {
            trees: self.tree_density,
            stones: self.stone_density,
            animals: self.animal_density,
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            despawn_delay_ms: default_despawn_delay_ms(),
            tree_density: default_tree_density(),
            stone_density: default_stone_density(),
            animal_density: default_animal_density(),
            animal_wander_chance_pct: default_animal_wander_chance_pct(),
        }
    }
}

/// One starting villager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VillagerConfig {
    /// Display name (unique).
    pub name: String,
    /// Labor performed.
    pub profession: Profession,
    /// Style of the house built for this villager.
    #[serde(default = "default_house_type")]
    pub house: HouseType,
}

/// Starting population.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VillageConfig {
    /// Villagers spawned at startup, each with their own house.
    #[serde(default = "default_villagers")]
    pub villagers: Vec<VillagerConfig>,

    /// Additional villagers with names drawn from the built-in pool and a
    /// random gathering profession.
    #[serde(default)]
    pub extra_villagers: u32,

    /// Tiles between neighbouring house doors.
    #[serde(default = "default_house_spacing")]
    pub house_spacing: i32,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            villagers: default_villagers(),
            extra_villagers: 0,
            house_spacing: default_house_spacing(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Hamlet".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_half_extent() -> i32 {
    hamlet_world::grid::DEFAULT_HALF_EXTENT
}

const fn default_chunk_size() -> u32 {
    16
}

const fn default_initial_chunk_radius() -> u32 {
    1
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_start_hour() -> u8 {
    6
}

const fn default_ms_per_game_hour() -> u64 {
    60_000
}

const fn default_despawn_delay_ms() -> u64 {
    hamlet_world::DEFAULT_DESPAWN_DELAY_MS
}

const fn default_tree_density() -> u32 {
    40
}

const fn default_stone_density() -> u32 {
    20
}

const fn default_animal_density() -> u32 {
    8
}

const fn default_animal_wander_chance_pct() -> u32 {
    5
}

const fn default_house_type() -> HouseType {
    HouseType::Cottage
}

const fn default_house_spacing() -> i32 {
    4
}

fn default_villagers() -> Vec<VillagerConfig> {
    [
        ("Alder", Profession::Lumberjack, HouseType::Cabin),
        ("Brann", Profession::Miner, HouseType::Cottage),
        ("Ceri", Profession::Hunter, HouseType::Cottage),
        ("Dana", Profession::Farmer, HouseType::Farmhouse),
    ]
    .into_iter()
    .map(|(name, profession, house)| VillagerConfig {
        name: name.to_owned(),
        profession,
        house,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.time.start_hour, 6);
        assert_eq!(config.resources.despawn_delay_ms, 1_000);
        assert_eq!(config.npc.base_carry_weight, 30);
        assert_eq!(config.professions.lumberjack.work_interval_ms, 1_000);
        assert_eq!(config.village.villagers.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  name: Test Hamlet
  seed: 123
  half_extent: 32
  chunk_size: 8
  initial_chunk_radius: 2
  tick_interval_ms: 50
  max_ticks: 1000

time:
  start_hour: 8
  ms_per_game_hour: 1000

resources:
  despawn_delay_ms: 2000
  tree_density: 100
  stone_density: 50
  animal_density: 10
  animal_wander_chance_pct: 20

npc:
  base_carry_weight: 40
  default_work_hours:
    start_hour: 8
    end_hour: 18

professions:
  lumberjack:
    work_interval_ms: 500
    work_range: 10
    yield_quantity: 3
    manual_cooldown_ms: 1000

village:
  villagers:
    - name: Ivo
      profession: Miner
      house: Cabin
    - name: Juna
      profession: Farmer
";

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test Hamlet");
        assert_eq!(config.world.chunk_size, 8);
        assert_eq!(config.time.ms_per_game_hour, 1_000);
        assert_eq!(config.resources.densities().trees, 100);
        assert_eq!(config.npc.base_carry_weight, 40);
        assert_eq!(config.npc.move_duration_ms, 400);
        assert_eq!(config.npc.default_work_hours.end_hour, 18);
        assert_eq!(config.professions.lumberjack.yield_quantity, 3);
        assert_eq!(config.professions.miner.work_interval_ms, 1_500);
        assert_eq!(config.village.villagers.len(), 2);
        assert_eq!(config.village.villagers.get(1).map(|v| v.house), Some(HouseType::Cottage));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.chunk_size, 16);
    }

    #[test]
    fn parse_partial_profession_yaml() {
        let yaml = "professions:\n  lumberjack:\n    work_range: 5\n  farmer:\n    yield_quantity: 3\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        let lumberjack = config.professions.lumberjack;
        assert_eq!(lumberjack.work_range, 5);
        assert_eq!(lumberjack.work_interval_ms, 1_000);
        assert_eq!(lumberjack.yield_quantity, 2);
        assert_eq!(lumberjack.manual_cooldown_ms, 2_000);
        assert_eq!(config.professions.farmer.yield_quantity, 3);
        assert_eq!(config.professions.farmer.work_interval_ms, 3_000);
        assert_eq!(config.professions.miner, ProfessionsConfig::default().miner);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad_hour = SimulationConfig::parse("time:\n  start_hour: 24\n");
        assert!(matches!(bad_hour, Err(ConfigError::Invalid { .. })));
        let bad_chunk = SimulationConfig::parse("world:\n  chunk_size: 0\n");
        assert!(matches!(bad_chunk, Err(ConfigError::Invalid { .. })));
        let bad_density = SimulationConfig::parse("resources:\n  tree_density: 1001\n");
        assert!(matches!(bad_density, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("hamlet-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

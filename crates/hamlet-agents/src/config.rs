//! Configuration for NPC movement, carrying, and profession behavior.
//!
//! These structs are embedded in the simulation config (`hamlet-config.yaml`
//! under the `npc` and `professions` keys). Every field has a default so a
//! partial YAML document is valid.

use hamlet_types::WorkHours;
use serde::Deserialize;

/// Movement and carry-capacity parameters shared by all NPCs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    /// Carry weight before equipment bonuses (default: 30).
    pub base_carry_weight: u32,

    /// Time to walk one tile at normal speed (default: 400 ms).
    pub move_duration_ms: u64,

    /// Step duration when overweight, as a percentage of normal
    /// (default: 200, i.e. half speed).
    pub overweight_move_pct: u32,

    /// Load (percent of max carry weight) at which an NPC heads home after
    /// storing a yield (default: 80).
    pub near_capacity_pct: u32,

    /// Work window given to newly spawned NPCs (default: 06--20).
    pub default_work_hours: WorkHours,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            base_carry_weight: 30,
            move_duration_ms: 400,
            overweight_move_pct: 200,
            near_capacity_pct: 80,
            default_work_hours: WorkHours::default(),
        }
    }
}

/// Tuning for a resource-gathering profession (lumberjack, miner, hunter).
///
/// Fields left out of a YAML section keep the value of that profession's
/// built-in tuning ([`GathererConfig::lumberjack`] and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GathererConfig {
    /// Minimum time between two hits on the target.
    pub work_interval_ms: u64,

    /// Maximum Manhattan distance at which targets are considered.
    pub work_range: u32,

    /// Units of the profession's item added when a target is destroyed.
    pub yield_quantity: u32,

    /// Minimum time between two player-issued work commands.
    pub manual_cooldown_ms: u64,
}

impl GathererConfig {
    /// Built-in lumberjack tuning.
    pub const fn lumberjack() -> Self {
        Self {
            work_interval_ms: 1_000,
            work_range: 20,
            yield_quantity: 2,
            manual_cooldown_ms: 2_000,
        }
    }

    /// Built-in miner tuning.
    pub const fn miner() -> Self {
        Self {
            work_interval_ms: 1_500,
            work_range: 20,
            yield_quantity: 2,
            manual_cooldown_ms: 2_500,
        }
    }

    /// Built-in hunter tuning.
    pub const fn hunter() -> Self {
        Self {
            work_interval_ms: 1_200,
            work_range: 25,
            yield_quantity: 2,
            manual_cooldown_ms: 2_000,
        }
    }
}

/// A gatherer section as written in YAML; absent keys stay `None`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct GathererSection {
    work_interval_ms: Option<u64>,
    work_range: Option<u32>,
    yield_quantity: Option<u32>,
    manual_cooldown_ms: Option<u64>,
}

impl GathererSection {
    /// Overlay the keys present in this section onto `base`.
    fn over(self, base: GathererConfig) -> GathererConfig {
        GathererConfig {
            work_interval_ms: self.work_interval_ms.unwrap_or(base.work_interval_ms),
            work_range: self.work_range.unwrap_or(base.work_range),
            yield_quantity: self.yield_quantity.unwrap_or(base.yield_quantity),
            manual_cooldown_ms: self.manual_cooldown_ms.unwrap_or(base.manual_cooldown_ms),
        }
    }
}

/// Tuning for the farmer profession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FarmerConfig {
    /// Time between two harvests (default: 3000 ms).
    pub work_interval_ms: u64,

    /// Food units produced per harvest (default: 1).
    pub yield_quantity: u32,

    /// Minimum time between two player-issued work commands
    /// (default: 2000 ms).
    pub manual_cooldown_ms: u64,
}

impl Default for FarmerConfig {
    fn default() -> Self {
        Self {
            work_interval_ms: 3_000,
            yield_quantity: 1,
            manual_cooldown_ms: 2_000,
        }
    }
}

/// Per-profession tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ProfessionsSection")]
pub struct ProfessionsConfig {
    /// Tree cutting.
    pub lumberjack: GathererConfig,
    /// Stone mining.
    pub miner: GathererConfig,
    /// Animal hunting.
    pub hunter: GathererConfig,
    /// Food production.
    pub farmer: FarmerConfig,
}

impl Default for ProfessionsConfig {
    fn default() -> Self {
        Self {
            lumberjack: GathererConfig::lumberjack(),
            miner: GathererConfig::miner(),
            hunter: GathererConfig::hunter(),
            farmer: FarmerConfig::default(),
        }
    }
}

/// The `professions` key as written in YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfessionsSection {
    lumberjack: GathererSection,
    miner: GathererSection,
    hunter: GathererSection,
    farmer: FarmerConfig,
}

impl From<ProfessionsSection> for ProfessionsConfig {
    fn from(section: ProfessionsSection) -> Self {
        Self {
            lumberjack: section.lumberjack.over(GathererConfig::lumberjack()),
            miner: section.miner.over(GathererConfig::miner()),
            hunter: section.hunter.over(GathererConfig::hunter()),
            farmer: section.farmer,
        }
    }
}

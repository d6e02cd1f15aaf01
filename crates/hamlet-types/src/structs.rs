//! Core entity structs for the Hamlet simulation.
//!
//! These are plain data records. Logic that mutates them lives in the
//! `hamlet-world`, `hamlet-agents`, and `hamlet-core` crates.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AnimationKind, ControlMode, Direction, HouseType, ItemId, NpcState, Profession,
    ResourceKind, Species, TaskPriority, TaskType,
};
use crate::ids::{HouseId, NpcId, ResourceId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Integer grid coordinate. `z` is the second horizontal axis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// East-west coordinate.
    pub x: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The neighboring tile in `direction`, or `None` on coordinate overflow.
    pub fn offset(self, direction: Direction) -> Option<Self> {
        let (dx, dz) = direction.offset();
        Some(Self {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        })
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// NPCs
// ---------------------------------------------------------------------------

/// Daily window in which an autonomous NPC works.
///
/// Hours are in `0..24`. A window with `start_hour > end_hour` wraps past
/// midnight (e.g. 22 to 6). Equal bounds mean the NPC works around the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkHours {
    /// First working hour (inclusive).
    pub start_hour: u8,
    /// First resting hour (exclusive end of the window).
    pub end_hour: u8,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 20,
        }
    }
}

/// A bounded unit of work targeting one resource or a production action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkTask {
    /// What kind of work this is.
    pub task_type: TaskType,
    /// The targeted registry entry. `None` for production tasks (farming).
    pub target_id: Option<ResourceId>,
    /// Where the target was when the task was created.
    pub target_position: Position,
    /// Work units applied so far.
    pub progress: u32,
    /// Work units needed to finish. `progress` never exceeds this.
    pub max_progress: u32,
    /// Whether the NPC must approach the target first.
    pub priority: TaskPriority,
}

impl WorkTask {
    /// Whether progress has reached the goal.
    pub const fn is_complete(&self) -> bool {
        self.progress >= self.max_progress
    }

    /// Advance progress by `units`, clamped to `max_progress`.
    ///
    /// Returns the number of units actually applied.
    pub fn advance(&mut self, units: u32) -> u32 {
        let before = self.progress;
        self.progress = self.progress.saturating_add(units).min(self.max_progress);
        self.progress.saturating_sub(before)
    }
}

/// Transient visual state. Irrelevant to simulation correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NpcAnimation {
    /// Which animation to play.
    pub kind: AnimationKind,
    /// Simulation time (ms) when the animation started.
    pub started_at: u64,
}

/// Per-NPC work statistics accumulated by the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NpcStats {
    /// Tiles stepped.
    pub distance_traveled: u64,
    /// Tasks acquired.
    pub tasks_assigned: u64,
    /// Progress units applied across all tasks.
    pub work_completed: u64,
    /// Milliseconds spent in `Working` with an active task.
    pub time_worked_ms: u64,
}

impl NpcStats {
    /// Work units per assigned task as a percentage, clamped to 100.
    ///
    /// Returns 0 when no task has been assigned yet.
    pub fn efficiency_pct(&self) -> u64 {
        self.work_completed
            .saturating_mul(100)
            .checked_div(self.tasks_assigned)
            .unwrap_or(0)
            .min(100)
    }
}

/// A simulated worker. Either autonomous or player-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Npc {
    /// Unique, immutable identifier.
    pub id: NpcId,
    /// Display name, unique within the NPC manager.
    pub name: String,
    /// Current grid cell. Mutated only by movement.
    pub position: Position,
    /// Whether the scheduler or the player drives this NPC.
    pub control_mode: ControlMode,
    /// Selects the profession behavior strategy.
    pub profession: Profession,
    /// Current state machine position.
    pub state: NpcState,
    /// Present iff `state == Working`.
    pub current_task: Option<WorkTask>,
    /// Simulation time (ms) at which the current tile step completes.
    /// No further move is accepted before then.
    pub moving_until: Option<u64>,
    /// Simulation time (ms) of the last state-affecting action. Throttles
    /// work intervals.
    pub last_action_time: u64,
    /// Weak reference to the NPC's dwelling.
    pub house_id: Option<HouseId>,
    /// Carried items: item -> quantity.
    pub inventory: BTreeMap<ItemId, u32>,
    /// Equipped items granting carry bonuses.
    pub equipped: BTreeSet<ItemId>,
    /// Daily work window for autonomous scheduling.
    pub work_hours: WorkHours,
    /// Direction the NPC last moved in.
    pub facing: Direction,
    /// Transient visual state for the renderer.
    pub animation: Option<NpcAnimation>,
    /// Accumulated work statistics.
    pub stats: NpcStats,
}

impl Npc {
    /// Whether a tile step is still in flight at `now`.
    pub fn is_moving(&self, now: u64) -> bool {
        self.moving_until.is_some_and(|until| now < until)
    }

    /// Whether the task/state pairing holds: a task exists iff working.
    pub const fn task_state_consistent(&self) -> bool {
        matches!(
            (&self.current_task, self.state),
            (Some(_), NpcState::Working) | (None, NpcState::Idle | NpcState::Moving | NpcState::ReturningHome)
        )
    }
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// A tree, stone, or animal that can be damaged until destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvestableResource {
    /// Registry-assigned id, never reused.
    pub id: ResourceId,
    /// Which registry owns this resource.
    pub kind: ResourceKind,
    /// Concrete subtype.
    pub species: Species,
    /// Current tile.
    pub position: Position,
    /// Remaining hit points.
    pub health: u32,
    /// Hit points at spawn.
    pub max_health: u32,
    /// Set once health reaches zero. Irreversible.
    pub is_being_destroyed: bool,
    /// When the destroying phase began.
    pub destruction_started_at: Option<u64>,
    /// When the resource was last hit (hit animation).
    pub last_hit_at: Option<u64>,
}

impl HarvestableResource {
    /// Whether the resource can still be targeted for work.
    pub const fn is_available(&self) -> bool {
        !self.is_being_destroyed
    }
}

/// A dwelling with aggregate storage and at most one resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct House {
    /// Unique identifier.
    pub id: HouseId,
    /// Architectural style.
    pub house_type: HouseType,
    /// Door tile. NPCs unload when standing here.
    pub position: Position,
    /// Stored items.
    pub inventory: BTreeMap<ItemId, u32>,
    /// Maximum total stored units.
    pub max_storage: u32,
    /// Resident NPC, if any.
    pub npc_id: Option<NpcId>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Read-only view of the simulation, produced once per frame for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Tick counter at snapshot time.
    pub tick: u64,
    /// Simulation time in ms.
    pub now_ms: u64,
    /// In-game hour (0..24).
    pub hour: u8,
    /// All NPCs in id order.
    pub npcs: Vec<Npc>,
    /// All resources (trees, stones, animals) including destroying ones.
    pub resources: Vec<HarvestableResource>,
    /// All houses in id order.
    pub houses: Vec<House>,
}

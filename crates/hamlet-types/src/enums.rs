//! Enumeration types for the Hamlet simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// NPC modes and states
// ---------------------------------------------------------------------------

/// Who drives an NPC's state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ControlMode {
    /// The scheduler finds and performs work on its own.
    Autonomous,
    /// Only explicit commands (player input) change state. Active tasks
    /// still progress through the shared state machine.
    Controlled,
}

/// The labor an NPC performs. Selects the profession behavior strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Profession {
    /// No profession; never finds work.
    None,
    /// Chops trees for wood.
    Lumberjack,
    /// Produces food on a fixed interval.
    Farmer,
    /// Mines stone.
    Miner,
    /// Hunts animals for meat.
    Hunter,
}

/// Position of an NPC in the behavior state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum NpcState {
    /// Waiting for the next decision.
    Idle,
    /// Stepping one tile; returns to `Idle` once the step window elapses.
    Moving,
    /// Working on the current task.
    Working,
    /// Heading home to unload or to rest outside work hours.
    ReturningHome,
}

/// Orthogonal grid direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Towards negative z.
    North,
    /// Towards positive z.
    South,
    /// Towards positive x.
    East,
    /// Towards negative x.
    West,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Unit offset `(dx, dz)` for this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// The kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskType {
    /// Chop a tree.
    ChopTree,
    /// Mine a stone.
    MineStone,
    /// Tend crops in place.
    Farm,
    /// Hunt an animal.
    Hunt,
}

/// Urgency of a task returned by a profession strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskPriority {
    /// Target is out of reach; the NPC must walk towards it first.
    Approach,
    /// Target is adjacent; work can begin immediately.
    Immediate,
}

/// Visual activity hint consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AnimationKind {
    /// Walking between tiles.
    Walk,
    /// Swinging an axe.
    Chop,
    /// Swinging a pickaxe.
    Mine,
    /// Tending crops.
    Farm,
    /// Hunting.
    Hunt,
}

impl From<TaskType> for AnimationKind {
    fn from(task: TaskType) -> Self {
        match task {
            TaskType::ChopTree => Self::Chop,
            TaskType::MineStone => Self::Mine,
            TaskType::Farm => Self::Farm,
            TaskType::Hunt => Self::Hunt,
        }
    }
}

// ---------------------------------------------------------------------------
// World resources
// ---------------------------------------------------------------------------

/// The class of harvestable world object. Each kind has its own registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Trees, harvested by lumberjacks.
    Tree,
    /// Stones, harvested by miners.
    Stone,
    /// Animals, hunted by hunters. Animals wander on their own.
    Animal,
}

impl ResourceKind {
    /// All kinds in registry order.
    pub const ALL: [Self; 3] = [Self::Tree, Self::Stone, Self::Animal];

    /// Species that world generation may spawn for this kind.
    pub const fn species(self) -> &'static [Species] {
        match self {
            Self::Tree => &[Species::Oak, Species::Pine, Species::Birch],
            Self::Stone => &[Species::Granite, Species::Limestone, Species::Boulder],
            Self::Animal => &[Species::Deer, Species::Rabbit, Species::Boar],
        }
    }
}

/// Concrete subtype of a harvestable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Species {
    /// Sturdy broadleaf tree.
    Oak,
    /// Tall conifer.
    Pine,
    /// Slender tree, quick to fell.
    Birch,
    /// Hard rock outcrop.
    Granite,
    /// Soft sedimentary rock.
    Limestone,
    /// Large rock, slow to break.
    Boulder,
    /// Medium game.
    Deer,
    /// Small game, one hit.
    Rabbit,
    /// Tough game.
    Boar,
}

impl Species {
    /// The registry kind this species belongs to.
    pub const fn kind(self) -> ResourceKind {
        match self {
            Self::Oak | Self::Pine | Self::Birch => ResourceKind::Tree,
            Self::Granite | Self::Limestone | Self::Boulder => ResourceKind::Stone,
            Self::Deer | Self::Rabbit | Self::Boar => ResourceKind::Animal,
        }
    }

    /// Starting (and maximum) health of a freshly spawned resource.
    pub const fn max_health(self) -> u32 {
        match self {
            Self::Rabbit => 1,
            Self::Birch => 2,
            Self::Oak | Self::Limestone | Self::Deer => 3,
            Self::Pine => 4,
            Self::Granite | Self::Boar => 5,
            Self::Boulder => 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Items and houses
// ---------------------------------------------------------------------------

/// An item that can be carried in an NPC inventory or stored in a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemId {
    /// Logs from felled trees.
    Wood,
    /// Rubble from mined stones.
    Stone,
    /// Farm produce.
    Food,
    /// Meat from hunted animals.
    Meat,
    /// Animal hide.
    Hide,
    /// Equippable bag that raises carry capacity.
    Backpack,
}

/// Architectural style of a house. Cosmetic apart from default storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HouseType {
    /// Small dwelling.
    Cottage,
    /// Timber dwelling near forests.
    Cabin,
    /// Dwelling with a barn.
    Farmhouse,
}

impl HouseType {
    /// Default storage capacity (total item units) for this style.
    pub const fn default_storage(self) -> u32 {
        match self {
            Self::Cottage => 100,
            Self::Cabin => 150,
            Self::Farmhouse => 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_belong_to_their_kind() {
        for kind in ResourceKind::ALL {
            for species in kind.species() {
                assert_eq!(species.kind(), kind);
                assert!(species.max_health() >= 1);
            }
        }
    }

    #[test]
    fn opposite_directions_cancel() {
        let (nx, nz) = Direction::North.offset();
        let (sx, sz) = Direction::South.offset();
        assert_eq!((nx + sx, nz + sz), (0, 0));
        let (ex, ez) = Direction::East.offset();
        let (wx, wz) = Direction::West.offset();
        assert_eq!((ex + wx, ez + wz), (0, 0));
    }

    #[test]
    fn task_types_map_to_animations() {
        assert_eq!(AnimationKind::from(TaskType::ChopTree), AnimationKind::Chop);
        assert_eq!(AnimationKind::from(TaskType::Hunt), AnimationKind::Hunt);
    }
}

//! Events emitted during a tick.
//!
//! Events are collected into the [`TickSummary`](crate::tick::TickSummary)
//! in the order they happened. They are observational only: nothing in the
//! simulation reads them back.

use hamlet_types::{HouseId, ItemId, NpcId, Position, ResourceId, ResourceKind, TaskType};
use serde::Serialize;

/// Why an NPC dropped its task without finishing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbandonReason {
    /// The target was destroyed or despawned.
    TargetVanished,
    /// The target moved out of reach.
    NotAdjacent,
    /// The work window closed.
    OffShift,
    /// The player moved the NPC or stopped the work.
    Interrupted,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TickEvent {
    /// A destroyed resource was removed from its registry.
    ResourceDespawned {
        /// Registry it was removed from.
        kind: ResourceKind,
        /// Its id.
        id: ResourceId,
    },
    /// An NPC picked up a task.
    TaskAssigned {
        /// The NPC.
        npc: NpcId,
        /// Kind of work.
        task_type: TaskType,
        /// Targeted resource, if any.
        target: Option<ResourceId>,
    },
    /// An NPC stepped one tile.
    Stepped {
        /// The NPC.
        npc: NpcId,
        /// Tile left.
        from: Position,
        /// Tile entered.
        to: Position,
    },
    /// Work was applied to a task that is not finished yet.
    WorkProgressed {
        /// The NPC.
        npc: NpcId,
        /// Progress after this unit.
        progress: u32,
        /// Progress needed to finish.
        max_progress: u32,
    },
    /// A finished task's yield went into the NPC's inventory.
    Harvested {
        /// The NPC.
        npc: NpcId,
        /// Item produced.
        item: ItemId,
        /// Units produced.
        quantity: u32,
    },
    /// A finished task's yield did not fit and was lost.
    StorageFailed {
        /// The NPC.
        npc: NpcId,
        /// Item produced.
        item: ItemId,
        /// Units produced.
        quantity: u32,
        /// Inventory's failure reason.
        reason: String,
    },
    /// An NPC dropped its task.
    TaskAbandoned {
        /// The NPC.
        npc: NpcId,
        /// Why.
        reason: AbandonReason,
    },
    /// An NPC unloaded its raw resources into its house.
    Deposited {
        /// The NPC.
        npc: NpcId,
        /// Receiving house.
        house: HouseId,
        /// Units stored.
        units: u32,
    },
    /// A house refused an NPC's load. The NPC keeps everything.
    DepositRejected {
        /// The NPC.
        npc: NpcId,
        /// Refusing house.
        house: HouseId,
        /// Why.
        reason: String,
    },
    /// An NPC needed to go home but has no house.
    NoHomeAssigned {
        /// The NPC.
        npc: NpcId,
    },
    /// A queued player command was refused.
    CommandRejected {
        /// Target NPC.
        npc: NpcId,
        /// Refusal reason.
        reason: String,
    },
}

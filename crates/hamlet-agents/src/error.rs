//! Error types for the hamlet-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! The `Display` text of each variant is the failure reason surfaced to the
//! UI when a player-issued action is rejected.

use hamlet_types::{ItemId, NpcId};

/// Errors that can occur during NPC state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Adding the items would exceed the item's stack limit.
    #[error("stack limit exceeded: {current} + {attempted} {item:?} exceeds the stack limit of {max_stack}")]
    StackLimitExceeded {
        /// The item being added.
        item: ItemId,
        /// Quantity already held.
        current: u32,
        /// Quantity the caller attempted to add.
        attempted: u32,
        /// Maximum stack size for this item.
        max_stack: u32,
    },

    /// Adding the items would exceed the NPC's carry weight.
    #[error("over capacity: adding {attempted} {item:?} would weigh {resulting_weight} (capacity {capacity})")]
    OverCapacity {
        /// The item being added.
        item: ItemId,
        /// Quantity the caller attempted to add.
        attempted: u32,
        /// Total weight after the addition.
        resulting_weight: u32,
        /// Maximum carry weight.
        capacity: u32,
    },

    /// Attempted to remove more of an item than the NPC holds.
    #[error("insufficient items: wanted {requested} {item:?} but only have {available}")]
    InsufficientItem {
        /// The item being removed.
        item: ItemId,
        /// Quantity requested.
        requested: u32,
        /// Quantity held.
        available: u32,
    },

    /// The item grants no carry bonus and cannot be equipped.
    #[error("{0:?} cannot be equipped")]
    NotEquippable(ItemId),

    /// The item is already equipped.
    #[error("{0:?} is already equipped")]
    AlreadyEquipped(ItemId),

    /// The item is not currently equipped.
    #[error("{0:?} is not equipped")]
    NotEquipped(ItemId),

    /// A manual action was issued before the cooldown expired.
    #[error("cooldown active: {remaining_ms}ms remaining")]
    CooldownActive {
        /// The NPC that issued the action.
        npc: NpcId,
        /// Milliseconds until the next action is accepted.
        remaining_ms: u64,
    },

    /// NPC with the given ID was not found in the manager.
    #[error("npc not found: {0}")]
    NpcNotFound(NpcId),

    /// NPC name already exists in the manager.
    #[error("duplicate npc name: {0}")]
    DuplicateName(String),

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

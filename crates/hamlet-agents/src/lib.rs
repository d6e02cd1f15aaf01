//! NPC inventories, profession strategies, and lifecycle for the Hamlet
//! simulation.
//!
//! This crate contains the per-NPC logic layer: everything that operates on
//! an [`Npc`](hamlet_types::Npc) without driving the tick loop. It sits
//! between `hamlet-world` (grid and registries) and `hamlet-core` (scheduler,
//! commands, clock).
//!
//! # Modules
//!
//! - [`config`] -- Carry, movement, and profession tuning ([`NpcConfig`], [`ProfessionsConfig`])
//! - [`cooldown`] -- Manual-command cooldowns ([`CooldownTracker`])
//! - [`error`] -- Error types for all NPC operations ([`AgentError`])
//! - [`inventory`] -- Item catalog, carry weight, add/remove, equipment
//! - [`npc`] -- NPC creation and ownership ([`NpcManager`])
//! - [`profession`] -- Profession strategies ([`ProfessionBehavior`], [`ProfessionRegistry`])

pub mod config;
pub mod cooldown;
pub mod error;
pub mod inventory;
pub mod npc;
pub mod profession;

// Re-export primary types at crate root for convenience.
pub use config::{FarmerConfig, GathererConfig, NpcConfig, ProfessionsConfig};
pub use cooldown::CooldownTracker;
pub use error::AgentError;
pub use inventory::{ItemDef, item_def};
pub use npc::{NpcManager, SpawnParams};
pub use profession::{
    FarmerBehavior, GathererBehavior, ProfessionBehavior, ProfessionRegistry, UnemployedBehavior,
    WorkContext, WorkResult,
};

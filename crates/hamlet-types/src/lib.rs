//! Shared type definitions for the Hamlet NPC labor simulation.
//!
//! This crate is the single source of truth for the data model shared by the
//! world, agent, and core crates. Types are exported to `TypeScript` via
//! `ts-rs` so the renderer can consume [`WorldSnapshot`] values directly.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier wrappers (UUID-backed NPC/house ids, counter-backed resource ids)
//! - [`enums`] -- Professions, states, directions, tasks, species, and items
//! - [`structs`] -- Positions, NPCs, tasks, resources, houses, and snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AnimationKind, ControlMode, Direction, HouseType, ItemId, NpcState, Profession, ResourceKind,
    Species, TaskPriority, TaskType,
};
pub use ids::{HouseId, NpcId, ResourceId};
pub use structs::{
    HarvestableResource, House, Npc, NpcAnimation, NpcStats, Position, WorkHours, WorkTask,
    WorldSnapshot,
};

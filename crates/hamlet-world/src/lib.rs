//! Grid geometry, harvestable resources, and houses for the Hamlet simulation.
//!
//! This crate models the physical world the NPCs work in: a bounded square
//! grid, one registry per kind of harvestable object with a health and
//! destruction lifecycle, seeded per-chunk generation, and the directory of
//! houses NPCs return to.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world operations ([`WorldError`]).
//! - [`grid`] -- Bounds, Manhattan distance, adjacency, step selection, chunks.
//! - [`house`] -- [`HouseDirectory`]: residents and all-or-nothing storage deposits.
//! - [`resource`] -- [`ResourceRegistry`]: add, damage, despawn, nearest search,
//!   chunk generation, and wandering.
//! - [`state`] -- [`WorldState`]: the bundle passed to strategies and the scheduler.

pub mod error;
pub mod grid;
pub mod house;
pub mod resource;
pub mod state;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{
    ChunkCoord, GridBounds, adjacent_positions, is_adjacent, manhattan_distance, step_candidates,
};
pub use house::HouseDirectory;
pub use resource::{DEFAULT_DESPAWN_DELAY_MS, ResourceRegistry};
pub use state::{Despawned, SpawnDensities, WorldState};

//! Error types for the `hamlet-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use hamlet_types::{HouseId, NpcId, Position, ResourceId, ResourceKind, Species};

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The position lies outside the world bounds.
    #[error("position {0} is outside the world bounds")]
    InvalidPosition(Position),

    /// A resource already occupies the tile.
    #[error("position {position} is already occupied by {occupant}")]
    PositionOccupied {
        /// The contested tile.
        position: Position,
        /// The resource already there.
        occupant: ResourceId,
    },

    /// A species was offered to the registry of another kind.
    #[error("species {species:?} cannot be added to the {registry:?} registry")]
    WrongKind {
        /// The rejected species.
        species: Species,
        /// The registry that rejected it.
        registry: ResourceKind,
    },

    /// No resource with this id exists in the registry.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// No house with this id exists in the directory.
    #[error("house not found: {0}")]
    HouseNotFound(HouseId),

    /// The house already has a different resident.
    #[error("house {house} is already occupied by {resident}")]
    HouseOccupied {
        /// The house.
        house: HouseId,
        /// The current resident.
        resident: NpcId,
    },

    /// The house cannot hold the deposit.
    #[error("house {house} storage full: {requested} units offered, {available} free")]
    StorageFull {
        /// The house.
        house: HouseId,
        /// Units the caller tried to store.
        requested: u32,
        /// Units of free space remaining.
        available: u32,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}

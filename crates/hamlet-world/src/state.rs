//! The [`WorldState`] bundle handed to profession strategies and the scheduler.
//!
//! It owns the grid bounds, one [`ResourceRegistry`] per [`ResourceKind`],
//! and the [`HouseDirectory`]. Nothing in the world is a global: callers pass
//! `&WorldState` when they only look, `&mut WorldState` when they mutate.

use std::collections::BTreeSet;

use hamlet_types::{HarvestableResource, Position, ResourceId, ResourceKind, Species};
use rand::Rng;

use crate::error::WorldError;
use crate::grid::{ChunkCoord, GridBounds};
use crate::house::HouseDirectory;
use crate::resource::ResourceRegistry;

/// Per-kind spawn densities (per mille, chance out of 1000 per tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnDensities {
    /// Tree density.
    pub trees: u32,
    /// Stone density.
    pub stones: u32,
    /// Animal density.
    pub animals: u32,
}

impl SpawnDensities {
    /// Density for one kind.
    pub const fn for_kind(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Tree => self.trees,
            ResourceKind::Stone => self.stones,
            ResourceKind::Animal => self.animals,
        }
    }
}

/// A resource removed from its registry after the despawn delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Despawned {
    /// Registry it was removed from.
    pub kind: ResourceKind,
    /// Its id (never reused).
    pub id: ResourceId,
}

/// All mutable world state outside the NPCs themselves.
#[derive(Debug, Clone)]
pub struct WorldState {
    bounds: GridBounds,
    trees: ResourceRegistry,
    stones: ResourceRegistry,
    animals: ResourceRegistry,
    /// Dwellings and their storage.
    pub houses: HouseDirectory,
}

impl WorldState {
    /// Create an empty world.
    pub const fn new(bounds: GridBounds, despawn_delay_ms: u64) -> Self {
        Self {
            bounds,
            trees: ResourceRegistry::new(ResourceKind::Tree, despawn_delay_ms),
            stones: ResourceRegistry::new(ResourceKind::Stone, despawn_delay_ms),
            animals: ResourceRegistry::new(ResourceKind::Animal, despawn_delay_ms),
            houses: HouseDirectory::new(),
        }
    }

    /// The valid region.
    pub const fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// The registry that owns `kind`.
    pub const fn registry(&self, kind: ResourceKind) -> &ResourceRegistry {
        match kind {
            ResourceKind::Tree => &self.trees,
            ResourceKind::Stone => &self.stones,
            ResourceKind::Animal => &self.animals,
        }
    }

    /// Mutable access to the registry that owns `kind`.
    pub const fn registry_mut(&mut self, kind: ResourceKind) -> &mut ResourceRegistry {
        match kind {
            ResourceKind::Tree => &mut self.trees,
            ResourceKind::Stone => &mut self.stones,
            ResourceKind::Animal => &mut self.animals,
        }
    }

    /// The resource on `pos` across all registries, if any.
    pub fn resource_at(&self, pos: Position) -> Option<&HarvestableResource> {
        ResourceKind::ALL
            .iter()
            .find_map(|kind| self.registry(*kind).get_at(pos))
    }

    /// Whether a tile cannot be entered: out of bounds, or a tree, stone,
    /// or animal (live or destroying) stands on it. Houses do not block.
    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.bounds.is_valid(pos) || self.resource_at(pos).is_some()
    }

    /// Place a resource, refusing tiles occupied by any registry.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceRegistry::add`], plus
    /// [`WorldError::PositionOccupied`] when another kind holds the tile.
    pub fn place_resource(
        &mut self,
        position: Position,
        species: Species,
    ) -> Result<ResourceId, WorldError> {
        if let Some(existing) = self.resource_at(position) {
            return Err(WorldError::PositionOccupied {
                position,
                occupant: existing.id,
            });
        }
        let bounds = self.bounds;
        self.registry_mut(species.kind()).add(position, species, &bounds)
    }

    /// Every tile currently holding a resource.
    pub fn occupied_tiles(&self) -> BTreeSet<Position> {
        ResourceKind::ALL
            .iter()
            .flat_map(|kind| self.registry(*kind).iter().map(|r| r.position))
            .collect()
    }

    /// Generate all three kinds for one chunk.
    ///
    /// Tiles in `reserved` (spawn points, house doors) and tiles already
    /// holding a resource of any kind stay empty. Generation per kind is
    /// idempotent. Returns the number of resources spawned.
    pub fn generate_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: u32,
        densities: SpawnDensities,
        seed: u64,
        reserved: &BTreeSet<Position>,
    ) -> usize {
        let bounds = self.bounds;
        let mut spawned: usize = 0;
        for kind in ResourceKind::ALL {
            let mut blocked = self.occupied_tiles();
            blocked.extend(reserved.iter().copied());
            let added = self.registry_mut(kind).generate_chunk(
                chunk,
                chunk_size,
                densities.for_kind(kind),
                seed,
                &bounds,
                &blocked,
            );
            spawned = spawned.saturating_add(added);
        }
        spawned
    }

    /// Move animals around. See [`ResourceRegistry::wander`].
    pub fn wander_animals<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        chance_pct: u32,
        reserved: &BTreeSet<Position>,
    ) -> Vec<(ResourceId, Position)> {
        let bounds = self.bounds;
        let mut occupied = self.occupied_tiles();
        occupied.extend(reserved.iter().copied());
        self.animals.wander(rng, chance_pct, &bounds, &mut occupied)
    }

    /// Remove expired destroying resources from every registry.
    pub fn remove_expired(&mut self, now: u64) -> Vec<Despawned> {
        let mut removed = Vec::new();
        for kind in ResourceKind::ALL {
            removed.extend(
                self.registry_mut(kind)
                    .remove_expired(now)
                    .into_iter()
                    .map(|id| Despawned { kind, id }),
            );
        }
        removed
    }

    /// Every resource of every kind, ordered by kind then id.
    pub fn all_resources(&self) -> Vec<HarvestableResource> {
        ResourceKind::ALL
            .iter()
            .flat_map(|kind| self.registry(*kind).iter().cloned())
            .collect()
    }
}

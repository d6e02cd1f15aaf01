//! Registries of harvestable world objects (trees, stones, animals).
//!
//! A [`ResourceRegistry`] owns every resource of one [`ResourceKind`].
//! Resources are created by world generation, damaged by working NPCs, and
//! enter an irreversible *destroying* phase when their health reaches zero.
//! Destroying resources stay in the registry (so the renderer can play the
//! despawn animation) but are excluded from every availability query. They
//! are removed by [`ResourceRegistry::remove_expired`] once exactly
//! `despawn_delay_ms` has elapsed.
//!
//! Storage is a `BTreeMap` keyed by [`ResourceId`], so iteration is always in
//! ascending id order. Nearest-candidate searches rely on this to break
//! distance ties deterministically.

use std::collections::{BTreeMap, BTreeSet};

use hamlet_types::{HarvestableResource, Position, ResourceId, ResourceKind, Species};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::{ChunkCoord, GridBounds, adjacent_positions, manhattan_distance};

/// Default time a destroyed resource lingers before removal.
pub const DEFAULT_DESPAWN_DELAY_MS: u64 = 1_000;

/// Spawn density is expressed per mille (chance out of 1000 per tile).
const DENSITY_SCALE: u32 = 1_000;

/// Owning collection for one kind of harvestable object.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    /// Which kind of resource this registry holds.
    kind: ResourceKind,
    /// Live and destroying resources by id.
    resources: BTreeMap<ResourceId, HarvestableResource>,
    /// Next id to hand out. Ids are never reused.
    next_id: u64,
    /// How long a destroyed resource lingers before removal.
    despawn_delay_ms: u64,
    /// Chunks already populated by generation.
    generated_chunks: BTreeSet<ChunkCoord>,
}

impl ResourceRegistry {
    /// Create an empty registry for `kind`.
    pub const fn new(kind: ResourceKind, despawn_delay_ms: u64) -> Self {
        Self {
            kind,
            resources: BTreeMap::new(),
            next_id: 1,
            despawn_delay_ms,
            generated_chunks: BTreeSet::new(),
        }
    }

    /// The kind of resource held here.
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Configured despawn delay.
    pub const fn despawn_delay_ms(&self) -> u64 {
        self.despawn_delay_ms
    }

    /// Number of resources, including destroying ones.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry holds no resources at all.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Add a resource at `position`.
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvalidPosition`] if `position` is out of bounds.
    /// - [`WorldError::WrongKind`] if `species` belongs to another registry.
    /// - [`WorldError::PositionOccupied`] if any resource of this registry
    ///   (live or destroying) is already on the tile.
    pub fn add(
        &mut self,
        position: Position,
        species: Species,
        bounds: &GridBounds,
    ) -> Result<ResourceId, WorldError> {
        if !bounds.is_valid(position) {
            return Err(WorldError::InvalidPosition(position));
        }
        if species.kind() != self.kind {
            return Err(WorldError::WrongKind {
                species,
                registry: self.kind,
            });
        }
        if let Some(existing) = self.get_at(position) {
            return Err(WorldError::PositionOccupied {
                position,
                occupant: existing.id,
            });
        }

        let id = ResourceId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;

        let health = species.max_health();
        self.resources.insert(
            id,
            HarvestableResource {
                id,
                kind: self.kind,
                species,
                position,
                health,
                max_health: health,
                is_being_destroyed: false,
                destruction_started_at: None,
                last_hit_at: None,
            },
        );
        Ok(id)
    }

    /// Look up a resource by id (live or destroying).
    pub fn get(&self, id: ResourceId) -> Option<&HarvestableResource> {
        self.resources.get(&id)
    }

    /// Exact-position lookup (live or destroying).
    pub fn get_at(&self, position: Position) -> Option<&HarvestableResource> {
        self.resources.values().find(|r| r.position == position)
    }

    /// All resources in ascending id order, including destroying ones.
    pub fn iter(&self) -> impl Iterator<Item = &HarvestableResource> {
        self.resources.values()
    }

    /// Resources that can still be targeted, in ascending id order.
    pub fn available(&self) -> impl Iterator<Item = &HarvestableResource> {
        self.resources.values().filter(|r| r.is_available())
    }

    /// Apply `amount` damage to a resource at time `now`.
    ///
    /// Records the hit for the renderer. When health reaches zero the
    /// resource enters the destroying phase. Returns `true` only if this
    /// call caused the destruction. Hitting an already destroying resource
    /// is a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ResourceNotFound`] if the id is unknown.
    pub fn damage(&mut self, id: ResourceId, amount: u32, now: u64) -> Result<bool, WorldError> {
        let resource = self
            .resources
            .get_mut(&id)
            .ok_or(WorldError::ResourceNotFound(id))?;

        if resource.is_being_destroyed {
            return Ok(false);
        }

        resource.health = resource.health.saturating_sub(amount);
        resource.last_hit_at = Some(now);

        if resource.health == 0 {
            resource.is_being_destroyed = true;
            resource.destruction_started_at = Some(now);
            debug!(kind = ?self.kind, %id, at = %resource.position, "Resource destroyed");
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove every destroying resource whose despawn delay has elapsed.
    ///
    /// A resource destroyed at `t` is removed by the first call with
    /// `now >= t + despawn_delay_ms`. Returns the removed ids.
    pub fn remove_expired(&mut self, now: u64) -> Vec<ResourceId> {
        let delay = self.despawn_delay_ms;
        let expired: Vec<ResourceId> = self
            .resources
            .values()
            .filter(|r| {
                r.destruction_started_at
                    .is_some_and(|started| now >= started.saturating_add(delay))
            })
            .map(|r| r.id)
            .collect();

        for id in &expired {
            self.resources.remove(id);
        }
        if !expired.is_empty() {
            debug!(kind = ?self.kind, count = expired.len(), "Despawned resources");
        }
        expired
    }

    /// Find the nearest available resource within `max_distance` of
    /// `position` that satisfies `predicate`.
    ///
    /// Equal distances are broken by ascending id.
    pub fn find_nearest<P>(
        &self,
        position: Position,
        max_distance: u32,
        predicate: P,
    ) -> Option<&HarvestableResource>
    where
        P: Fn(&HarvestableResource) -> bool,
    {
        let mut best: Option<(u32, &HarvestableResource)> = None;
        for resource in self.available() {
            let distance = manhattan_distance(position, resource.position);
            if distance > max_distance || !predicate(resource) {
                continue;
            }
            // Strict comparison keeps the lowest id among equals.
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, resource));
            }
        }
        best.map(|(_, resource)| resource)
    }

    /// Whether generation already ran for `chunk`.
    pub fn is_chunk_generated(&self, chunk: ChunkCoord) -> bool {
        self.generated_chunks.contains(&chunk)
    }

    /// Populate one chunk with resources of this registry's kind.
    ///
    /// Each in-bounds, unoccupied tile spawns a resource with probability
    /// `density_per_mille / 1000`; the species is drawn uniformly from
    /// [`ResourceKind::species`]. `blocked` marks tiles that must stay
    /// empty (other registries' resources, houses, spawn points).
    ///
    /// Randomness is derived from `(seed, kind, chunk)`, so the outcome does
    /// not depend on the order in which chunks are generated. A chunk that
    /// was already generated is left untouched and `0` is returned.
    pub fn generate_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: u32,
        density_per_mille: u32,
        seed: u64,
        bounds: &GridBounds,
        blocked: &BTreeSet<Position>,
    ) -> usize {
        if !self.generated_chunks.insert(chunk) {
            return 0;
        }

        let mut rng = StdRng::seed_from_u64(chunk_seed(seed, self.kind, chunk));
        let species = self.kind.species();
        let density = density_per_mille.min(DENSITY_SCALE);
        let mut spawned: usize = 0;

        for tile in chunk.tiles(chunk_size) {
            // Roll for every tile so skipped tiles do not shift the sequence.
            let roll = rng.random_range(0..DENSITY_SCALE);
            let pick = rng.random_range(0..species.len());
            if roll >= density || !bounds.is_valid(tile) || blocked.contains(&tile) {
                continue;
            }
            let Some(&chosen) = species.get(pick) else {
                continue;
            };
            if self.add(tile, chosen, bounds).is_ok() {
                spawned = spawned.saturating_add(1);
            }
        }

        debug!(kind = ?self.kind, chunk_x = chunk.x, chunk_z = chunk.z, spawned, "Chunk generated");
        spawned
    }

    /// Let available resources wander to a random free neighbor.
    ///
    /// Each available resource moves with probability `chance_pct / 100`.
    /// `occupied` holds every tile that blocks movement; it is updated as
    /// resources move so two movers never land on the same tile. Destroying
    /// resources stay put. Returns the `(id, new_position)` of every mover.
    ///
    /// Only the animal registry is wandered by the tick cycle.
    pub fn wander<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        chance_pct: u32,
        bounds: &GridBounds,
        occupied: &mut BTreeSet<Position>,
    ) -> Vec<(ResourceId, Position)> {
        let mut moved = Vec::new();
        for resource in self.resources.values_mut() {
            if !resource.is_available() || rng.random_range(0..100) >= chance_pct {
                continue;
            }
            let free: Vec<Position> = adjacent_positions(resource.position)
                .into_iter()
                .filter(|p| bounds.is_valid(*p) && !occupied.contains(p))
                .collect();
            if free.is_empty() {
                continue;
            }
            let Some(&destination) = free.get(rng.random_range(0..free.len())) else {
                continue;
            };
            occupied.remove(&resource.position);
            occupied.insert(destination);
            resource.position = destination;
            moved.push((resource.id, destination));
        }
        moved
    }
}

/// Derive a per-chunk RNG seed from the world seed.
///
/// Folds the world seed, a per-kind salt, and the chunk coordinates
/// together with odd multipliers, then finishes with a multiply and
/// xorshift avalanche so neighboring chunks get unrelated sequences.
const fn chunk_seed(world_seed: u64, kind: ResourceKind, chunk: ChunkCoord) -> u64 {
    let kind_salt: u64 = match kind {
        ResourceKind::Tree => 0x7472_6565,
        ResourceKind::Stone => 0x7374_6f6e,
        ResourceKind::Animal => 0x616e_696d,
    };
    #[allow(clippy::cast_sign_loss)]
    let cx = chunk.x as u32 as u64;
    #[allow(clippy::cast_sign_loss)]
    let cz = chunk.z as u32 as u64;

    let mut state = world_seed
        .wrapping_add(kind_salt.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(cx.wrapping_mul(0x517c_c1b7_2722_0a95))
        .wrapping_add((cz << 32).wrapping_mul(0x2545_f491_4f6c_dd1d));

    if state == 0 {
        state = 0xdead_beef_cafe_babe;
    }

    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    state
}

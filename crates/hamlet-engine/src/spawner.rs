//! Village spawner for seeding the simulation with houses and villagers.
//!
//! At simulation start, the spawner builds one house per villager in a row
//! just north of the origin, spawns each villager on its house door, links
//! the two, and generates the resource chunks around the village. Houses
//! are placed before any chunk is generated so door tiles stay free.

use std::collections::BTreeSet;

use hamlet_agents::SpawnParams;
use hamlet_core::Simulation;
use hamlet_core::config::VillagerConfig;
use hamlet_types::{HouseId, HouseType, NpcId, Position, Profession};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of villager names. Extra villagers draw from it without
/// replacement.
const NAME_POOL: &[&str] = &[
    "Ash", "Brook", "Clay", "Dawn", "Elm", "Fern", "Gale", "Heath", "Ivy", "Jay", "Kestrel",
    "Lark", "Maple", "Nettle", "Orrin", "Pebble", "Quill", "Reed", "Sage", "Thorn", "Umber",
    "Vale", "Wren", "Yarrow",
];

/// Professions handed out to extra villagers.
const EXTRA_PROFESSIONS: [Profession; 4] = [
    Profession::Lumberjack,
    Profession::Miner,
    Profession::Hunter,
    Profession::Farmer,
];

/// Row of house doors, in tiles from the origin along z.
const DOOR_ROW_Z: i32 = -2;

// -----------------------------------------------------------------------
// Spawning result
// -----------------------------------------------------------------------

/// The output of the village spawner.
#[derive(Debug)]
pub struct SpawnResult {
    /// Spawned villagers, in spawn order.
    pub npcs: Vec<NpcId>,
    /// Houses built, parallel to `npcs`.
    pub houses: Vec<HouseId>,
    /// Resources generated around the village.
    pub resources: usize,
}

/// Build the configured village and the world around it.
///
/// # Errors
///
/// - [`EngineError::Spawner`] if a door falls outside integer range.
/// - [`EngineError::World`] if a door lies outside the grid.
/// - [`EngineError::Setup`] if a villager cannot be spawned (for example a
///   duplicate name).
pub fn spawn_village(sim: &mut Simulation) -> Result<SpawnResult, EngineError> {
    let village = sim.config().village.clone();
    let radius = sim.config().world.initial_chunk_radius;
    let mut rng = StdRng::seed_from_u64(sim.config().world.seed);

    let mut villagers = village.villagers;
    let mut taken: BTreeSet<String> = villagers.iter().map(|v| v.name.clone()).collect();
    for _ in 0..village.extra_villagers {
        let villager = random_villager(&mut rng, &taken);
        taken.insert(villager.name.clone());
        villagers.push(villager);
    }

    let count = villagers.len();
    let bounds = *sim.world().bounds();
    let mut npcs = Vec::with_capacity(count);
    let mut houses = Vec::with_capacity(count);

    for (index, villager) in villagers.into_iter().enumerate() {
        let door =
            door_position(index, count, village.house_spacing).ok_or_else(|| EngineError::Spawner {
                message: format!("house {index} of {count} does not fit the coordinate range"),
            })?;
        let house = sim
            .world_mut()
            .houses
            .add_house(villager.house, door, &bounds)?;

        let mut params = SpawnParams::new(villager.name.clone(), door, villager.profession);
        params.house_id = Some(house);
        let npc = sim.spawn_npc(params)?;

        info!(
            npc = %npc,
            name = %villager.name,
            profession = ?villager.profession,
            house = %house,
            door = %door,
            "Spawned villager"
        );
        npcs.push(npc);
        houses.push(house);
    }

    let resources = sim.generate_around(Position::new(0, 0), radius);
    info!(
        villagers = npcs.len(),
        resources,
        chunk_radius = radius,
        "Village spawned"
    );

    Ok(SpawnResult {
        npcs,
        houses,
        resources,
    })
}

/// Door tile for house `index` of `count`, centred on x = 0.
fn door_position(index: usize, count: usize, spacing: i32) -> Option<Position> {
    let index = i32::try_from(index).ok()?;
    let count = i32::try_from(count).ok()?;
    let half = count.checked_sub(1)?.checked_div(2)?;
    let x = index.checked_sub(half)?.checked_mul(spacing)?;
    Some(Position::new(x, DOOR_ROW_Z))
}

/// A villager with an unused pool name and a random gathering profession.
fn random_villager(rng: &mut impl Rng, taken: &BTreeSet<String>) -> VillagerConfig {
    let available: Vec<&str> = NAME_POOL
        .iter()
        .filter(|name| !taken.contains(**name))
        .copied()
        .collect();

    let name = if available.is_empty() {
        fallback_name(taken)
    } else {
        let idx = rng.random_range(0..available.len());
        available
            .get(idx)
            .map_or_else(|| fallback_name(taken), |name| (*name).to_owned())
    };

    let idx = rng.random_range(0..EXTRA_PROFESSIONS.len());
    let profession = EXTRA_PROFESSIONS
        .get(idx)
        .copied()
        .unwrap_or(Profession::Farmer);

    VillagerConfig {
        name,
        profession,
        house: HouseType::Cottage,
    }
}

/// First `Villager-N` name not already taken.
fn fallback_name(taken: &BTreeSet<String>) -> String {
    (1_u32..)
        .map(|n| format!("Villager-{n}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_default()
}

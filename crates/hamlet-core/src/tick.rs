//! Tick cycle: the loop body that drives the Hamlet simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance simulation time by the tick delta.
//! 2. **Despawn** -- remove destroyed resources whose despawn delay elapsed.
//! 3. **Wildlife** -- animals may step to a free neighbouring tile.
//! 4. **Cooldowns** -- prune expired manual-command cooldowns.
//! 5. **NPCs** -- run the scheduler once per NPC in ascending id order.
//! 6. **Summary** -- collect events and per-state counts.
//!
//! The tick cycle is deterministic given the same configuration, the same
//! commands, and the same deltas.

use std::collections::BTreeSet;

use hamlet_agents::{AgentError, NpcManager, SpawnParams};
use hamlet_types::{HouseId, Npc, NpcId, NpcState, Position, WorldSnapshot};
use hamlet_world::{ChunkCoord, GridBounds, WorldError, WorldState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::clock::{ClockError, HOURS_PER_DAY, SimClock};
use crate::config::SimulationConfig;
use crate::event::TickEvent;
use crate::scheduler::{Scheduler, TickContext};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Errors from building or populating a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The clock configuration is invalid.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An NPC operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Spawn parameters carry a work window outside 0..24.
    #[error("invalid work hours {start_hour}..{end_hour}: hours must be below 24")]
    InvalidWorkHours {
        /// Requested start hour.
        start_hour: u8,
        /// Requested end hour.
        end_hour: u8,
    },
}

/// Number of NPCs in each state at the end of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    /// NPCs in `Idle`.
    pub idle: u32,
    /// NPCs in `Moving`.
    pub moving: u32,
    /// NPCs in `Working`.
    pub working: u32,
    /// NPCs in `ReturningHome`.
    pub returning_home: u32,
}

impl StateCounts {
    /// Count the states of `npcs`.
    pub fn from_npcs<'a>(npcs: impl Iterator<Item = &'a Npc>) -> Self {
        let mut counts = Self::default();
        for npc in npcs {
            let slot = match npc.state {
                NpcState::Idle => &mut counts.idle,
                NpcState::Moving => &mut counts.moving,
                NpcState::Working => &mut counts.working,
                NpcState::ReturningHome => &mut counts.returning_home,
            };
            *slot = slot.saturating_add(1);
        }
        counts
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulation time at the end of the tick.
    pub now_ms: u64,
    /// In-game hour during this tick.
    pub hour: u8,
    /// Everything that happened, in order.
    pub events: Vec<TickEvent>,
    /// Animals that stepped this tick.
    pub animals_moved: usize,
    /// NPC states at the end of the tick.
    pub states: StateCounts,
}

/// The whole simulation: clock, world, NPCs, and the scheduler.
///
/// Nothing is global. The input layer mutates NPCs only through
/// [`Simulation::dispatch`], the renderer reads through
/// [`Simulation::snapshot`].
#[derive(Debug)]
pub struct Simulation {
    pub(crate) clock: SimClock,
    pub(crate) world: WorldState,
    pub(crate) npcs: NpcManager,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: StdRng,
    pub(crate) config: SimulationConfig,
}

impl Simulation {
    /// Build an empty simulation (no NPCs, houses, or resources).
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Clock`] if the time configuration is invalid.
    pub fn new(config: SimulationConfig) -> Result<Self, SetupError> {
        let clock = SimClock::new(&config.time)?;
        let world = WorldState::new(
            GridBounds::new(config.world.half_extent),
            config.resources.despawn_delay_ms,
        );
        let scheduler = Scheduler::new(config.npc.clone(), &config.professions);
        let rng = StdRng::seed_from_u64(config.world.seed);
        Ok(Self {
            clock,
            world,
            npcs: NpcManager::new(),
            scheduler,
            rng,
            config,
        })
    }

    /// The clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The world (registries and houses).
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world access for setup (placing resources, building houses).
    pub const fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// All NPCs.
    pub const fn npcs(&self) -> &NpcManager {
        &self.npcs
    }

    /// Look up one NPC.
    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(id)
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The configuration this simulation was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Spawn an NPC on a free, in-bounds tile.
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvalidPosition`] if the tile is outside the grid.
    /// - [`WorldError::PositionOccupied`] if a resource stands there.
    /// - [`SetupError::InvalidWorkHours`] if an explicit work window names
    ///   an hour of 24 or more.
    /// - Any [`AgentError`] from [`NpcManager::spawn`].
    pub fn spawn_npc(&mut self, mut params: SpawnParams) -> Result<NpcId, SetupError> {
        if let Some(hours) = params.work_hours {
            if u64::from(hours.start_hour) >= HOURS_PER_DAY
                || u64::from(hours.end_hour) >= HOURS_PER_DAY
            {
                return Err(SetupError::InvalidWorkHours {
                    start_hour: hours.start_hour,
                    end_hour: hours.end_hour,
                });
            }
        }
        let position = params.position;
        if !self.world.bounds().is_valid(position) {
            return Err(WorldError::InvalidPosition(position).into());
        }
        if let Some(occupant) = self.world.resource_at(position) {
            return Err(WorldError::PositionOccupied {
                position,
                occupant: occupant.id,
            }
            .into());
        }
        let house = params.house_id.take();
        let id = self.npcs.spawn(params, &self.config.npc)?;
        if let Some(house) = house {
            if let Err(err) = self.assign_house(id, house) {
                self.npcs.remove(id)?;
                return Err(err);
            }
        }
        Ok(id)
    }

    /// Link an NPC and a house both ways. The NPC's previous house, if any,
    /// becomes vacant.
    ///
    /// # Errors
    ///
    /// - [`AgentError::NpcNotFound`] if the NPC does not exist.
    /// - [`WorldError::HouseNotFound`] or [`WorldError::HouseOccupied`].
    pub fn assign_house(&mut self, npc_id: NpcId, house: HouseId) -> Result<(), SetupError> {
        let npc = self
            .npcs
            .get_mut(npc_id)
            .ok_or(AgentError::NpcNotFound(npc_id))?;
        self.world.houses.assign_resident(house, npc_id)?;
        if let Some(previous) = npc.house_id.filter(|previous| *previous != house) {
            self.world.houses.vacate(previous)?;
        }
        npc.house_id = Some(house);
        debug!(npc = %npc_id, %house, "House assigned");
        Ok(())
    }

    /// Tiles kept free of spawned and wandering resources: house doors and
    /// NPC positions.
    pub fn reserved_tiles(&self) -> BTreeSet<Position> {
        self.world
            .houses
            .iter()
            .map(|house| house.position)
            .chain(self.npcs.iter().map(|npc| npc.position))
            .collect()
    }

    /// Generate every chunk within `radius` chunks of the chunk holding
    /// `center`. Already generated chunks are skipped. Returns the number of
    /// resources spawned.
    pub fn generate_around(&mut self, center: Position, radius: u32) -> usize {
        let chunk_size = self.config.world.chunk_size;
        let Some(origin) = ChunkCoord::containing(center, chunk_size) else {
            return 0;
        };
        let reserved = self.reserved_tiles();
        let densities = self.config.resources.densities();
        let seed = self.config.world.seed;
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);

        let mut spawned: usize = 0;
        for dx in radius.saturating_neg()..=radius {
            for dz in radius.saturating_neg()..=radius {
                let chunk = ChunkCoord::new(origin.x.saturating_add(dx), origin.z.saturating_add(dz));
                let added = self
                    .world
                    .generate_chunk(chunk, chunk_size, densities, seed, &reserved);
                spawned = spawned.saturating_add(added);
            }
        }
        spawned
    }

    /// Execute one tick covering `delta_ms` of simulation time.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if simulation time would overflow.
    pub fn run_tick(&mut self, delta_ms: u64) -> Result<TickSummary, TickError> {
        // --- Phase 1: Clock ---
        let now = self.clock.advance(delta_ms)?;
        let tick = self.clock.tick();
        let hour = self.clock.hour();
        let mut events = Vec::new();

        // --- Phase 2: Despawn ---
        events.extend(
            self.world
                .remove_expired(now)
                .into_iter()
                .map(|gone| TickEvent::ResourceDespawned {
                    kind: gone.kind,
                    id: gone.id,
                }),
        );

        // --- Phase 3: Wildlife ---
        let reserved = self.reserved_tiles();
        let animals_moved = self
            .world
            .wander_animals(
                &mut self.rng,
                self.config.resources.animal_wander_chance_pct,
                &reserved,
            )
            .len();

        // --- Phase 4: Cooldowns ---
        self.scheduler.cooldowns_mut().prune(now);

        // --- Phase 5: NPCs ---
        let ctx = TickContext {
            now,
            delta_ms,
            hour,
        };
        for npc in self.npcs.iter_mut() {
            self.scheduler.update(npc, &mut self.world, ctx, &mut events);
        }

        // --- Phase 6: Summary ---
        let states = StateCounts::from_npcs(self.npcs.iter());
        debug!(
            tick,
            now,
            hour,
            events = events.len(),
            working = states.working,
            "Tick complete"
        );

        Ok(TickSummary {
            tick,
            now_ms: now,
            hour,
            events,
            animals_moved,
            states,
        })
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.clock.tick(),
            now_ms: self.clock.now_ms(),
            hour: self.clock.hour(),
            npcs: self.npcs.iter().cloned().collect(),
            resources: self.world.all_resources(),
            houses: self.world.houses.iter().cloned().collect(),
        }
    }

    /// Log a one-line overview of the population.
    pub fn log_overview(&self) {
        info!(
            npcs = self.npcs.len(),
            houses = self.world.houses.len(),
            resources = self.world.all_resources().len(),
            hour = self.clock.hour(),
            "Simulation overview"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_types::{HouseType, Profession, Species, WorkHours};

    use super::*;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.resources.animal_wander_chance_pct = 0;
        config
    }

    #[test]
    fn tick_advances_clock() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let summary = sim.run_tick(100).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.now_ms, 100);
        assert_eq!(sim.clock().tick(), 1);
    }

    #[test]
    fn spawn_rejects_occupied_and_out_of_bounds_tiles() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.world_mut().place_resource(Position::new(1, 1), Species::Oak).unwrap();
        let on_tree = sim.spawn_npc(SpawnParams::new("A", Position::new(1, 1), Profession::None));
        assert!(matches!(
            on_tree,
            Err(SetupError::World {
                source: WorldError::PositionOccupied { .. }
            })
        ));
        let outside = sim.spawn_npc(SpawnParams::new("B", Position::new(999, 0), Profession::None));
        assert!(matches!(
            outside,
            Err(SetupError::World {
                source: WorldError::InvalidPosition(_)
            })
        ));
        assert!(sim.npcs().is_empty());
    }

    #[test]
    fn spawn_rejects_work_hours_past_midnight() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        for (start_hour, end_hour) in [(24, 6), (8, 24), (30, 40)] {
            let mut params = SpawnParams::new("Late", Position::new(0, 0), Profession::None);
            params.work_hours = Some(WorkHours {
                start_hour,
                end_hour,
            });
            assert!(matches!(
                sim.spawn_npc(params),
                Err(SetupError::InvalidWorkHours { .. })
            ));
        }
        assert!(sim.npcs().is_empty());

        let mut params = SpawnParams::new("Late", Position::new(0, 0), Profession::None);
        params.work_hours = Some(WorkHours {
            start_hour: 22,
            end_hour: 23,
        });
        assert!(sim.spawn_npc(params).is_ok());
    }

    #[test]
    fn assign_house_links_both_ways() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let bounds = *sim.world().bounds();
        let first = sim
            .world_mut()
            .houses
            .add_house(HouseType::Cottage, Position::new(3, 3), &bounds)
            .unwrap();
        let second = sim
            .world_mut()
            .houses
            .add_house(HouseType::Cabin, Position::new(-3, 3), &bounds)
            .unwrap();
        let mut params = SpawnParams::new("Kit", Position::new(0, 0), Profession::Farmer);
        params.house_id = Some(first);
        let id = sim.spawn_npc(params).unwrap();
        assert_eq!(sim.world().houses.get(first).unwrap().npc_id, Some(id));

        sim.assign_house(id, second).unwrap();
        assert_eq!(sim.npc(id).unwrap().house_id, Some(second));
        assert_eq!(sim.world().houses.get(first).unwrap().npc_id, None);
        assert_eq!(sim.world().houses.get(second).unwrap().npc_id, Some(id));
    }

    #[test]
    fn generation_skips_reserved_tiles_and_is_idempotent() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.spawn_npc(SpawnParams::new("Kit", Position::new(0, 0), Profession::None))
            .unwrap();
        let first = sim.generate_around(Position::new(0, 0), 1);
        assert!(first > 0);
        assert!(sim.world().resource_at(Position::new(0, 0)).is_none());
        assert_eq!(sim.generate_around(Position::new(0, 0), 1), 0);
    }

    #[test]
    fn snapshot_serializes() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.spawn_npc(SpawnParams::new("Kit", Position::new(0, 0), Profession::Farmer))
            .unwrap();
        sim.run_tick(100).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.npcs.len(), 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"Kit\""));
    }

    #[test]
    fn state_counts_cover_all_npcs() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.world_mut().place_resource(Position::new(1, 0), Species::Oak).unwrap();
        sim.spawn_npc(SpawnParams::new("A", Position::new(0, 0), Profession::Lumberjack))
            .unwrap();
        sim.spawn_npc(SpawnParams::new("B", Position::new(-4, -4), Profession::None))
            .unwrap();
        let summary = sim.run_tick(100).unwrap();
        assert_eq!(summary.states.working, 1);
        assert_eq!(summary.states.idle, 1);
    }
}

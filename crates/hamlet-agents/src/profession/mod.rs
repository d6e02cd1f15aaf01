//! Profession behavior strategies.
//!
//! Each [`Profession`] maps to one [`ProfessionBehavior`] implementation
//! that knows how to find work, perform one unit of it, and tell when it is
//! done. The scheduler never matches on professions itself: it asks the
//! [`ProfessionRegistry`] for the strategy and dispatches through the trait.
//!
//! Strategies hold only their tuning. The world is passed in on every call
//! (`&WorldState` to look, `&mut WorldState` to damage resources), so the
//! same strategy instance serves every NPC of its profession.

mod farmer;
mod gatherer;

use hamlet_types::{ItemId, Npc, Position, Profession, WorkTask};
use hamlet_world::WorldState;

use crate::config::ProfessionsConfig;
use crate::error::AgentError;

pub use farmer::FarmerBehavior;
pub use gatherer::GathererBehavior;

/// Per-call inputs that are not part of the NPC or the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkContext {
    /// Current simulation time in ms.
    pub now: u64,
    /// Base carry weight before equipment bonuses.
    pub base_carry_weight: u32,
}

/// Outcome of one [`ProfessionBehavior::do_work`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkResult {
    /// The work interval has not elapsed yet. Nothing changed.
    Waiting,
    /// One unit of work was applied; the task continues.
    Progressed {
        /// Progress units applied to the task.
        units: u32,
    },
    /// The task finished and its yield was stored in the inventory.
    Completed {
        /// Item produced.
        item: ItemId,
        /// Units produced.
        quantity: u32,
        /// Progress units applied by the final hit.
        units: u32,
    },
    /// The task finished but the yield did not fit into the inventory.
    /// The yield is lost.
    StorageFailed {
        /// Item produced.
        item: ItemId,
        /// Units produced.
        quantity: u32,
        /// Progress units applied by the final hit.
        units: u32,
        /// Why the inventory refused the items.
        reason: AgentError,
    },
    /// The target no longer exists or is already being destroyed.
    TargetVanished,
    /// The target is no longer next to the NPC.
    NotAdjacent,
}

impl WorkResult {
    /// Progress units applied by this call.
    pub const fn units(&self) -> u32 {
        match self {
            Self::Progressed { units }
            | Self::Completed { units, .. }
            | Self::StorageFailed { units, .. } => *units,
            Self::Waiting | Self::TargetVanished | Self::NotAdjacent => 0,
        }
    }

    /// Whether the task is over (successfully or not).
    pub const fn ends_task(&self) -> bool {
        !matches!(self, Self::Waiting | Self::Progressed { .. })
    }
}

/// Strategy for one profession.
pub trait ProfessionBehavior: std::fmt::Debug + Send + Sync {
    /// The profession this strategy implements.
    fn profession(&self) -> Profession;

    /// Minimum time between two units of work.
    fn work_interval_ms(&self) -> u64;

    /// Minimum time between two player-issued work commands.
    fn manual_cooldown_ms(&self) -> u64;

    /// Find the next task for `npc`, or `None` if there is nothing to do.
    ///
    /// Tasks whose target is already adjacent carry
    /// [`TaskPriority::Immediate`](hamlet_types::TaskPriority::Immediate);
    /// tasks the NPC must walk to first carry
    /// [`TaskPriority::Approach`](hamlet_types::TaskPriority::Approach).
    fn find_work(&self, npc: &Npc, world: &WorldState) -> Option<WorkTask>;

    /// Perform at most one unit of work on `task`.
    ///
    /// `task` has been taken out of `npc.current_task` by the caller, which
    /// puts it back unless the result [ends the task](WorkResult::ends_task).
    fn do_work(
        &self,
        npc: &mut Npc,
        task: &mut WorkTask,
        world: &mut WorldState,
        ctx: WorkContext,
    ) -> WorkResult;

    /// Whether `task` needs no further work.
    fn is_work_done(&self, npc: &Npc, task: &WorkTask, world: &WorldState) -> bool;

    /// Where the NPC unloads and rests: its house door, if it has a house.
    fn home_position(&self, npc: &Npc, world: &WorldState) -> Option<Position> {
        npc.house_id
            .and_then(|id| world.houses.get(id))
            .map(|house| house.position)
    }
}

/// Whether the work interval has elapsed since the NPC's last action.
pub(crate) const fn interval_elapsed(npc: &Npc, now: u64, interval_ms: u64) -> bool {
    now >= npc.last_action_time.saturating_add(interval_ms)
}

/// Strategy for NPCs without a profession. Never finds work.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnemployedBehavior;

impl ProfessionBehavior for UnemployedBehavior {
    fn profession(&self) -> Profession {
        Profession::None
    }

    fn work_interval_ms(&self) -> u64 {
        0
    }

    fn manual_cooldown_ms(&self) -> u64 {
        0
    }

    fn find_work(&self, _npc: &Npc, _world: &WorldState) -> Option<WorkTask> {
        None
    }

    fn do_work(
        &self,
        _npc: &mut Npc,
        _task: &mut WorkTask,
        _world: &mut WorldState,
        _ctx: WorkContext,
    ) -> WorkResult {
        WorkResult::TargetVanished
    }

    fn is_work_done(&self, _npc: &Npc, _task: &WorkTask, _world: &WorldState) -> bool {
        true
    }
}

/// One strategy per profession, built once from configuration.
#[derive(Debug, Clone)]
pub struct ProfessionRegistry {
    lumberjack: GathererBehavior,
    miner: GathererBehavior,
    hunter: GathererBehavior,
    farmer: FarmerBehavior,
    unemployed: UnemployedBehavior,
}

impl ProfessionRegistry {
    /// Build every strategy from its configuration section.
    pub const fn from_config(config: &ProfessionsConfig) -> Self {
        Self {
            lumberjack: GathererBehavior::lumberjack(config.lumberjack),
            miner: GathererBehavior::miner(config.miner),
            hunter: GathererBehavior::hunter(config.hunter),
            farmer: FarmerBehavior::new(config.farmer),
            unemployed: UnemployedBehavior,
        }
    }

    /// The strategy for `profession`.
    pub const fn behavior(&self, profession: Profession) -> &dyn ProfessionBehavior {
        match profession {
            Profession::None => &self.unemployed,
            Profession::Lumberjack => &self.lumberjack,
            Profession::Miner => &self.miner,
            Profession::Hunter => &self.hunter,
            Profession::Farmer => &self.farmer,
        }
    }
}

impl Default for ProfessionRegistry {
    fn default() -> Self {
        Self::from_config(&ProfessionsConfig::default())
    }
}

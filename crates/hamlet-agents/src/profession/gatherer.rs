//! Gathering professions: lumberjack, miner, hunter.
//!
//! A gatherer targets the nearest available resource of its kind, hits it
//! once per work interval while standing next to it, and collects a fixed
//! yield when the hit destroys it.

use hamlet_types::{
    AnimationKind, ItemId, Npc, NpcAnimation, Profession, ResourceKind, TaskPriority, TaskType,
    WorkTask,
};
use hamlet_world::{WorldState, manhattan_distance, step_candidates};
use tracing::debug;

use super::{ProfessionBehavior, WorkContext, WorkResult, interval_elapsed};
use crate::config::GathererConfig;
use crate::inventory;

/// Strategy shared by every profession that harvests a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GathererBehavior {
    profession: Profession,
    target_kind: ResourceKind,
    task_type: TaskType,
    yield_item: ItemId,
    config: GathererConfig,
}

impl GathererBehavior {
    /// Chops trees for wood.
    pub const fn lumberjack(config: GathererConfig) -> Self {
        Self {
            profession: Profession::Lumberjack,
            target_kind: ResourceKind::Tree,
            task_type: TaskType::ChopTree,
            yield_item: ItemId::Wood,
            config,
        }
    }

    /// Mines stones.
    pub const fn miner(config: GathererConfig) -> Self {
        Self {
            profession: Profession::Miner,
            target_kind: ResourceKind::Stone,
            task_type: TaskType::MineStone,
            yield_item: ItemId::Stone,
            config,
        }
    }

    /// Hunts animals for meat.
    pub const fn hunter(config: GathererConfig) -> Self {
        Self {
            profession: Profession::Hunter,
            target_kind: ResourceKind::Animal,
            task_type: TaskType::Hunt,
            yield_item: ItemId::Meat,
            config,
        }
    }

    /// The registry this strategy harvests.
    pub const fn target_kind(&self) -> ResourceKind {
        self.target_kind
    }

    /// The item produced per destroyed target.
    pub const fn yield_item(&self) -> ItemId {
        self.yield_item
    }
}

impl ProfessionBehavior for GathererBehavior {
    fn profession(&self) -> Profession {
        self.profession
    }

    fn work_interval_ms(&self) -> u64 {
        self.config.work_interval_ms
    }

    fn manual_cooldown_ms(&self) -> u64 {
        self.config.manual_cooldown_ms
    }

    fn find_work(&self, npc: &Npc, world: &WorldState) -> Option<WorkTask> {
        let target = world.registry(self.target_kind).find_nearest(
            npc.position,
            self.config.work_range,
            |_| true,
        )?;
        let priority = if manhattan_distance(npc.position, target.position) <= 1 {
            TaskPriority::Immediate
        } else {
            TaskPriority::Approach
        };
        Some(WorkTask {
            task_type: self.task_type,
            target_id: Some(target.id),
            target_position: target.position,
            progress: 0,
            max_progress: target.health,
            priority,
        })
    }

    fn do_work(
        &self,
        npc: &mut Npc,
        task: &mut WorkTask,
        world: &mut WorldState,
        ctx: WorkContext,
    ) -> WorkResult {
        let Some(target_id) = task.target_id else {
            return WorkResult::TargetVanished;
        };
        let registry = world.registry_mut(self.target_kind);
        let Some(target) = registry.get(target_id).filter(|r| r.is_available()) else {
            return WorkResult::TargetVanished;
        };
        let target_position = target.position;
        if manhattan_distance(npc.position, target_position) > 1 {
            return WorkResult::NotAdjacent;
        }
        if !interval_elapsed(npc, ctx.now, self.config.work_interval_ms) {
            return WorkResult::Waiting;
        }

        let Ok(destroyed) = registry.damage(target_id, 1, ctx.now) else {
            return WorkResult::TargetVanished;
        };
        npc.last_action_time = ctx.now;
        if let Some(facing) = step_candidates(npc.position, target_position).first() {
            npc.facing = *facing;
        }
        npc.animation = Some(NpcAnimation {
            kind: AnimationKind::from(self.task_type),
            started_at: ctx.now,
        });
        task.target_position = target_position;
        let units = task.advance(1);

        if !destroyed {
            return WorkResult::Progressed { units };
        }
        // Destruction ends the task even when other NPCs did part of the work.
        task.progress = task.max_progress;

        let quantity = self.config.yield_quantity;
        match inventory::add_item(npc, self.yield_item, quantity, ctx.base_carry_weight) {
            Ok(()) => {
                debug!(npc = %npc.id, %target_id, item = ?self.yield_item, quantity, "Harvested");
                WorkResult::Completed {
                    item: self.yield_item,
                    quantity,
                    units,
                }
            }
            Err(reason) => WorkResult::StorageFailed {
                item: self.yield_item,
                quantity,
                units,
                reason,
            },
        }
    }

    fn is_work_done(&self, _npc: &Npc, task: &WorkTask, world: &WorldState) -> bool {
        task.is_complete()
            || task
                .target_id
                .and_then(|id| world.registry(self.target_kind).get(id))
                .is_none_or(|target| !target.is_available())
    }
}

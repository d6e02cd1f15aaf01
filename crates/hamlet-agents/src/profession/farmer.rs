//! Farming: food production in place on a fixed interval.

use hamlet_types::{
    AnimationKind, ItemId, Npc, NpcAnimation, Profession, TaskPriority, TaskType, WorkTask,
};
use hamlet_world::WorldState;

use super::{ProfessionBehavior, WorkContext, WorkResult, interval_elapsed};
use crate::config::FarmerConfig;
use crate::inventory;

/// Farmers always have work: one harvest per interval wherever they stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmerBehavior {
    config: FarmerConfig,
}

impl FarmerBehavior {
    /// Create a farmer strategy.
    pub const fn new(config: FarmerConfig) -> Self {
        Self { config }
    }
}

impl ProfessionBehavior for FarmerBehavior {
    fn profession(&self) -> Profession {
        Profession::Farmer
    }

    fn work_interval_ms(&self) -> u64 {
        self.config.work_interval_ms
    }

    fn manual_cooldown_ms(&self) -> u64 {
        self.config.manual_cooldown_ms
    }

    fn find_work(&self, npc: &Npc, _world: &WorldState) -> Option<WorkTask> {
        Some(WorkTask {
            task_type: TaskType::Farm,
            target_id: None,
            target_position: npc.position,
            progress: 0,
            max_progress: 1,
            priority: TaskPriority::Immediate,
        })
    }

    fn do_work(
        &self,
        npc: &mut Npc,
        task: &mut WorkTask,
        _world: &mut WorldState,
        ctx: WorkContext,
    ) -> WorkResult {
        if !interval_elapsed(npc, ctx.now, self.config.work_interval_ms) {
            return WorkResult::Waiting;
        }
        npc.last_action_time = ctx.now;
        npc.animation = Some(NpcAnimation {
            kind: AnimationKind::Farm,
            started_at: ctx.now,
        });
        let units = task.advance(1);

        let quantity = self.config.yield_quantity;
        match inventory::add_item(npc, ItemId::Food, quantity, ctx.base_carry_weight) {
            Ok(()) => WorkResult::Completed {
                item: ItemId::Food,
                quantity,
                units,
            },
            Err(reason) => WorkResult::StorageFailed {
                item: ItemId::Food,
                quantity,
                units,
                reason,
            },
        }
    }

    fn is_work_done(&self, _npc: &Npc, task: &WorkTask, _world: &WorldState) -> bool {
        task.is_complete()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use hamlet_types::{ControlMode, Direction, NpcId, NpcState, NpcStats, Position, WorkHours};
    use hamlet_world::GridBounds;

    use super::*;

    fn farmer_npc() -> Npc {
        Npc {
            id: NpcId::new(),
            name: String::from("Wren"),
            position: Position::new(2, 2),
            control_mode: ControlMode::Autonomous,
            profession: Profession::Farmer,
            state: NpcState::Idle,
            current_task: None,
            moving_until: None,
            last_action_time: 0,
            house_id: None,
            inventory: BTreeMap::new(),
            equipped: BTreeSet::new(),
            work_hours: WorkHours::default(),
            facing: Direction::South,
            animation: None,
            stats: NpcStats::default(),
        }
    }

    #[test]
    fn farm_task_is_in_place() {
        let world = WorldState::new(GridBounds::new(8), 1_000);
        let npc = farmer_npc();
        let task = FarmerBehavior::new(FarmerConfig::default())
            .find_work(&npc, &world)
            .unwrap();
        assert_eq!(task.target_position, npc.position);
        assert_eq!(task.target_id, None);
        assert_eq!(task.priority, TaskPriority::Immediate);
    }

    #[test]
    fn harvest_after_interval() {
        let mut world = WorldState::new(GridBounds::new(8), 1_000);
        let behavior = FarmerBehavior::new(FarmerConfig::default());
        let mut npc = farmer_npc();
        let mut task = behavior.find_work(&npc, &world).unwrap();
        let ctx = |now| WorkContext {
            now,
            base_carry_weight: 30,
        };

        assert_eq!(behavior.do_work(&mut npc, &mut task, &mut world, ctx(2_999)), WorkResult::Waiting);
        let result = behavior.do_work(&mut npc, &mut task, &mut world, ctx(3_000));
        assert!(matches!(result, WorkResult::Completed { item: ItemId::Food, quantity: 1, .. }));
        assert!(behavior.is_work_done(&npc, &task, &world));
        assert_eq!(npc.inventory.get(&ItemId::Food), Some(&1));
    }

    #[test]
    fn full_food_stack_fails_storage() {
        let mut world = WorldState::new(GridBounds::new(8), 1_000);
        let behavior = FarmerBehavior::new(FarmerConfig::default());
        let mut npc = farmer_npc();
        npc.inventory.insert(ItemId::Food, 30);
        let mut task = behavior.find_work(&npc, &world).unwrap();
        let result = behavior.do_work(
            &mut npc,
            &mut task,
            &mut world,
            WorkContext {
                now: 3_000,
                base_carry_weight: 30,
            },
        );
        assert!(matches!(result, WorkResult::StorageFailed { .. }));
        assert_eq!(npc.inventory.get(&ItemId::Food), Some(&30));
    }
}

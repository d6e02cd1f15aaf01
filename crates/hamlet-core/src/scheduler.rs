//! The per-NPC behavior state machine.
//!
//! Each tick the [`Scheduler`] updates every NPC once, in ascending id
//! order. An NPC is in exactly one [`NpcState`]:
//!
//! - `Idle` -- autonomous NPCs ask their profession strategy for work. An
//!   adjacent target starts `Working`; a distant one makes the NPC step one
//!   tile towards it (`Moving`).
//! - `Moving` -- a tile step is in flight; back to `Idle` once the step
//!   window elapses.
//! - `Working` -- one unit of work per work interval through the strategy.
//!   A stored yield ends in `Idle` (or `ReturningHome` near capacity); a
//!   failed store ends in `ReturningHome`; a vanished target ends in `Idle`.
//! - `ReturningHome` -- step towards the house; on arrival unload every raw
//!   resource, then `Idle`.
//!
//! Autonomous NPCs outside their work hours drop their task and go home.
//! Controlled NPCs never pick work or step on their own, but their active
//! tasks still progress and they unload when they reach their house.

use hamlet_agents::{
    CooldownTracker, NpcConfig, ProfessionBehavior, ProfessionRegistry, ProfessionsConfig,
    WorkContext, WorkResult, inventory,
};
use hamlet_types::{
    AnimationKind, ControlMode, Direction, Npc, NpcAnimation, NpcState, Position, TaskPriority,
    WorkTask,
};
use hamlet_world::{WorldState, step_candidates};
use tracing::{debug, warn};

use crate::event::{AbandonReason, TickEvent};
use crate::schedule::is_within_work_hours;

/// Time inputs for one NPC update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Simulation time after this tick's clock advance.
    pub now: u64,
    /// Simulated milliseconds covered by this tick.
    pub delta_ms: u64,
    /// In-game hour at `now`.
    pub hour: u8,
}

/// Drives NPC state transitions.
#[derive(Debug, Clone)]
pub struct Scheduler {
    professions: ProfessionRegistry,
    npc_config: NpcConfig,
    cooldowns: CooldownTracker,
}

impl Scheduler {
    /// Build a scheduler with one strategy per profession.
    pub const fn new(npc_config: NpcConfig, professions: &ProfessionsConfig) -> Self {
        Self {
            professions: ProfessionRegistry::from_config(professions),
            npc_config,
            cooldowns: CooldownTracker::new(),
        }
    }

    /// The strategy registry.
    pub const fn professions(&self) -> &ProfessionRegistry {
        &self.professions
    }

    /// Movement and carry parameters.
    pub const fn npc_config(&self) -> &NpcConfig {
        &self.npc_config
    }

    /// Manual-command cooldowns.
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Mutable manual-command cooldowns.
    pub const fn cooldowns_mut(&mut self) -> &mut CooldownTracker {
        &mut self.cooldowns
    }

    /// The strategy for an NPC's current profession.
    fn behavior(&self, npc: &Npc) -> &dyn ProfessionBehavior {
        self.professions.behavior(npc.profession)
    }

    /// Time to walk one tile for `npc` right now.
    pub fn step_duration_ms(&self, npc: &Npc) -> u64 {
        inventory::movement_duration_ms(
            npc,
            self.npc_config.base_carry_weight,
            self.npc_config.move_duration_ms,
            self.npc_config.overweight_move_pct,
        )
    }

    /// Update one NPC by one tick.
    pub fn update(
        &self,
        npc: &mut Npc,
        world: &mut WorldState,
        ctx: TickContext,
        events: &mut Vec<TickEvent>,
    ) {
        let arrived = finish_step(npc, ctx.now);
        if npc.is_moving(ctx.now) {
            return;
        }
        if npc.state == NpcState::Working && npc.current_task.is_some() {
            npc.stats.time_worked_ms = npc.stats.time_worked_ms.saturating_add(ctx.delta_ms);
        }

        match npc.control_mode {
            ControlMode::Autonomous => self.update_autonomous(npc, world, ctx, events),
            ControlMode::Controlled => self.update_controlled(npc, world, ctx, arrived, events),
        }
    }

    fn update_autonomous(
        &self,
        npc: &mut Npc,
        world: &mut WorldState,
        ctx: TickContext,
        events: &mut Vec<TickEvent>,
    ) {
        if !is_within_work_hours(npc.work_hours, ctx.hour) {
            self.go_off_shift(npc, world, events);
        }

        match npc.state {
            NpcState::Idle | NpcState::Moving => {
                npc.state = NpcState::Idle;
                if is_within_work_hours(npc.work_hours, ctx.hour) {
                    self.seek_work(npc, world, ctx.now, events);
                }
            }
            NpcState::Working => self.work(npc, world, ctx.now, events),
            NpcState::ReturningHome => self.return_home(npc, world, ctx.now, events),
        }
    }

    fn update_controlled(
        &self,
        npc: &mut Npc,
        world: &mut WorldState,
        ctx: TickContext,
        arrived: bool,
        events: &mut Vec<TickEvent>,
    ) {
        match npc.state {
            NpcState::Working => self.work(npc, world, ctx.now, events),
            NpcState::Idle | NpcState::Moving | NpcState::ReturningHome => {
                let unloading = arrived || npc.state == NpcState::ReturningHome;
                let at_home = self
                    .behavior(npc)
                    .home_position(npc, world)
                    .is_some_and(|home| home == npc.position);
                if unloading && at_home {
                    deposit(npc, world, events);
                    set_idle(npc);
                } else if npc.state == NpcState::Moving {
                    set_idle(npc);
                }
            }
        }
    }

    /// Outside work hours: drop the task and head home.
    fn go_off_shift(&self, npc: &mut Npc, world: &WorldState, events: &mut Vec<TickEvent>) {
        if npc.state == NpcState::ReturningHome {
            return;
        }
        if npc.current_task.take().is_some() {
            debug!(npc = %npc.id, "Work hours over, dropping task");
            events.push(TickEvent::TaskAbandoned {
                npc: npc.id,
                reason: AbandonReason::OffShift,
            });
        }
        let home = self.behavior(npc).home_position(npc, world);
        match home {
            Some(home) if home != npc.position => {
                npc.state = NpcState::ReturningHome;
                npc.animation = None;
            }
            _ => set_idle(npc),
        }
    }

    /// `Idle`: look for work and either start it or walk towards it.
    fn seek_work(&self, npc: &mut Npc, world: &WorldState, now: u64, events: &mut Vec<TickEvent>) {
        let Some(task) = self.behavior(npc).find_work(npc, world) else {
            return;
        };
        match task.priority {
            TaskPriority::Immediate => assign_task(npc, task, now, events),
            TaskPriority::Approach => {
                if !self.step_toward(npc, world, task.target_position, now, NpcState::Moving, events)
                {
                    debug!(npc = %npc.id, target = %task.target_position, "No free step towards work");
                }
            }
        }
    }

    /// `Working`: apply at most one unit of work.
    fn work(&self, npc: &mut Npc, world: &mut WorldState, now: u64, events: &mut Vec<TickEvent>) {
        let Some(mut task) = npc.current_task.take() else {
            set_idle(npc);
            return;
        };
        let behavior = self.behavior(npc);
        let ctx = WorkContext {
            now,
            base_carry_weight: self.npc_config.base_carry_weight,
        };
        let result = behavior.do_work(npc, &mut task, world, ctx);
        npc.stats.work_completed = npc
            .stats
            .work_completed
            .saturating_add(u64::from(result.units()));

        match result {
            WorkResult::Waiting | WorkResult::Progressed { .. } => {
                if behavior.is_work_done(npc, &task, world) {
                    abandon(npc, AbandonReason::TargetVanished, events);
                    return;
                }
                if matches!(result, WorkResult::Progressed { .. }) {
                    events.push(TickEvent::WorkProgressed {
                        npc: npc.id,
                        progress: task.progress,
                        max_progress: task.max_progress,
                    });
                }
                npc.current_task = Some(task);
            }
            WorkResult::Completed { item, quantity, .. } => {
                events.push(TickEvent::Harvested {
                    npc: npc.id,
                    item,
                    quantity,
                });
                if inventory::is_near_capacity(
                    npc,
                    self.npc_config.base_carry_weight,
                    self.npc_config.near_capacity_pct,
                ) {
                    self.begin_return_home(npc, world, events);
                } else {
                    set_idle(npc);
                }
            }
            WorkResult::StorageFailed {
                item,
                quantity,
                reason,
                ..
            } => {
                debug!(npc = %npc.id, ?item, quantity, %reason, "Yield did not fit");
                events.push(TickEvent::StorageFailed {
                    npc: npc.id,
                    item,
                    quantity,
                    reason: reason.to_string(),
                });
                self.begin_return_home(npc, world, events);
            }
            WorkResult::TargetVanished => abandon(npc, AbandonReason::TargetVanished, events),
            WorkResult::NotAdjacent => abandon(npc, AbandonReason::NotAdjacent, events),
        }
    }

    /// Switch to `ReturningHome`, or `Idle` when there is no house.
    fn begin_return_home(&self, npc: &mut Npc, world: &WorldState, events: &mut Vec<TickEvent>) {
        npc.current_task = None;
        npc.animation = None;
        if self.behavior(npc).home_position(npc, world).is_some() {
            npc.state = NpcState::ReturningHome;
        } else {
            debug!(npc = %npc.id, "No house to return to");
            events.push(TickEvent::NoHomeAssigned { npc: npc.id });
            npc.state = NpcState::Idle;
        }
    }

    /// `ReturningHome`: step home, unload on arrival.
    fn return_home(
        &self,
        npc: &mut Npc,
        world: &mut WorldState,
        now: u64,
        events: &mut Vec<TickEvent>,
    ) {
        let Some(home) = self.behavior(npc).home_position(npc, world) else {
            events.push(TickEvent::NoHomeAssigned { npc: npc.id });
            set_idle(npc);
            return;
        };
        if npc.position == home {
            deposit(npc, world, events);
            set_idle(npc);
            return;
        }
        if !self.step_toward(npc, world, home, now, NpcState::ReturningHome, events) {
            debug!(npc = %npc.id, %home, "Path home blocked, retrying next tick");
        }
    }

    /// Step one tile towards `target`, primary axis first. Returns whether a
    /// step was taken.
    fn step_toward(
        &self,
        npc: &mut Npc,
        world: &WorldState,
        target: Position,
        now: u64,
        state: NpcState,
        events: &mut Vec<TickEvent>,
    ) -> bool {
        let from = npc.position;
        let step = step_candidates(from, target).into_iter().find_map(|dir| {
            from.offset(dir)
                .filter(|next| !world.is_blocked(*next))
                .map(|next| (dir, next))
        });
        let Some((direction, to)) = step else {
            return false;
        };
        let duration = self.step_duration_ms(npc);
        apply_step(npc, direction, to, now, duration);
        npc.state = state;
        events.push(TickEvent::Stepped {
            npc: npc.id,
            from,
            to,
        });
        true
    }
}

/// Close an elapsed step window. Returns whether one just closed.
fn finish_step(npc: &mut Npc, now: u64) -> bool {
    match npc.moving_until {
        Some(until) if now >= until => {
            npc.moving_until = None;
            if npc.animation.is_some_and(|a| a.kind == AnimationKind::Walk) {
                npc.animation = None;
            }
            true
        }
        _ => false,
    }
}

/// Move `npc` onto `to` and open its step window.
pub(crate) fn apply_step(
    npc: &mut Npc,
    direction: Direction,
    to: Position,
    now: u64,
    duration_ms: u64,
) {
    npc.position = to;
    npc.facing = direction;
    npc.moving_until = Some(now.saturating_add(duration_ms));
    npc.animation = Some(NpcAnimation {
        kind: AnimationKind::Walk,
        started_at: now,
    });
    npc.stats.distance_traveled = npc.stats.distance_traveled.saturating_add(1);
}

/// Start working on `task`. The first unit lands one work interval later.
pub(crate) fn assign_task(npc: &mut Npc, task: WorkTask, now: u64, events: &mut Vec<TickEvent>) {
    debug!(npc = %npc.id, task = ?task.task_type, target = ?task.target_id, "Task assigned");
    events.push(TickEvent::TaskAssigned {
        npc: npc.id,
        task_type: task.task_type,
        target: task.target_id,
    });
    npc.animation = Some(NpcAnimation {
        kind: AnimationKind::from(task.task_type),
        started_at: now,
    });
    npc.current_task = Some(task);
    npc.state = NpcState::Working;
    npc.last_action_time = now;
    npc.stats.tasks_assigned = npc.stats.tasks_assigned.saturating_add(1);
}

/// Drop the task and go idle.
pub(crate) fn abandon(npc: &mut Npc, reason: AbandonReason, events: &mut Vec<TickEvent>) {
    debug!(npc = %npc.id, ?reason, "Task abandoned");
    events.push(TickEvent::TaskAbandoned {
        npc: npc.id,
        reason,
    });
    set_idle(npc);
}

/// `Idle` with no task and no animation.
pub(crate) fn set_idle(npc: &mut Npc) {
    npc.current_task = None;
    npc.animation = None;
    npc.state = NpcState::Idle;
}

/// Unload every raw resource into the NPC's house, all or nothing.
fn deposit(npc: &mut Npc, world: &mut WorldState, events: &mut Vec<TickEvent>) {
    let Some(house) = npc.house_id else {
        return;
    };
    let load = inventory::raw_resources(npc);
    if load.is_empty() {
        return;
    }
    match world.houses.deposit(house, &load) {
        Ok(units) => {
            inventory::clear_raw_resources(npc);
            debug!(npc = %npc.id, %house, units, "Unloaded at home");
            events.push(TickEvent::Deposited {
                npc: npc.id,
                house,
                units,
            });
        }
        Err(err) => {
            warn!(npc = %npc.id, %house, error = %err, "House refused deposit");
            events.push(TickEvent::DepositRejected {
                npc: npc.id,
                house,
                reason: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_agents::{NpcManager, SpawnParams};
    use hamlet_types::{HouseType, ItemId, NpcId, Profession, Species, WorkHours};
    use hamlet_world::GridBounds;

    use super::*;

    struct Fixture {
        scheduler: Scheduler,
        world: WorldState,
        npcs: NpcManager,
        now: u64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scheduler: Scheduler::new(NpcConfig::default(), &ProfessionsConfig::default()),
                world: WorldState::new(GridBounds::new(32), 1_000),
                npcs: NpcManager::new(),
                now: 0,
            }
        }

        fn spawn(&mut self, name: &str, at: Position, profession: Profession) -> NpcId {
            self.npcs
                .spawn(SpawnParams::new(name, at, profession), &NpcConfig::default())
                .unwrap()
        }

        fn tick(&mut self, delta_ms: u64, hour: u8) -> Vec<TickEvent> {
            self.now = self.now.saturating_add(delta_ms);
            let ctx = TickContext {
                now: self.now,
                delta_ms,
                hour,
            };
            let mut events = Vec::new();
            for id in self.npcs.ids() {
                let npc = self.npcs.get_mut(id).unwrap();
                self.scheduler.update(npc, &mut self.world, ctx, &mut events);
                assert!(npc.task_state_consistent());
            }
            events
        }

        fn npc(&self, id: NpcId) -> &Npc {
            self.npcs.get(id).unwrap()
        }
    }

    #[test]
    fn adjacent_tree_is_worked_immediately() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(1, 0), Species::Oak).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);

        let events = f.tick(100, 10);
        assert_eq!(f.npc(id).state, NpcState::Working);
        assert_eq!(f.npc(id).last_action_time, 100);
        assert_eq!(f.npc(id).stats.tasks_assigned, 1);
        assert!(matches!(events.first(), Some(TickEvent::TaskAssigned { .. })));
    }

    #[test]
    fn distant_tree_is_approached_one_step_at_a_time() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(4, 0), Species::Oak).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);

        f.tick(100, 10);
        assert_eq!(f.npc(id).state, NpcState::Moving);
        assert_eq!(f.npc(id).position, Position::new(1, 0));
        assert_eq!(f.npc(id).moving_until, Some(500));

        // Still in the step window.
        f.tick(100, 10);
        assert_eq!(f.npc(id).position, Position::new(1, 0));

        f.tick(300, 10);
        assert_eq!(f.npc(id).position, Position::new(2, 0));
        f.tick(400, 10);
        assert_eq!(f.npc(id).position, Position::new(3, 0));
        assert_eq!(f.npc(id).stats.distance_traveled, 3);

        f.tick(400, 10);
        assert_eq!(f.npc(id).state, NpcState::Working);
    }

    #[test]
    fn blocked_primary_axis_uses_secondary() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(5, 1), Species::Granite).unwrap();
        f.world.place_resource(Position::new(1, 0), Species::Limestone).unwrap();
        let id = f.spawn("Bo", Position::new(0, 0), Profession::Lumberjack);
        f.world.place_resource(Position::new(4, 1), Species::Pine).unwrap();

        f.tick(100, 10);
        assert_eq!(f.npc(id).position, Position::new(0, 1));
    }

    #[test]
    fn fully_blocked_npc_stays_idle() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(3, 0), Species::Oak).unwrap();
        f.world.place_resource(Position::new(1, 0), Species::Boulder).unwrap();
        let id = f.spawn("Cy", Position::new(0, 0), Profession::Lumberjack);
        f.tick(100, 10);
        assert_eq!(f.npc(id).state, NpcState::Idle);
        assert_eq!(f.npc(id).position, Position::new(0, 0));
    }

    #[test]
    fn near_capacity_after_yield_returns_home() {
        let mut f = Fixture::new();
        let bounds = *f.world.bounds();
        let house = f
            .world
            .houses
            .add_house(HouseType::Cottage, Position::new(0, 3), &bounds)
            .unwrap();
        f.world.place_resource(Position::new(1, 0), Species::Birch).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);
        {
            let npc = f.npcs.get_mut(id).unwrap();
            npc.house_id = Some(house);
            npc.inventory.insert(ItemId::Wood, 10);
        }

        f.tick(100, 10);
        f.tick(1_000, 10);
        f.tick(1_000, 10);
        // 12 wood weighs 24 of 30: at the 80 % threshold.
        assert_eq!(f.npc(id).state, NpcState::ReturningHome);
        assert!(f.npc(id).current_task.is_none());

        for _ in 0..4 {
            f.tick(400, 10);
        }
        assert_eq!(f.npc(id).position, Position::new(0, 3));
        f.tick(400, 10);
        assert_eq!(f.npc(id).state, NpcState::Idle);
        assert!(f.npc(id).inventory.is_empty());
        assert_eq!(
            f.world.houses.get(house).unwrap().inventory.get(&ItemId::Wood),
            Some(&12)
        );
    }

    #[test]
    fn storage_failure_without_house_goes_idle() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(0, 1), Species::Rabbit).unwrap();
        let id = f.spawn("Hal", Position::new(0, 0), Profession::Hunter);
        f.npcs.get_mut(id).unwrap().inventory.insert(ItemId::Stone, 10);

        f.tick(100, 10);
        let events = f.tick(1_200, 10);
        assert!(events.iter().any(|e| matches!(e, TickEvent::StorageFailed { .. })));
        assert!(events.iter().any(|e| matches!(e, TickEvent::NoHomeAssigned { .. })));
        assert_eq!(f.npc(id).state, NpcState::Idle);
    }

    #[test]
    fn off_shift_npc_abandons_task_and_heads_home() {
        let mut f = Fixture::new();
        let bounds = *f.world.bounds();
        let house = f
            .world
            .houses
            .add_house(HouseType::Cabin, Position::new(-5, 0), &bounds)
            .unwrap();
        f.world.place_resource(Position::new(1, 0), Species::Oak).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);
        {
            let npc = f.npcs.get_mut(id).unwrap();
            npc.house_id = Some(house);
            npc.work_hours = WorkHours {
                start_hour: 8,
                end_hour: 18,
            };
        }
        f.tick(100, 10);
        assert_eq!(f.npc(id).state, NpcState::Working);

        let events = f.tick(100, 20);
        assert!(events.iter().any(|e| matches!(
            e,
            TickEvent::TaskAbandoned {
                reason: AbandonReason::OffShift,
                ..
            }
        )));
        assert_eq!(f.npc(id).state, NpcState::ReturningHome);
        assert!(f.npc(id).current_task.is_none());
        assert_eq!(f.npc(id).position, Position::new(-1, 0));
    }

    #[test]
    fn overweight_npc_steps_at_half_speed() {
        let mut f = Fixture::new();
        let mut walkers = Vec::new();
        for (name, z, stone) in [("Light", 0, 0), ("Heavy", 4, 11)] {
            let bounds = *f.world.bounds();
            let house = f
                .world
                .houses
                .add_house(HouseType::Cabin, Position::new(-5, z), &bounds)
                .unwrap();
            let id = f.spawn(name, Position::new(0, z), Profession::None);
            let npc = f.npcs.get_mut(id).unwrap();
            npc.house_id = Some(house);
            if stone > 0 {
                // 33 against a capacity of 30.
                npc.inventory.insert(ItemId::Stone, stone);
            }
            walkers.push(id);
        }

        f.tick(100, 22);
        let &[light, heavy] = walkers.as_slice() else {
            panic!("expected two walkers");
        };
        assert_eq!(f.npc(light).state, NpcState::ReturningHome);
        assert_eq!(f.npc(heavy).state, NpcState::ReturningHome);
        assert_eq!(f.npc(light).moving_until, Some(500));
        assert_eq!(f.npc(heavy).moving_until, Some(900));
        assert_eq!(f.scheduler.step_duration_ms(f.npc(heavy)), 800);
    }

    #[test]
    fn off_shift_npc_at_home_stays_idle() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(1, 0), Species::Oak).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);
        f.tick(100, 3);
        assert_eq!(f.npc(id).state, NpcState::Idle);
    }

    #[test]
    fn controlled_npc_does_not_seek_work() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(1, 0), Species::Oak).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);
        f.npcs.get_mut(id).unwrap().control_mode = ControlMode::Controlled;
        f.tick(100, 10);
        assert_eq!(f.npc(id).state, NpcState::Idle);
    }

    #[test]
    fn vanished_target_returns_worker_to_idle() {
        let mut f = Fixture::new();
        let tree = f.world.place_resource(Position::new(1, 0), Species::Pine).unwrap();
        let id = f.spawn("Ash", Position::new(0, 0), Profession::Lumberjack);
        f.tick(100, 10);
        f.world
            .registry_mut(hamlet_types::ResourceKind::Tree)
            .damage(tree, 10, f.now)
            .unwrap();
        let events = f.tick(100, 10);
        assert!(events.iter().any(|e| matches!(
            e,
            TickEvent::TaskAbandoned {
                reason: AbandonReason::TargetVanished,
                ..
            }
        )));
        assert_eq!(f.npc(id).state, NpcState::Idle);
    }

    #[test]
    fn time_worked_accumulates_while_working() {
        let mut f = Fixture::new();
        f.world.place_resource(Position::new(1, 0), Species::Boulder).unwrap();
        let id = f.spawn("Mo", Position::new(0, 0), Profession::Miner);
        f.tick(100, 10);
        f.tick(250, 10);
        f.tick(250, 10);
        assert_eq!(f.npc(id).stats.time_worked_ms, 500);
    }
}

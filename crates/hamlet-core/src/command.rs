//! Player commands for controlled NPCs.
//!
//! Every command is validated in full before anything is mutated, so a
//! rejected command leaves the simulation exactly as it was. The
//! [`CommandError`] text is the failure reason surfaced to the player.

use hamlet_agents::AgentError;
use hamlet_types::{ControlMode, Direction, NpcId, NpcState, Position, Profession, TaskPriority};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{AbandonReason, TickEvent};
use crate::scheduler::{abandon, apply_step, assign_task, set_idle};
use crate::tick::Simulation;

/// A player-issued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Step one tile.
    Move {
        /// Target NPC.
        npc: NpcId,
        /// Step direction.
        direction: Direction,
    },
    /// Start working on an adjacent target.
    ManualWork {
        /// Target NPC.
        npc: NpcId,
    },
    /// Drop the current task.
    StopWork {
        /// Target NPC.
        npc: NpcId,
    },
    /// Hand the NPC to the player or back to the scheduler.
    SetControlMode {
        /// Target NPC.
        npc: NpcId,
        /// New mode.
        mode: ControlMode,
    },
}

impl Command {
    /// The NPC this command targets.
    pub const fn npc(&self) -> NpcId {
        match *self {
            Self::Move { npc, .. }
            | Self::ManualWork { npc }
            | Self::StopWork { npc }
            | Self::SetControlMode { npc, .. } => npc,
        }
    }
}

/// Why a command was rejected. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No NPC with this id.
    #[error("npc not found: {0}")]
    NpcNotFound(NpcId),

    /// The NPC is driven by the scheduler.
    #[error("npc {0} is not under player control")]
    NotControlled(NpcId),

    /// A tile step is still in flight.
    #[error("npc {npc} is still moving ({remaining_ms}ms left)")]
    AlreadyMoving {
        /// The NPC.
        npc: NpcId,
        /// Milliseconds until the step completes.
        remaining_ms: u64,
    },

    /// The target tile is outside the grid.
    #[error("position {0} is outside the world")]
    InvalidPosition(Position),

    /// The target tile holds a tree, stone, or animal.
    #[error("position {0} is blocked")]
    Blocked(Position),

    /// The manual-work cooldown has not expired.
    #[error("cooldown active: {remaining_ms}ms remaining")]
    CooldownActive {
        /// The NPC.
        npc: NpcId,
        /// Milliseconds until the next command is accepted.
        remaining_ms: u64,
    },

    /// The NPC has no profession to work at.
    #[error("npc {0} has no profession")]
    NoProfession(NpcId),

    /// The NPC already has a task.
    #[error("npc {0} is already working")]
    AlreadyWorking(NpcId),

    /// No target next to the NPC.
    #[error("no work available next to npc {0}")]
    NoWorkAvailable(NpcId),
}

impl Simulation {
    /// Validate and apply a player command.
    ///
    /// Returns the events the command caused.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandError`] found; nothing is mutated.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<TickEvent>, CommandError> {
        let result = match command {
            Command::Move { npc, direction } => self.move_npc(npc, direction),
            Command::ManualWork { npc } => self.request_manual_work(npc),
            Command::StopWork { npc } => self.stop_work(npc),
            Command::SetControlMode { npc, mode } => self.set_control_mode(npc, mode),
        };
        if let Err(err) = &result {
            debug!(?command, error = %err, "Command rejected");
        }
        result
    }

    /// Step a controlled NPC one tile. Any active task is dropped.
    ///
    /// # Errors
    ///
    /// `NpcNotFound`, `NotControlled`, `AlreadyMoving`, `InvalidPosition`,
    /// or `Blocked`.
    pub fn move_npc(
        &mut self,
        npc_id: NpcId,
        direction: Direction,
    ) -> Result<Vec<TickEvent>, CommandError> {
        let now = self.clock.now_ms();
        let npc = self
            .npcs
            .get(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        if npc.control_mode != ControlMode::Controlled {
            return Err(CommandError::NotControlled(npc_id));
        }
        if let Some(until) = npc.moving_until.filter(|until| now < *until) {
            return Err(CommandError::AlreadyMoving {
                npc: npc_id,
                remaining_ms: until.saturating_sub(now),
            });
        }
        let from = npc.position;
        let to = from
            .offset(direction)
            .ok_or(CommandError::InvalidPosition(from))?;
        if !self.world.bounds().is_valid(to) {
            return Err(CommandError::InvalidPosition(to));
        }
        if self.world.is_blocked(to) {
            return Err(CommandError::Blocked(to));
        }
        let duration = self.scheduler.step_duration_ms(npc);

        let mut events = Vec::new();
        let npc = self
            .npcs
            .get_mut(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        if npc.current_task.is_some() {
            abandon(npc, AbandonReason::Interrupted, &mut events);
        }
        apply_step(npc, direction, to, now, duration);
        npc.state = NpcState::Moving;
        events.push(TickEvent::Stepped {
            npc: npc_id,
            from,
            to,
        });
        Ok(events)
    }

    /// Start work on an adjacent target and start the profession cooldown.
    ///
    /// # Errors
    ///
    /// `NpcNotFound`, `NotControlled`, `NoProfession`, `CooldownActive`,
    /// `AlreadyWorking`, `AlreadyMoving`, or `NoWorkAvailable`.
    pub fn request_manual_work(&mut self, npc_id: NpcId) -> Result<Vec<TickEvent>, CommandError> {
        let now = self.clock.now_ms();
        let npc = self
            .npcs
            .get(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        if npc.control_mode != ControlMode::Controlled {
            return Err(CommandError::NotControlled(npc_id));
        }
        if npc.profession == Profession::None {
            return Err(CommandError::NoProfession(npc_id));
        }
        if let Err(AgentError::CooldownActive { remaining_ms, .. }) =
            self.scheduler.cooldowns().check(npc_id, now)
        {
            return Err(CommandError::CooldownActive {
                npc: npc_id,
                remaining_ms,
            });
        }
        if npc.current_task.is_some() {
            return Err(CommandError::AlreadyWorking(npc_id));
        }
        if let Some(until) = npc.moving_until.filter(|until| now < *until) {
            return Err(CommandError::AlreadyMoving {
                npc: npc_id,
                remaining_ms: until.saturating_sub(now),
            });
        }
        let behavior = self.scheduler.professions().behavior(npc.profession);
        let task = behavior
            .find_work(npc, &self.world)
            .filter(|task| task.priority == TaskPriority::Immediate)
            .ok_or(CommandError::NoWorkAvailable(npc_id))?;
        let cooldown_ms = behavior.manual_cooldown_ms();

        let mut events = Vec::new();
        let npc = self
            .npcs
            .get_mut(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        assign_task(npc, task, now, &mut events);
        self.scheduler
            .cooldowns_mut()
            .start(npc_id, now, cooldown_ms);
        Ok(events)
    }

    /// Drop the current task and go idle.
    ///
    /// # Errors
    ///
    /// `NpcNotFound`.
    pub fn stop_work(&mut self, npc_id: NpcId) -> Result<Vec<TickEvent>, CommandError> {
        let npc = self
            .npcs
            .get_mut(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        let mut events = Vec::new();
        if npc.current_task.is_some() {
            abandon(npc, AbandonReason::Interrupted, &mut events);
        } else {
            set_idle(npc);
        }
        Ok(events)
    }

    /// Switch control mode. Task and state are kept.
    ///
    /// # Errors
    ///
    /// `NpcNotFound`.
    pub fn set_control_mode(
        &mut self,
        npc_id: NpcId,
        mode: ControlMode,
    ) -> Result<Vec<TickEvent>, CommandError> {
        let npc = self
            .npcs
            .get_mut(npc_id)
            .ok_or(CommandError::NpcNotFound(npc_id))?;
        npc.control_mode = mode;
        debug!(npc = %npc_id, ?mode, "Control mode changed");
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_agents::SpawnParams;
    use hamlet_types::Species;

    use super::*;
    use crate::config::SimulationConfig;

    fn sim_with_controlled(profession: Profession) -> (Simulation, NpcId) {
        let mut config = SimulationConfig::default();
        config.resources.animal_wander_chance_pct = 0;
        let mut sim = Simulation::new(config).unwrap();
        let mut params = SpawnParams::new("Pip", Position::new(0, 0), profession);
        params.control_mode = ControlMode::Controlled;
        let id = sim.spawn_npc(params).unwrap();
        (sim, id)
    }

    #[test]
    fn move_requires_control() {
        let (mut sim, id) = sim_with_controlled(Profession::None);
        sim.set_control_mode(id, ControlMode::Autonomous).unwrap();
        assert_eq!(
            sim.dispatch(Command::Move {
                npc: id,
                direction: Direction::East
            }),
            Err(CommandError::NotControlled(id))
        );
    }

    #[test]
    fn move_steps_and_locks() {
        let (mut sim, id) = sim_with_controlled(Profession::None);
        let events = sim
            .dispatch(Command::Move {
                npc: id,
                direction: Direction::North,
            })
            .unwrap();
        assert_eq!(events.len(), 1);
        let npc = sim.npc(id).unwrap();
        assert_eq!(npc.position, Position::new(0, -1));
        assert_eq!(npc.state, NpcState::Moving);
        assert_eq!(npc.facing, Direction::North);

        let again = sim.dispatch(Command::Move {
            npc: id,
            direction: Direction::North,
        });
        assert!(matches!(again, Err(CommandError::AlreadyMoving { remaining_ms: 400, .. })));
        assert_eq!(sim.npc(id).unwrap().position, Position::new(0, -1));
    }

    #[test]
    fn move_rejects_blocked_and_outside_tiles() {
        let (mut sim, id) = sim_with_controlled(Profession::None);
        sim.world_mut().place_resource(Position::new(1, 0), Species::Oak).unwrap();
        assert_eq!(
            sim.move_npc(id, Direction::East),
            Err(CommandError::Blocked(Position::new(1, 0)))
        );

        let edge = sim.config().world.half_extent;
        let mut params = SpawnParams::new("Edge", Position::new(edge, 0), Profession::None);
        params.control_mode = ControlMode::Controlled;
        let edge_id = sim.spawn_npc(params).unwrap();
        assert_eq!(
            sim.move_npc(edge_id, Direction::East),
            Err(CommandError::InvalidPosition(Position::new(edge.saturating_add(1), 0)))
        );
        assert_eq!(sim.npc(edge_id).unwrap().stats.distance_traveled, 0);
    }

    #[test]
    fn manual_work_needs_profession_and_target() {
        let (mut sim, id) = sim_with_controlled(Profession::None);
        assert_eq!(sim.request_manual_work(id), Err(CommandError::NoProfession(id)));

        let (mut sim, id) = sim_with_controlled(Profession::Lumberjack);
        assert_eq!(sim.request_manual_work(id), Err(CommandError::NoWorkAvailable(id)));
        sim.world_mut().place_resource(Position::new(3, 0), Species::Oak).unwrap();
        assert_eq!(sim.request_manual_work(id), Err(CommandError::NoWorkAvailable(id)));
        assert!(sim.scheduler().cooldowns().is_empty());
    }

    #[test]
    fn manual_work_assigns_and_starts_cooldown() {
        let (mut sim, id) = sim_with_controlled(Profession::Lumberjack);
        sim.world_mut().place_resource(Position::new(0, 1), Species::Oak).unwrap();
        let events = sim.request_manual_work(id).unwrap();
        assert!(matches!(events.first(), Some(TickEvent::TaskAssigned { .. })));
        assert_eq!(sim.npc(id).unwrap().state, NpcState::Working);
        assert_eq!(sim.scheduler().cooldowns().remaining(id, 0), 2_000);
    }

    #[test]
    fn repeated_manual_work_reports_remaining_cooldown() {
        let (mut sim, id) = sim_with_controlled(Profession::Miner);
        sim.world_mut().place_resource(Position::new(1, 0), Species::Boulder).unwrap();
        sim.request_manual_work(id).unwrap();
        sim.stop_work(id).unwrap();

        assert_eq!(
            sim.request_manual_work(id),
            Err(CommandError::CooldownActive {
                npc: id,
                remaining_ms: 2_500,
            })
        );
        assert_eq!(sim.npc(id).unwrap().state, NpcState::Idle);
    }

    #[test]
    fn stop_work_clears_task() {
        let (mut sim, id) = sim_with_controlled(Profession::Farmer);
        sim.request_manual_work(id).unwrap();
        let events = sim.stop_work(id).unwrap();
        assert_eq!(events.len(), 1);
        let npc = sim.npc(id).unwrap();
        assert_eq!(npc.state, NpcState::Idle);
        assert!(npc.current_task.is_none());
        assert!(npc.animation.is_none());
    }

    #[test]
    fn control_mode_switch_keeps_task() {
        let (mut sim, id) = sim_with_controlled(Profession::Farmer);
        sim.request_manual_work(id).unwrap();
        sim.set_control_mode(id, ControlMode::Autonomous).unwrap();
        let npc = sim.npc(id).unwrap();
        assert_eq!(npc.control_mode, ControlMode::Autonomous);
        assert_eq!(npc.state, NpcState::Working);
        assert!(npc.current_task.is_some());
    }

    #[test]
    fn unknown_npc_is_reported() {
        let (mut sim, _) = sim_with_controlled(Profession::None);
        let ghost = NpcId::new();
        assert_eq!(
            sim.dispatch(Command::StopWork { npc: ghost }),
            Err(CommandError::NpcNotFound(ghost))
        );
        assert_eq!(Command::StopWork { npc: ghost }.npc(), ghost);
    }
}

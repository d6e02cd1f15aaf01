//! NPC creation and ownership.
//!
//! The [`NpcManager`] owns every [`Npc`] record, keyed by id. Iteration is
//! in ascending id order, which is also the order the scheduler updates
//! NPCs in. Names are unique within a manager.

use std::collections::{BTreeMap, BTreeSet};

use hamlet_types::{
    ControlMode, Direction, HouseId, ItemId, Npc, NpcId, NpcState, NpcStats, Position, Profession,
    WorkHours,
};
use tracing::debug;

use crate::config::NpcConfig;
use crate::error::AgentError;
use crate::inventory;

/// Parameters for spawning an NPC.
#[derive(Debug, Clone)]
pub struct SpawnParams {
    /// Display name (must be unique).
    pub name: String,
    /// Starting tile.
    pub position: Position,
    /// Labor performed.
    pub profession: Profession,
    /// Initial control mode.
    pub control_mode: ControlMode,
    /// Dwelling, if already known.
    pub house_id: Option<HouseId>,
    /// Work window. `None` uses the configured default.
    pub work_hours: Option<WorkHours>,
    /// Items carried at spawn, subject to the usual stack and weight limits.
    pub starting_inventory: BTreeMap<ItemId, u32>,
    /// Equipment worn at spawn.
    pub equipped: BTreeSet<ItemId>,
}

impl SpawnParams {
    /// Autonomous NPC with empty hands and default hours.
    pub fn new(name: impl Into<String>, position: Position, profession: Profession) -> Self {
        Self {
            name: name.into(),
            position,
            profession,
            control_mode: ControlMode::Autonomous,
            house_id: None,
            work_hours: None,
            starting_inventory: BTreeMap::new(),
            equipped: BTreeSet::new(),
        }
    }
}

/// Creates and owns NPCs.
#[derive(Debug, Default)]
pub struct NpcManager {
    npcs: BTreeMap<NpcId, Npc>,
    /// Set of all NPC names currently in use.
    names_in_use: BTreeSet<String>,
}

impl NpcManager {
    /// Create an empty manager.
    pub const fn new() -> Self {
        Self {
            npcs: BTreeMap::new(),
            names_in_use: BTreeSet::new(),
        }
    }

    /// Spawn an idle NPC.
    ///
    /// Equipment is applied before the starting inventory so that carry
    /// bonuses count towards the weight check.
    ///
    /// # Errors
    ///
    /// - [`AgentError::DuplicateName`] if the name is already taken.
    /// - [`AgentError::NotEquippable`] for equipment without a carry bonus.
    /// - Any [`inventory::add_item`] error for the starting inventory.
    pub fn spawn(&mut self, params: SpawnParams, config: &NpcConfig) -> Result<NpcId, AgentError> {
        if self.names_in_use.contains(&params.name) {
            return Err(AgentError::DuplicateName(params.name));
        }

        let id = NpcId::new();
        let mut npc = Npc {
            id,
            name: params.name,
            position: params.position,
            control_mode: params.control_mode,
            profession: params.profession,
            state: NpcState::Idle,
            current_task: None,
            moving_until: None,
            last_action_time: 0,
            house_id: params.house_id,
            inventory: BTreeMap::new(),
            equipped: BTreeSet::new(),
            work_hours: params.work_hours.unwrap_or(config.default_work_hours),
            facing: Direction::South,
            animation: None,
            stats: NpcStats::default(),
        };

        for item in params.equipped {
            if inventory::item_def(item).carry_bonus == 0 {
                return Err(AgentError::NotEquippable(item));
            }
            npc.equipped.insert(item);
        }
        for (item, qty) in params.starting_inventory {
            inventory::add_item(&mut npc, item, qty, config.base_carry_weight)?;
        }

        debug!(npc = %id, name = %npc.name, profession = ?npc.profession, at = %npc.position, "Spawned NPC");
        self.names_in_use.insert(npc.name.clone());
        self.npcs.insert(id, npc);
        Ok(id)
    }

    /// Remove an NPC and release its name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NpcNotFound`] if the id is unknown.
    pub fn remove(&mut self, id: NpcId) -> Result<Npc, AgentError> {
        let npc = self.npcs.remove(&id).ok_or(AgentError::NpcNotFound(id))?;
        self.names_in_use.remove(&npc.name);
        Ok(npc)
    }

    /// Look up an NPC.
    pub fn get(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id)
    }

    /// Mutable access to an NPC.
    pub fn get_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.get_mut(&id)
    }

    /// All NPCs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.values()
    }

    /// All NPCs, mutably, in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Npc> {
        self.npcs.values_mut()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<NpcId> {
        self.npcs.keys().copied().collect()
    }

    /// Number of NPCs.
    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    /// Whether there are no NPCs.
    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// Check whether a name is currently in use.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }

    /// Change an NPC's profession. Any active task is dropped and the NPC
    /// goes idle.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NpcNotFound`] if the id is unknown.
    pub fn set_profession(&mut self, id: NpcId, profession: Profession) -> Result<(), AgentError> {
        let npc = self.npcs.get_mut(&id).ok_or(AgentError::NpcNotFound(id))?;
        if npc.profession != profession {
            npc.profession = profession;
            npc.current_task = None;
            npc.animation = None;
            if npc.state == NpcState::Working {
                npc.state = NpcState::Idle;
            }
        }
        Ok(())
    }
}

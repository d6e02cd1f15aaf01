//! Per-NPC cooldowns for player-issued work commands.
//!
//! Each entry stores the simulation time at which the NPC may issue its
//! next manual work command. Expired entries are pruned once per tick.

use std::collections::BTreeMap;

use hamlet_types::NpcId;

use crate::error::AgentError;

/// Expiry timestamps keyed by NPC.
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    expires_at: BTreeMap<NpcId, u64>,
}

impl CooldownTracker {
    /// Create an empty tracker.
    pub const fn new() -> Self {
        Self {
            expires_at: BTreeMap::new(),
        }
    }

    /// Milliseconds until `npc` may act again (0 when ready).
    pub fn remaining(&self, npc: NpcId, now: u64) -> u64 {
        self.expires_at
            .get(&npc)
            .map_or(0, |expiry| expiry.saturating_sub(now))
    }

    /// Check that `npc` is not on cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::CooldownActive`] with the remaining time.
    pub fn check(&self, npc: NpcId, now: u64) -> Result<(), AgentError> {
        match self.remaining(npc, now) {
            0 => Ok(()),
            remaining_ms => Err(AgentError::CooldownActive { npc, remaining_ms }),
        }
    }

    /// Start a cooldown of `duration_ms` for `npc`, replacing any previous one.
    pub fn start(&mut self, npc: NpcId, now: u64, duration_ms: u64) {
        self.expires_at.insert(npc, now.saturating_add(duration_ms));
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn prune(&mut self, now: u64) -> usize {
        let before = self.expires_at.len();
        self.expires_at.retain(|_, expiry| *expiry > now);
        before.saturating_sub(self.expires_at.len())
    }

    /// Number of NPCs with a live or unpruned cooldown.
    pub fn len(&self) -> usize {
        self.expires_at.len()
    }

    /// Whether no cooldowns are tracked.
    pub fn is_empty(&self) -> bool {
        self.expires_at.is_empty()
    }
}

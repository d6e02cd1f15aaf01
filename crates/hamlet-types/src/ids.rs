//! Type-safe identifier wrappers.
//!
//! NPCs and houses are identified by UUID v7 (time-ordered) so identifiers
//! created by external collaborators (village generation, tests) never
//! collide. Harvestable resources use a per-registry monotonic counter
//! instead: resource ids are never reused, and ascending id order is the
//! deterministic tie-break for equally distant work candidates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares UUID v7 backed id newtypes.
macro_rules! uuid_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    )+};
}

uuid_ids! {
    /// Unique identifier for an NPC.
    NpcId;
    /// Unique identifier for a house (dwelling with aggregate storage).
    HouseId;
}

/// Identifier of a harvestable resource (tree, stone, or animal).
///
/// Allocated by the owning registry from a monotonic counter starting at 1.
/// Once a resource is removed its id is never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Return the raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "res-{}", self.0)
    }
}

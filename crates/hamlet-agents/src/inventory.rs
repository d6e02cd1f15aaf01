//! Inventory and carry-capacity operations for NPCs.
//!
//! Every item has a weight and a stack limit (see [`item_def`]). An NPC may
//! carry items up to its maximum carry weight: the configured base capacity
//! plus bonuses from equipped items (a backpack adds 20).
//!
//! [`add_item`] is the only way weight grows, and it rejects (never clamps)
//! additions that would break the stack limit or the weight limit. Being
//! overweight is still possible after unequipping a backpack; that state is
//! advisory (it halves movement speed) and is never corrected here.
//!
//! All arithmetic is checked. No silent overflows, no panics.

use std::collections::BTreeMap;

use hamlet_types::{ItemId, Npc};

use crate::error::AgentError;

/// Static properties of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    /// Weight of one unit.
    pub weight: u32,
    /// Maximum units of this item one NPC may hold.
    pub max_stack: u32,
    /// Carry weight granted while equipped. Zero for non-equipment.
    pub carry_bonus: u32,
    /// Whether the item is a raw resource unloaded into house storage.
    pub raw_resource: bool,
}

/// Look up the static definition of an item.
pub const fn item_def(item: ItemId) -> ItemDef {
    match item {
        ItemId::Wood => ItemDef {
            weight: 2,
            max_stack: 50,
            carry_bonus: 0,
            raw_resource: true,
        },
        ItemId::Stone => ItemDef {
            weight: 3,
            max_stack: 50,
            carry_bonus: 0,
            raw_resource: true,
        },
        ItemId::Food => ItemDef {
            weight: 1,
            max_stack: 30,
            carry_bonus: 0,
            raw_resource: true,
        },
        ItemId::Meat => ItemDef {
            weight: 2,
            max_stack: 30,
            carry_bonus: 0,
            raw_resource: true,
        },
        ItemId::Hide => ItemDef {
            weight: 1,
            max_stack: 20,
            carry_bonus: 0,
            raw_resource: true,
        },
        ItemId::Backpack => ItemDef {
            weight: 1,
            max_stack: 1,
            carry_bonus: 20,
            raw_resource: false,
        },
    }
}

/// Weight of `qty` units of `item`, or `None` on overflow.
fn stack_weight(item: ItemId, qty: u32) -> Option<u32> {
    item_def(item).weight.checked_mul(qty)
}

/// Total weight of everything carried (equipped items excluded).
///
/// Returns `None` if the sum overflows `u32`.
pub fn total_weight(npc: &Npc) -> Option<u32> {
    let mut total: u32 = 0;
    for (&item, &qty) in &npc.inventory {
        total = total.checked_add(stack_weight(item, qty)?)?;
    }
    Some(total)
}

/// Maximum carry weight: `base_capacity` plus equipped bonuses.
pub fn max_carry_weight(npc: &Npc, base_capacity: u32) -> u32 {
    npc.equipped
        .iter()
        .fold(base_capacity, |acc, item| acc.saturating_add(item_def(*item).carry_bonus))
}

/// Whether the carried weight exceeds the maximum. Overflowing weights count
/// as overweight.
pub fn is_overweight(npc: &Npc, base_capacity: u32) -> bool {
    total_weight(npc).is_none_or(|weight| weight > max_carry_weight(npc, base_capacity))
}

/// Whether the carried weight is at least `threshold_pct` percent of the
/// maximum carry weight.
pub fn is_near_capacity(npc: &Npc, base_capacity: u32, threshold_pct: u32) -> bool {
    let Some(weight) = total_weight(npc) else {
        return true;
    };
    let max = u64::from(max_carry_weight(npc, base_capacity));
    u64::from(weight).saturating_mul(100) >= max.saturating_mul(u64::from(threshold_pct))
}

/// Time to walk one tile: `base_ms`, scaled by `overweight_pct` percent
/// when the NPC is overweight.
pub fn movement_duration_ms(
    npc: &Npc,
    base_capacity: u32,
    base_ms: u64,
    overweight_pct: u32,
) -> u64 {
    if is_overweight(npc, base_capacity) {
        base_ms
            .saturating_mul(u64::from(overweight_pct))
            .checked_div(100)
            .unwrap_or(base_ms)
    } else {
        base_ms
    }
}

/// Quantity of `item` held.
pub fn quantity(npc: &Npc, item: ItemId) -> u32 {
    npc.inventory.get(&item).copied().unwrap_or(0)
}

/// Add `qty` units of `item` to the NPC's inventory.
///
/// # Errors
///
/// - [`AgentError::StackLimitExceeded`] if the stack would exceed the
///   item's `max_stack`.
/// - [`AgentError::OverCapacity`] if the total weight would exceed
///   [`max_carry_weight`].
///
/// On error the inventory is unchanged.
pub fn add_item(
    npc: &mut Npc,
    item: ItemId,
    qty: u32,
    base_capacity: u32,
) -> Result<(), AgentError> {
    let def = item_def(item);
    let current = quantity(npc, item);

    let new_qty = current
        .checked_add(qty)
        .filter(|total| *total <= def.max_stack)
        .ok_or(AgentError::StackLimitExceeded {
            item,
            current,
            attempted: qty,
            max_stack: def.max_stack,
        })?;

    let capacity = max_carry_weight(npc, base_capacity);
    let overflow = || AgentError::OverCapacity {
        item,
        attempted: qty,
        resulting_weight: u32::MAX,
        capacity,
    };
    let current_weight = total_weight(npc).ok_or_else(overflow)?;
    let added_weight = stack_weight(item, qty).ok_or_else(overflow)?;
    let resulting_weight = current_weight.checked_add(added_weight).ok_or_else(overflow)?;

    if resulting_weight > capacity {
        return Err(AgentError::OverCapacity {
            item,
            attempted: qty,
            resulting_weight,
            capacity,
        });
    }

    if new_qty > 0 {
        npc.inventory.insert(item, new_qty);
    }
    Ok(())
}

/// Remove `qty` units of `item`.
///
/// Removes the key entirely if the quantity reaches zero.
///
/// # Errors
///
/// Returns [`AgentError::InsufficientItem`] (inventory unchanged) if the
/// NPC holds fewer than `qty` units.
pub fn remove_item(npc: &mut Npc, item: ItemId, qty: u32) -> Result<(), AgentError> {
    let current = quantity(npc, item);
    let remaining = current
        .checked_sub(qty)
        .ok_or(AgentError::InsufficientItem {
            item,
            requested: qty,
            available: current,
        })?;

    if remaining == 0 {
        npc.inventory.remove(&item);
    } else {
        npc.inventory.insert(item, remaining);
    }
    Ok(())
}

/// Equip one carried unit of `item`, moving it out of the inventory.
///
/// # Errors
///
/// - [`AgentError::NotEquippable`] if the item grants no carry bonus.
/// - [`AgentError::AlreadyEquipped`] if one is already worn.
/// - [`AgentError::InsufficientItem`] if the NPC does not carry one.
pub fn equip(npc: &mut Npc, item: ItemId) -> Result<(), AgentError> {
    if item_def(item).carry_bonus == 0 {
        return Err(AgentError::NotEquippable(item));
    }
    if npc.equipped.contains(&item) {
        return Err(AgentError::AlreadyEquipped(item));
    }
    remove_item(npc, item, 1)?;
    npc.equipped.insert(item);
    Ok(())
}

/// Unequip `item` and put it back into the inventory.
///
/// Only the stack limit is enforced: taking off a backpack may leave the
/// NPC overweight.
///
/// # Errors
///
/// - [`AgentError::NotEquipped`] if the item is not worn.
/// - [`AgentError::StackLimitExceeded`] if the inventory already holds a
///   full stack of it.
pub fn unequip(npc: &mut Npc, item: ItemId) -> Result<(), AgentError> {
    if !npc.equipped.contains(&item) {
        return Err(AgentError::NotEquipped(item));
    }
    let def = item_def(item);
    let current = quantity(npc, item);
    let new_qty = current
        .checked_add(1)
        .filter(|total| *total <= def.max_stack)
        .ok_or(AgentError::StackLimitExceeded {
            item,
            current,
            attempted: 1,
            max_stack: def.max_stack,
        })?;
    npc.equipped.remove(&item);
    npc.inventory.insert(item, new_qty);
    Ok(())
}

/// The raw-resource part of the inventory (what a house accepts).
pub fn raw_resources(npc: &Npc) -> BTreeMap<ItemId, u32> {
    npc.inventory
        .iter()
        .filter(|(item, qty)| item_def(**item).raw_resource && **qty > 0)
        .map(|(item, qty)| (*item, *qty))
        .collect()
}

/// Drop every raw resource from the inventory, keeping equipment.
pub fn clear_raw_resources(npc: &mut Npc) {
    npc.inventory.retain(|item, _| !item_def(*item).raw_resource);
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use hamlet_types::{
        ControlMode, Direction, NpcId, NpcState, NpcStats, Position, Profession, WorkHours,
    };

    use super::*;

    const BASE: u32 = 30;

    fn npc() -> Npc {
        Npc {
            id: NpcId::new(),
            name: String::from("Tester"),
            position: Position::new(0, 0),
            control_mode: ControlMode::Autonomous,
            profession: Profession::Lumberjack,
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
    fn weight_uses_item_definitions() {
        let mut n = npc();
        n.inventory.insert(ItemId::Wood, 3);
        n.inventory.insert(ItemId::Stone, 2);
        assert_eq!(total_weight(&n), Some(12));
    }

    #[test]
    fn add_item_success_and_stacking() {
        let mut n = npc();
        assert!(add_item(&mut n, ItemId::Wood, 2, BASE).is_ok());
        assert!(add_item(&mut n, ItemId::Wood, 3, BASE).is_ok());
        assert_eq!(quantity(&n, ItemId::Wood), 5);
        assert_eq!(total_weight(&n), Some(10));
    }

    #[test]
    fn add_item_exact_capacity_is_allowed() {
        let mut n = npc();
        assert!(add_item(&mut n, ItemId::Stone, 10, BASE).is_ok());
        assert_eq!(total_weight(&n), Some(30));
        assert!(!is_overweight(&n, BASE));
    }

    #[test]
    fn add_item_rejects_over_capacity_without_mutation() {
        let mut n = npc();
        add_item(&mut n, ItemId::Wood, 14, BASE).unwrap_or_default();
        let result = add_item(&mut n, ItemId::Wood, 2, BASE);
        assert!(matches!(
            result,
            Err(AgentError::OverCapacity {
                resulting_weight: 32,
                capacity: 30,
                ..
            })
        ));
        assert_eq!(quantity(&n, ItemId::Wood), 14);
        assert!(total_weight(&n).unwrap_or(u32::MAX) <= max_carry_weight(&n, BASE));
    }

    #[test]
    fn add_item_rejects_stack_overflow() {
        let mut n = npc();
        let result = add_item(&mut n, ItemId::Hide, 21, 1_000);
        assert!(matches!(result, Err(AgentError::StackLimitExceeded { max_stack: 20, .. })));
        assert!(n.inventory.is_empty());
    }

    #[test]
    fn failure_reason_is_readable() {
        let mut n = npc();
        let err = add_item(&mut n, ItemId::Stone, 11, BASE).err();
        let text = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(text.starts_with("over capacity"));
    }

    #[test]
    fn remove_item_exact_and_insufficient() {
        let mut n = npc();
        n.inventory.insert(ItemId::Meat, 3);
        assert!(matches!(
            remove_item(&mut n, ItemId::Meat, 4),
            Err(AgentError::InsufficientItem { available: 3, .. })
        ));
        assert_eq!(quantity(&n, ItemId::Meat), 3);
        assert!(remove_item(&mut n, ItemId::Meat, 3).is_ok());
        assert!(!n.inventory.contains_key(&ItemId::Meat));
    }

    #[test]
    fn backpack_raises_capacity() {
        let mut n = npc();
        n.inventory.insert(ItemId::Backpack, 1);
        assert_eq!(max_carry_weight(&n, BASE), 30);
        assert!(equip(&mut n, ItemId::Backpack).is_ok());
        assert_eq!(max_carry_weight(&n, BASE), 50);
        assert!(add_item(&mut n, ItemId::Stone, 15, BASE).is_ok());
        assert_eq!(total_weight(&n), Some(45));
        assert!(matches!(
            equip(&mut n, ItemId::Backpack),
            Err(AgentError::AlreadyEquipped(_))
        ));
    }

    #[test]
    fn unequipping_can_leave_npc_overweight() {
        let mut n = npc();
        n.equipped.insert(ItemId::Backpack);
        n.inventory.insert(ItemId::Stone, 12);
        assert!(!is_overweight(&n, BASE));
        assert!(unequip(&mut n, ItemId::Backpack).is_ok());
        assert!(is_overweight(&n, BASE));
        assert_eq!(movement_duration_ms(&n, BASE, 400, 200), 800);
        assert!(add_item(&mut n, ItemId::Food, 1, BASE).is_err());
    }

    #[test]
    fn non_equipment_cannot_be_equipped() {
        let mut n = npc();
        n.inventory.insert(ItemId::Wood, 1);
        assert!(matches!(equip(&mut n, ItemId::Wood), Err(AgentError::NotEquippable(_))));
        assert!(matches!(
            equip(&mut n, ItemId::Backpack),
            Err(AgentError::InsufficientItem { .. })
        ));
    }

    #[test]
    fn near_capacity_threshold() {
        let mut n = npc();
        n.inventory.insert(ItemId::Wood, 11);
        assert!(!is_near_capacity(&n, BASE, 80));
        n.inventory.insert(ItemId::Wood, 12);
        assert!(is_near_capacity(&n, BASE, 80));
    }

    #[test]
    fn raw_resources_exclude_equipment() {
        let mut n = npc();
        n.inventory.insert(ItemId::Wood, 2);
        n.inventory.insert(ItemId::Backpack, 1);
        let raw = raw_resources(&n);
        assert_eq!(raw.get(&ItemId::Wood), Some(&2));
        assert!(!raw.contains_key(&ItemId::Backpack));
        clear_raw_resources(&mut n);
        assert_eq!(n.inventory.len(), 1);
        assert_eq!(quantity(&n, ItemId::Backpack), 1);
    }
}

//! House directory: dwellings, residents, and aggregate storage.
//!
//! Houses are supplied by village generation. The simulation only reads a
//! house's position and writes to its storage when a resident unloads.
//! Deposits are all-or-nothing: if the full load does not fit, nothing is
//! stored and the carrier keeps everything.

use std::collections::BTreeMap;

use hamlet_types::{House, HouseId, HouseType, ItemId, NpcId, Position};

use crate::error::WorldError;
use crate::grid::GridBounds;

/// Owning collection of every house in the world.
#[derive(Debug, Clone, Default)]
pub struct HouseDirectory {
    houses: BTreeMap<HouseId, House>,
}

impl HouseDirectory {
    /// Create an empty directory.
    pub const fn new() -> Self {
        Self {
            houses: BTreeMap::new(),
        }
    }

    /// Build a new empty house of `house_type` at `position` with the
    /// style's default storage capacity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidPosition`] if `position` is out of bounds.
    pub fn add_house(
        &mut self,
        house_type: HouseType,
        position: Position,
        bounds: &GridBounds,
    ) -> Result<HouseId, WorldError> {
        if !bounds.is_valid(position) {
            return Err(WorldError::InvalidPosition(position));
        }
        let id = HouseId::new();
        self.houses.insert(
            id,
            House {
                id,
                house_type,
                position,
                inventory: BTreeMap::new(),
                max_storage: house_type.default_storage(),
                npc_id: None,
            },
        );
        Ok(id)
    }

    /// Insert a fully formed house record (from village generation).
    /// Replaces any house with the same id.
    pub fn insert(&mut self, house: House) {
        self.houses.insert(house.id, house);
    }

    /// Look up a house.
    pub fn get(&self, id: HouseId) -> Option<&House> {
        self.houses.get(&id)
    }

    /// All houses in id order.
    pub fn iter(&self) -> impl Iterator<Item = &House> {
        self.houses.values()
    }

    /// Number of houses.
    pub fn len(&self) -> usize {
        self.houses.len()
    }

    /// Whether there are no houses.
    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    /// First house without a resident, in id order.
    pub fn first_vacant(&self) -> Option<HouseId> {
        self.houses
            .values()
            .find(|house| house.npc_id.is_none())
            .map(|house| house.id)
    }

    /// Record `npc` as the resident of `house_id`.
    ///
    /// Re-assigning the same resident is a no-op.
    ///
    /// # Errors
    ///
    /// - [`WorldError::HouseNotFound`] if the house does not exist.
    /// - [`WorldError::HouseOccupied`] if another NPC already lives there.
    pub fn assign_resident(&mut self, house_id: HouseId, npc: NpcId) -> Result<(), WorldError> {
        let house = self
            .houses
            .get_mut(&house_id)
            .ok_or(WorldError::HouseNotFound(house_id))?;
        match house.npc_id {
            Some(resident) if resident != npc => Err(WorldError::HouseOccupied {
                house: house_id,
                resident,
            }),
            _ => {
                house.npc_id = Some(npc);
                Ok(())
            }
        }
    }

    /// Clear the resident of `house_id`. Returns the previous resident.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HouseNotFound`] if the house does not exist.
    pub fn vacate(&mut self, house_id: HouseId) -> Result<Option<NpcId>, WorldError> {
        let house = self
            .houses
            .get_mut(&house_id)
            .ok_or(WorldError::HouseNotFound(house_id))?;
        Ok(house.npc_id.take())
    }

    /// Total units currently stored in a house.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HouseNotFound`] or
    /// [`WorldError::ArithmeticOverflow`].
    pub fn stored_units(&self, house_id: HouseId) -> Result<u32, WorldError> {
        let house = self
            .houses
            .get(&house_id)
            .ok_or(WorldError::HouseNotFound(house_id))?;
        sum_units(&house.inventory)
    }

    /// Store every item in `items` in the house, or nothing at all.
    ///
    /// Returns the number of units stored.
    ///
    /// # Errors
    ///
    /// - [`WorldError::HouseNotFound`] if the house does not exist.
    /// - [`WorldError::StorageFull`] if the whole load does not fit. The
    ///   house is left unchanged.
    pub fn deposit(
        &mut self,
        house_id: HouseId,
        items: &BTreeMap<ItemId, u32>,
    ) -> Result<u32, WorldError> {
        let house = self
            .houses
            .get_mut(&house_id)
            .ok_or(WorldError::HouseNotFound(house_id))?;

        let requested = sum_units(items)?;
        let stored = sum_units(&house.inventory)?;
        let available = house.max_storage.saturating_sub(stored);
        if requested > available {
            return Err(WorldError::StorageFull {
                house: house_id,
                requested,
                available,
            });
        }

        for (&item, &qty) in items {
            if qty == 0 {
                continue;
            }
            let entry = house.inventory.entry(item).or_insert(0);
            *entry = entry.checked_add(qty).ok_or(WorldError::ArithmeticOverflow)?;
        }
        Ok(requested)
    }
}

/// Sum of all quantities in an item map.
fn sum_units(items: &BTreeMap<ItemId, u32>) -> Result<u32, WorldError> {
    items.values().try_fold(0_u32, |acc, qty| {
        acc.checked_add(*qty).ok_or(WorldError::ArithmeticOverflow)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn directory_with_house() -> (HouseDirectory, HouseId) {
        let mut dir = HouseDirectory::new();
        let id = dir
            .add_house(HouseType::Cottage, Position::new(0, 0), &GridBounds::default())
            .unwrap();
        (dir, id)
    }

    #[test]
    fn add_house_rejects_out_of_bounds() {
        let mut dir = HouseDirectory::new();
        let result = dir.add_house(HouseType::Cabin, Position::new(500, 0), &GridBounds::default());
        assert!(matches!(result, Err(WorldError::InvalidPosition(_))));
        assert!(dir.is_empty());
    }

    #[test]
    fn one_resident_per_house() {
        let (mut dir, id) = directory_with_house();
        let first = NpcId::new();
        let second = NpcId::new();
        assert!(dir.assign_resident(id, first).is_ok());
        assert!(dir.assign_resident(id, first).is_ok());
        assert!(matches!(
            dir.assign_resident(id, second),
            Err(WorldError::HouseOccupied { .. })
        ));
        assert_eq!(dir.vacate(id).unwrap(), Some(first));
        assert!(dir.assign_resident(id, second).is_ok());
        assert_eq!(dir.first_vacant(), None);
    }

    #[test]
    fn deposit_accumulates_items() {
        let (mut dir, id) = directory_with_house();
        let load: BTreeMap<ItemId, u32> = [(ItemId::Wood, 4), (ItemId::Stone, 2)].into();
        assert_eq!(dir.deposit(id, &load).unwrap(), 6);
        assert_eq!(dir.deposit(id, &load).unwrap(), 6);
        assert_eq!(dir.stored_units(id).unwrap(), 12);
        assert_eq!(dir.get(id).unwrap().inventory.get(&ItemId::Wood), Some(&8));
    }

    #[test]
    fn deposit_is_all_or_nothing() {
        let (mut dir, id) = directory_with_house();
        let filler: BTreeMap<ItemId, u32> = [(ItemId::Stone, 95)].into();
        dir.deposit(id, &filler).unwrap();

        let load: BTreeMap<ItemId, u32> = [(ItemId::Wood, 4), (ItemId::Food, 2)].into();
        let result = dir.deposit(id, &load);
        assert!(matches!(
            result,
            Err(WorldError::StorageFull {
                requested: 6,
                available: 5,
                ..
            })
        ));
        assert_eq!(dir.stored_units(id).unwrap(), 95);
        assert_eq!(dir.get(id).unwrap().inventory.get(&ItemId::Wood), None);
    }

    #[test]
    fn unknown_house_is_reported() {
        let mut dir = HouseDirectory::new();
        let ghost = HouseId::new();
        assert!(matches!(dir.vacate(ghost), Err(WorldError::HouseNotFound(_))));
        assert!(matches!(
            dir.deposit(ghost, &BTreeMap::new()),
            Err(WorldError::HouseNotFound(_))
        ));
    }
}

//! Character inventory slots

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

/// Kind of inventory slot. Everything except `Any` counts as equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    Any,
    Head,
    OuterClothes,
    LeftHand,
    RightHand,
}

impl SlotType {
    pub fn is_equip_slot(self) -> bool {
        self != SlotType::Any
    }
}

/// Fixed set of typed slots, each holding at most one item
#[derive(Debug, Clone)]
pub struct Inventory {
    slot_types: Vec<SlotType>,
    items: Vec<Option<EntityId>>,
}

impl Inventory {
    pub fn new(slot_types: Vec<SlotType>) -> Self {
        let items = vec![None; slot_types.len()];
        Self { slot_types, items }
    }

    /// Standard humanoid layout: four equip slots and five pockets
    pub fn humanoid() -> Self {
        let mut slots = vec![
            SlotType::Head,
            SlotType::OuterClothes,
            SlotType::LeftHand,
            SlotType::RightHand,
        ];
        slots.extend(std::iter::repeat(SlotType::Any).take(5));
        Self::new(slots)
    }

    pub fn capacity(&self) -> usize {
        self.slot_types.len()
    }

    pub fn slot_type(&self, index: usize) -> SlotType {
        self.slot_types[index]
    }

    pub fn item_at(&self, index: usize) -> Option<EntityId> {
        self.items.get(index).copied().flatten()
    }

    pub fn contains(&self, item: EntityId) -> bool {
        self.slot_of(item).is_some()
    }

    pub fn slot_of(&self, item: EntityId) -> Option<usize> {
        self.items.iter().position(|slot| *slot == Some(item))
    }

    /// True if the item sits in a non-`Any` slot
    pub fn is_equipped(&self, item: EntityId) -> bool {
        self.slot_of(item)
            .map(|i| self.slot_types[i].is_equip_slot())
            .unwrap_or(false)
    }

    /// First empty slot whose type is in `allowed`
    pub fn first_free(&self, allowed: &[SlotType]) -> Option<usize> {
        (0..self.capacity()).find(|&i| self.items[i].is_none() && allowed.contains(&self.slot_types[i]))
    }

    /// Put an item in a specific slot. Fails if the slot is taken.
    pub fn put(&mut self, item: EntityId, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(item);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, item: EntityId) -> bool {
        match self.slot_of(item) {
            Some(index) => {
                self.items[index] = None;
                true
            }
            None => false,
        }
    }

    /// Every held item
    pub fn items(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.iter().filter_map(|slot| *slot)
    }

    /// Items in equip slots, with their slot index
    pub fn equipped(&self) -> impl Iterator<Item = (usize, EntityId)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(i, _)| self.slot_types[*i].is_equip_slot())
            .filter_map(|(i, slot)| slot.map(|id| (i, id)))
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::humanoid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_remove() {
        let mut inventory = Inventory::humanoid();
        let item = EntityId::new();

        let pocket = inventory.first_free(&[SlotType::Any]).unwrap();
        assert!(inventory.put(item, pocket));
        assert!(inventory.contains(item));
        assert!(!inventory.is_equipped(item));

        // Slot is taken now
        assert!(!inventory.put(EntityId::new(), pocket));

        assert!(inventory.remove(item));
        assert!(!inventory.contains(item));
    }

    #[test]
    fn test_equip_slot_counts_as_equipped() {
        let mut inventory = Inventory::humanoid();
        let mask = EntityId::new();
        let head = inventory.first_free(&[SlotType::Head]).unwrap();
        inventory.put(mask, head);

        assert!(inventory.is_equipped(mask));
        assert_eq!(inventory.equipped().collect::<Vec<_>>(), vec![(head, mask)]);
    }
}

//! ECS World - manages all characters and items and the services the AI uses

use ahash::{AHashMap, AHashSet};

use crate::core::types::{CrewId, EntityId, HullId, LevelType, Seconds, Vec2};
use crate::world::campaign::Campaign;
use crate::world::character::Character;
use crate::world::inventory::SlotType;
use crate::world::item::{Item, ItemParent, RelatedItem, Repairable};

/// Oxygen regained per second when breathing normally
const OXYGEN_RECOVERY_RATE: f32 = 10.0;
/// Oxygen lost per second when submerged without gear
const OXYGEN_DEPLETION_RATE: f32 = 5.0;
/// Tank condition used per second of breathing from it
const TANK_DRAIN_RATE: f32 = 0.5;

/// The game world containing all entities
pub struct World {
    pub time: Seconds,
    pub level_type: LevelType,
    pub campaign: Campaign,
    characters: AHashMap<EntityId, Character>,
    items: AHashMap<EntityId, Item>,
    sealed_hulls: AHashSet<HullId>,
    flooded_hulls: AHashSet<HullId>,
}

impl World {
    pub fn new(level_type: LevelType, campaign: Campaign) -> Self {
        Self {
            time: 0.0,
            level_type,
            campaign,
            characters: AHashMap::new(),
            items: AHashMap::new(),
            sealed_hulls: AHashSet::new(),
            flooded_hulls: AHashSet::new(),
        }
    }

    // === ENTITIES ===

    pub fn spawn_character(&mut self, character: Character) -> EntityId {
        let id = character.id;
        self.characters.insert(id, character);
        id
    }

    pub fn spawn_item(&mut self, item: Item) -> EntityId {
        let id = item.id;
        self.items.insert(id, item);
        id
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    pub fn item(&self, id: EntityId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn item_mut(&mut self, id: EntityId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Player crew members that carry a stable identity
    pub fn crew(&self) -> impl Iterator<Item = &Character> {
        self.characters.values().filter(|c| c.is_crew())
    }

    pub fn find_crew(&self, id: CrewId) -> Option<&Character> {
        self.crew().find(|c| c.info_id == Some(id))
    }

    pub fn find_crew_mut(&mut self, id: CrewId) -> Option<&mut Character> {
        self.characters
            .values_mut()
            .find(|c| c.is_crew() && c.info_id == Some(id))
    }

    // === HULLS ===

    pub fn seal_hull(&mut self, hull: HullId) {
        self.sealed_hulls.insert(hull);
    }

    pub fn is_hull_sealed(&self, hull: HullId) -> bool {
        self.sealed_hulls.contains(&hull)
    }

    pub fn flood_hull(&mut self, hull: HullId) {
        self.flooded_hulls.insert(hull);
    }

    pub fn is_flooded(&self, hull: Option<HullId>) -> bool {
        hull.map(|h| self.flooded_hulls.contains(&h)).unwrap_or(true)
    }

    // === ITEM PLACEMENT ===

    /// Position and hull of an item, following it into inventories and containers
    pub fn item_location(&self, id: EntityId) -> Option<(Vec2, Option<HullId>)> {
        let item = self.items.get(&id)?;
        match item.parent {
            ItemParent::World => Some((item.position, item.hull)),
            ItemParent::Inventory(owner) => {
                let owner = self.characters.get(&owner)?;
                Some((owner.position, owner.hull))
            }
            ItemParent::Container(container) if container != id => self.item_location(container),
            ItemParent::Container(_) => None,
        }
    }

    /// Character currently carrying the item, directly or inside a container
    pub fn holder_of(&self, id: EntityId) -> Option<EntityId> {
        let item = self.items.get(&id)?;
        match item.parent {
            ItemParent::World => None,
            ItemParent::Inventory(owner) => Some(owner),
            ItemParent::Container(container) if container != id => self.holder_of(container),
            ItemParent::Container(_) => None,
        }
    }

    /// Remove an item from whatever holds it, leaving it loose in the world
    fn detach(&mut self, id: EntityId) {
        let location = self.item_location(id);
        let parent = match self.items.get(&id) {
            Some(item) => item.parent,
            None => return,
        };
        match parent {
            ItemParent::World => {}
            ItemParent::Inventory(owner) => {
                if let Some(character) = self.characters.get_mut(&owner) {
                    character.inventory.remove(id);
                    if character.selected_item == Some(id) {
                        character.selected_item = None;
                    }
                }
            }
            ItemParent::Container(container) => {
                if let Some(c) = self.items.get_mut(&container).and_then(|i| i.container.as_mut()) {
                    c.contained.retain(|contained| *contained != id);
                }
            }
        }
        if let Some(item) = self.items.get_mut(&id) {
            item.parent = ItemParent::World;
            if let Some((position, hull)) = location {
                item.position = position;
                item.hull = hull;
            }
        }
    }

    /// Drop an item at the character's feet
    pub fn drop_item(&mut self, character: EntityId, id: EntityId) {
        let Some((position, hull)) = self.characters.get(&character).map(|c| (c.position, c.hull)) else {
            return;
        };
        self.detach(id);
        if let Some(item) = self.items.get_mut(&id) {
            item.position = position;
            item.hull = hull;
        }
        tracing::debug!(?character, item = ?id, "dropped item");
    }

    /// Put an item in a specific inventory slot
    pub fn try_put_in_slot(&mut self, character: EntityId, id: EntityId, index: usize) -> bool {
        let allowed = {
            let (Some(c), Some(item)) = (self.characters.get(&character), self.items.get(&id)) else {
                return false;
            };
            let Some(pickable) = item.pickable.as_ref() else {
                return false;
            };
            if index >= c.inventory.capacity() || c.inventory.item_at(index).is_some() {
                return false;
            }
            let slot = c.inventory.slot_type(index);
            slot == SlotType::Any || pickable.allowed_slots.contains(&slot)
        };
        if !allowed {
            return false;
        }
        self.detach(id);
        self.place_in_inventory(character, id, index)
    }

    /// Put an item in the first free pocket
    pub fn try_put_in_any_slot(&mut self, character: EntityId, id: EntityId) -> bool {
        let Some(index) = self
            .characters
            .get(&character)
            .and_then(|c| c.inventory.first_free(&[SlotType::Any]))
        else {
            return false;
        };
        self.try_put_in_slot(character, id, index)
    }

    /// Pick up an item, into an equip slot if `equip` and one is free
    pub fn pick_up(&mut self, character: EntityId, id: EntityId, equip: bool) -> bool {
        let Some(pickable) = self.items.get(&id).and_then(|i| i.pickable.clone()) else {
            return false;
        };
        let index = {
            let Some(c) = self.characters.get(&character) else {
                return false;
            };
            if c.inventory.contains(id) && (!equip || c.inventory.is_equipped(id)) {
                return true;
            }
            let equip_slot = if equip {
                c.inventory.first_free(&pickable.allowed_slots)
            } else {
                None
            };
            match equip_slot.or_else(|| c.inventory.first_free(&[SlotType::Any])) {
                Some(index) => index,
                None => return false,
            }
        };
        self.detach(id);
        self.place_in_inventory(character, id, index)
    }

    fn place_in_inventory(&mut self, character: EntityId, id: EntityId, index: usize) -> bool {
        let placed = self
            .characters
            .get_mut(&character)
            .map(|c| c.inventory.put(id, index))
            .unwrap_or(false);
        if placed {
            if let Some(item) = self.items.get_mut(&id) {
                item.parent = ItemParent::Inventory(character);
            }
        }
        placed
    }

    /// Put an item inside a container item
    pub fn put_in_container(&mut self, id: EntityId, container: EntityId) -> bool {
        if id == container {
            return false;
        }
        let has_room = self
            .items
            .get(&container)
            .and_then(|c| c.container.as_ref())
            .map(|c| !c.is_full())
            .unwrap_or(false);
        if !has_room || !self.items.contains_key(&id) {
            return false;
        }
        self.detach(id);
        if let Some(c) = self.items.get_mut(&container).and_then(|c| c.container.as_mut()) {
            c.contained.push(id);
        }
        if let Some(item) = self.items.get_mut(&id) {
            item.parent = ItemParent::Container(container);
        }
        true
    }

    pub fn contained_items(&self, id: EntityId) -> Vec<EntityId> {
        self.items.get(&id).map(|i| i.contained().to_vec()).unwrap_or_default()
    }

    // === QUERIES ===

    pub fn has_equipped(&self, character: EntityId, id: EntityId) -> bool {
        self.characters
            .get(&character)
            .map(|c| c.inventory.is_equipped(id))
            .unwrap_or(false)
    }

    /// Carried item matching any identifier or tag
    pub fn inventory_item_matching(&self, character: EntityId, identifiers: &[String]) -> Option<EntityId> {
        let c = self.characters.get(&character)?;
        c.inventory
            .items()
            .find(|id| self.items.get(id).map(|i| i.matches_any(identifiers)).unwrap_or(false))
    }

    /// Equipped items with the tag
    pub fn equipped_with_tag(&self, character: EntityId, tag: &str) -> Vec<EntityId> {
        let Some(c) = self.characters.get(&character) else {
            return Vec::new();
        };
        c.inventory
            .equipped()
            .map(|(_, id)| id)
            .filter(|id| self.items.get(id).map(|i| i.has_tag(tag)).unwrap_or(false))
            .collect()
    }

    /// Gear holds a non-empty oxygen source
    pub fn has_oxygen_source(&self, gear: EntityId) -> bool {
        self.contained_items(gear).iter().any(|id| {
            self.items
                .get(id)
                .map(|i| i.is_oxygen_source() && i.condition > 0.0)
                .unwrap_or(false)
        })
    }

    pub fn connected_controllers(&self, id: EntityId) -> Vec<EntityId> {
        self.items
            .get(&id)
            .map(|item| {
                item.connections
                    .iter()
                    .copied()
                    .filter(|c| self.items.get(c).map(|i| i.is_controller).unwrap_or(false))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn distance_to_item(&self, character: EntityId, id: EntityId) -> Option<f32> {
        let c = self.characters.get(&character)?;
        let (position, _) = self.item_location(id)?;
        Some(c.position.distance(position))
    }

    pub fn in_interact_range(&self, character: EntityId, id: EntityId) -> bool {
        match (self.distance_to_item(character, id), self.items.get(&id)) {
            (Some(distance), Some(item)) => distance < item.interact_distance,
            _ => false,
        }
    }

    pub fn same_hull(&self, character: EntityId, id: EntityId) -> bool {
        match (self.characters.get(&character), self.item_location(id)) {
            (Some(c), Some((_, hull))) => c.hull == hull,
            _ => false,
        }
    }

    /// Held by the character, or within reach in the same hull
    pub fn can_interact_with(&self, character: EntityId, id: EntityId) -> bool {
        if self.holder_of(id) == Some(character) {
            return true;
        }
        self.in_interact_range(character, id) && self.same_hull(character, id)
    }

    /// Items in the inventory satisfying each of the repairable's requirements
    pub fn missing_requirements(&self, character: EntityId, repairable: &Repairable) -> Vec<RelatedItem> {
        let Some(c) = self.characters.get(&character) else {
            return repairable.required_items.clone();
        };
        repairable
            .required_items
            .iter()
            .filter(|req| {
                !c.inventory
                    .items()
                    .any(|id| self.items.get(&id).map(|i| req.matches(i)).unwrap_or(false))
            })
            .cloned()
            .collect()
    }

    // === ACTIONS ===

    pub fn select_item(&mut self, character: EntityId, id: EntityId) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.selected_item = Some(id);
        }
    }

    /// Run the item's operable component for one tick; true on a completed cycle
    pub fn ai_operate(&mut self, character: EntityId, id: EntityId, dt: f32) -> bool {
        let Some(operable) = self.items.get_mut(&id).and_then(|i| i.operable.as_mut()) else {
            return false;
        };
        let done = operable.operate(dt);
        if done {
            tracing::debug!(?character, item = ?id, "operate cycle completed");
        }
        done
    }

    /// Aim a carried repair tool at the target
    pub fn use_repair_tool(&mut self, tool: EntityId, target: EntityId, dt: f32) {
        let Some(rate) = self.items.get(&tool).and_then(|t| t.repair_tool).map(|t| t.repair_rate) else {
            return;
        };
        if let Some(item) = self.items.get_mut(&target) {
            item.condition = (item.condition + rate * dt).min(item.max_condition);
        }
    }

    /// Walk in a straight line. Returns true once at the target.
    ///
    /// A selected item that ends up out of reach is deselected.
    pub fn move_toward(
        &mut self,
        character: EntityId,
        target: Vec2,
        hull: Option<HullId>,
        speed: f32,
        dt: f32,
    ) -> bool {
        let Some(c) = self.characters.get_mut(&character) else {
            return false;
        };
        let offset = target - c.position;
        let step = speed * dt;
        let arrived = offset.length() <= step;
        if arrived {
            c.position = target;
            c.hull = hull;
        } else {
            c.position += offset.normalize_or_zero() * step;
        }

        let selected = c.selected_item;
        if let Some(item) = selected.filter(|item| !self.can_interact_with(character, *item)) {
            tracing::debug!(?character, ?item, "walked out of reach, deselected");
            if let Some(c) = self.characters.get_mut(&character) {
                c.selected_item = None;
            }
        }
        arrived
    }

    // === SIMULATION ===

    /// Advance the environment: deterioration, repairs in progress, breathing
    pub fn update(&mut self, dt: f32) {
        self.time += dt as Seconds;

        for item in self.items.values_mut() {
            if item.deterioration_rate > 0.0 {
                item.condition = (item.condition - item.deterioration_rate * dt).max(0.0);
            }
        }

        // A claim only holds while the fixer is alive, has the item selected
        // and can reach it
        let mut repairs = Vec::new();
        let mut released = Vec::new();
        for item in self.items.values() {
            for (index, repairable) in item.repairables.iter().enumerate() {
                let Some(fixer_id) = repairable.current_fixer else {
                    continue;
                };
                match self.characters.get(&fixer_id) {
                    Some(fixer)
                        if !fixer.is_dead
                            && fixer.selected_item == Some(item.id)
                            && self.can_interact_with(fixer_id, item.id) =>
                    {
                        repairs.push((item.id, repairable.repair_rate * repairable.degree_of_success(fixer) * dt));
                    }
                    _ => released.push((item.id, index)),
                }
            }
        }
        for (id, index) in released {
            if let Some(repairable) = self.items.get_mut(&id).and_then(|i| i.repairables.get_mut(index)) {
                tracing::debug!(item = ?id, fixer = ?repairable.current_fixer, "repair claim lapsed");
                repairable.current_fixer = None;
            }
        }
        for (id, amount) in repairs {
            if let Some(item) = self.items.get_mut(&id) {
                item.condition = (item.condition + amount).min(item.max_condition);
            }
        }

        let breathing: Vec<(EntityId, Option<EntityId>, bool)> = self
            .characters
            .values()
            .filter(|c| !c.is_dead)
            .map(|c| {
                let tank = self.equipped_with_tag(c.id, "diving").into_iter().find_map(|gear| {
                    self.contained_items(gear).into_iter().find(|id| {
                        self.items
                            .get(id)
                            .map(|i| i.is_oxygen_source() && i.condition > 0.0)
                            .unwrap_or(false)
                    })
                });
                (c.id, tank, self.is_flooded(c.hull))
            })
            .collect();
        for (id, tank, flooded) in breathing {
            let delta = match (flooded, tank) {
                (false, _) => OXYGEN_RECOVERY_RATE,
                (true, Some(tank)) => {
                    if let Some(tank) = self.items.get_mut(&tank) {
                        tank.condition = (tank.condition - TANK_DRAIN_RATE * dt).max(0.0);
                    }
                    OXYGEN_RECOVERY_RATE
                }
                (true, None) => -OXYGEN_DEPLETION_RATE,
            };
            if let Some(c) = self.characters.get_mut(&id) {
                c.oxygen_available = (c.oxygen_available + delta * dt).clamp(0.0, 100.0);
            }
        }
    }
}

//! Items and the components the crew AI interacts with

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, HullId, Vec2};
use crate::world::character::Character;
use crate::world::inventory::SlotType;

/// Where an item currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemParent {
    /// Loose in the world
    World,
    /// In a character's inventory
    Inventory(EntityId),
    /// Inside another item's container
    Container(EntityId),
}

/// An item can be picked up and carried in these slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickable {
    /// Slots the item may be equipped in. Empty means pockets only.
    pub allowed_slots: Vec<SlotType>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemContainer {
    pub capacity: usize,
    pub contained: Vec<EntityId>,
}

impl ItemContainer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, contained: Vec::new() }
    }

    pub fn is_full(&self) -> bool {
        self.contained.len() >= self.capacity
    }
}

/// Something a character can operate (pump, reactor, navigation terminal)
#[derive(Debug, Clone)]
pub struct Operable {
    /// Seconds of operation needed for one completed operate cycle
    pub work_required: f32,
    pub progress: f32,
}

impl Operable {
    pub fn new(work_required: f32) -> Self {
        Self { work_required, progress: 0.0 }
    }

    /// Advance by `dt`; true when a cycle completes
    pub fn operate(&mut self, dt: f32) -> bool {
        self.progress += dt;
        if self.progress >= self.work_required {
            self.progress = 0.0;
            return true;
        }
        false
    }
}

/// Items matching any of these identifiers or tags satisfy the requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub identifiers: Vec<String>,
}

impl RelatedItem {
    pub fn new(identifiers: &[&str]) -> Self {
        Self { identifiers: identifiers.iter().map(|s| s.to_string()).collect() }
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.matches_any(&self.identifiers)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill: String,
    pub level: f32,
}

/// Repairable component
#[derive(Debug, Clone)]
pub struct Repairable {
    pub required_items: Vec<RelatedItem>,
    pub required_skills: Vec<SkillRequirement>,
    /// Condition restored per second at full degree of success
    pub repair_rate: f32,
    pub current_fixer: Option<EntityId>,
}

impl Repairable {
    pub fn new(repair_rate: f32) -> Self {
        Self {
            required_items: Vec::new(),
            required_skills: Vec::new(),
            repair_rate,
            current_fixer: None,
        }
    }

    pub fn with_required_item(mut self, identifiers: &[&str]) -> Self {
        self.required_items.push(RelatedItem::new(identifiers));
        self
    }

    pub fn with_required_skill(mut self, skill: &str, level: f32) -> Self {
        self.required_skills.push(SkillRequirement { skill: skill.to_string(), level });
        self
    }

    /// How well the character can repair this, in [0, 1]
    ///
    /// 0.5 when the character exactly meets the skill requirements,
    /// 1.0 at 100 skill points above them.
    pub fn degree_of_success(&self, character: &Character) -> f32 {
        if self.required_skills.is_empty() {
            return 1.0;
        }
        let sum: f32 = self
            .required_skills
            .iter()
            .map(|req| character.skill_level(&req.skill) - req.level)
            .sum();
        let average = sum / self.required_skills.len() as f32;
        ((average + 100.0) / 2.0 / 100.0).clamp(0.0, 1.0)
    }
}

/// A tool that adds condition to whatever it's aimed at
#[derive(Debug, Clone, Copy)]
pub struct RepairTool {
    pub repair_rate: f32,
}

/// A world item
#[derive(Debug, Clone)]
pub struct Item {
    pub id: EntityId,
    pub identifier: String,
    pub name: String,
    pub tags: Vec<String>,
    pub position: Vec2,
    pub hull: Option<HullId>,
    pub condition: f32,
    pub max_condition: f32,
    /// Condition lost per second
    pub deterioration_rate: f32,
    pub interact_distance: f32,
    /// Can be selected and used in place
    pub selectable: bool,
    pub is_controller: bool,
    pub parent: ItemParent,
    pub pickable: Option<Pickable>,
    pub container: Option<ItemContainer>,
    pub operable: Option<Operable>,
    pub repairables: Vec<Repairable>,
    pub repair_tool: Option<RepairTool>,
    /// Items wired to this one
    pub connections: Vec<EntityId>,
}

impl Item {
    pub fn new(identifier: &str, name: &str, position: Vec2, hull: Option<HullId>) -> Self {
        Self {
            id: EntityId::new(),
            identifier: identifier.to_string(),
            name: name.to_string(),
            tags: Vec::new(),
            position,
            hull,
            condition: 100.0,
            max_condition: 100.0,
            deterioration_rate: 0.0,
            interact_distance: crate::core::config::config().default_interact_distance,
            selectable: false,
            is_controller: false,
            parent: ItemParent::World,
            pickable: None,
            container: None,
            operable: None,
            repairables: Vec::new(),
            repair_tool: None,
            connections: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_condition(mut self, condition: f32) -> Self {
        self.condition = condition.clamp(0.0, self.max_condition);
        self
    }

    pub fn with_pickable(mut self, allowed_slots: &[SlotType]) -> Self {
        self.pickable = Some(Pickable { allowed_slots: allowed_slots.to_vec() });
        self
    }

    pub fn with_container(mut self, capacity: usize) -> Self {
        self.container = Some(ItemContainer::new(capacity));
        self
    }

    pub fn with_operable(mut self, work_required: f32) -> Self {
        self.operable = Some(Operable::new(work_required));
        self.selectable = true;
        self
    }

    pub fn with_repairable(mut self, repairable: Repairable) -> Self {
        self.repairables.push(repairable);
        self
    }

    pub fn with_repair_tool(mut self, repair_rate: f32) -> Self {
        self.repair_tool = Some(RepairTool { repair_rate });
        self
    }

    pub fn as_controller(mut self) -> Self {
        self.is_controller = true;
        self.selectable = true;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Identifier or any tag matches one of `identifiers`
    pub fn matches_any(&self, identifiers: &[String]) -> bool {
        identifiers
            .iter()
            .any(|id| self.identifier.eq_ignore_ascii_case(id) || self.has_tag(id))
    }

    pub fn is_full_condition(&self) -> bool {
        self.condition >= self.max_condition
    }

    pub fn contained(&self) -> &[EntityId] {
        self.container.as_ref().map(|c| c.contained.as_slice()).unwrap_or(&[])
    }

    /// Oxygen tanks and other breathable sources
    pub fn is_oxygen_source(&self) -> bool {
        self.identifier.eq_ignore_ascii_case("oxygentank") || self.has_tag("oxygensource")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operable_cycles() {
        let mut operable = Operable::new(1.0);
        assert!(!operable.operate(0.5));
        assert!(operable.operate(0.5));
        assert_eq!(operable.progress, 0.0);
    }

    #[test]
    fn test_degree_of_success_without_skills_is_full() {
        let repairable = Repairable::new(1.0);
        let character = Character::new("Tester", crate::core::types::Team::Crew);
        assert_eq!(repairable.degree_of_success(&character), 1.0);
    }

    #[test]
    fn test_degree_of_success_scales_with_skill() {
        let repairable = Repairable::new(1.0).with_required_skill("mechanical", 40.0);
        let mut novice = Character::new("Novice", crate::core::types::Team::Crew);
        novice.skills.insert("mechanical".into(), 40.0);
        let mut expert = Character::new("Expert", crate::core::types::Team::Crew);
        expert.skills.insert("mechanical".into(), 90.0);

        assert_eq!(repairable.degree_of_success(&novice), 0.5);
        assert_eq!(repairable.degree_of_success(&expert), 0.75);
    }

    #[test]
    fn test_matches_identifier_or_tag() {
        let tank = Item::new("oxygentank", "Oxygen Tank", Vec2::ZERO, None);
        let vent = Item::new("oxygenitecanister", "Oxygenite", Vec2::ZERO, None)
            .with_tags(&["oxygensource"]);
        assert!(tank.is_oxygen_source());
        assert!(vent.is_oxygen_source());
        assert!(tank.matches_any(&["OxygenTank".to_string()]));
    }
}

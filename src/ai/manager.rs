//! Per-character objective list and the scheduler that drives it

use ordered_float::OrderedFloat;

use crate::ai::context::AgentContext;
use crate::ai::objective::{AiObjective, Objective};
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Which objective a manager is running this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    Order,
    Objective(usize),
}

pub struct ObjectiveManager {
    character: EntityId,
    objectives: Vec<AiObjective>,
    current_order: Option<AiObjective>,
}

impl ObjectiveManager {
    pub fn new(character: EntityId) -> Self {
        Self {
            character,
            objectives: Vec::new(),
            current_order: None,
        }
    }

    pub fn character(&self) -> EntityId {
        self.character
    }

    pub fn objectives(&self) -> &[AiObjective] {
        &self.objectives
    }

    pub fn current_order(&self) -> Option<&AiObjective> {
        self.current_order.as_ref()
    }

    /// Add an objective unless an equivalent one is already queued
    pub fn add_objective(&mut self, objective: impl Into<AiObjective>) -> bool {
        let objective = objective.into();
        if self.objectives.iter().any(|o| o.is_duplicate(&objective)) {
            tracing::debug!(character = ?self.character, kind = objective.debug_tag(), "duplicate objective ignored");
            return false;
        }
        tracing::debug!(character = ?self.character, kind = objective.debug_tag(), "objective added");
        self.objectives.push(objective);
        true
    }

    /// Give the character a direct order, replacing any previous one
    pub fn set_order(&mut self, order: impl Into<AiObjective>) {
        let mut order = order.into();
        if let AiObjective::OperateItem(operate) = &mut order {
            operate.set_order(true);
        }
        tracing::info!(character = ?self.character, kind = order.debug_tag(), "new order");
        self.current_order = Some(order);
    }

    pub fn clear_order(&mut self) {
        self.current_order = None;
    }

    /// Highest priority among the order and the queued objectives
    fn select(&self, world: &World) -> Option<Active> {
        let order = self
            .current_order
            .as_ref()
            .map(|o| (Active::Order, o.priority(world, self.character)));
        let queued = self
            .objectives
            .iter()
            .enumerate()
            .map(|(i, o)| (Active::Objective(i), o.priority(world, self.character)));
        order
            .into_iter()
            .chain(queued)
            .filter(|(_, priority)| *priority > 0.0)
            .max_by_key(|(_, priority)| OrderedFloat(*priority))
            .map(|(active, _)| active)
    }

    /// Drop finished objectives, then act the most urgent one.
    ///
    /// Returns the debug tag of the objective that acted, if any.
    pub fn update(&mut self, world: &mut World, dt: f32) -> Option<&'static str> {
        let character = self.character;
        if world.character(character).map(|c| c.is_dead).unwrap_or(true) {
            return None;
        }
        let mut ctx = AgentContext::new(world, character);

        if let Some(order) = self.current_order.as_mut() {
            if order.is_completed(&mut ctx) || !order.can_be_completed() {
                tracing::debug!(?character, kind = order.debug_tag(), "order finished");
                self.current_order = None;
            }
        }
        self.objectives.retain_mut(|o| {
            let keep = !o.is_completed(&mut ctx) && o.can_be_completed();
            if !keep {
                tracing::debug!(?character, kind = o.debug_tag(), "objective finished");
            }
            keep
        });

        let active = self.select(ctx.world)?;
        let objective = match active {
            Active::Order => self.current_order.as_mut()?,
            Active::Objective(i) => self.objectives.get_mut(i)?,
        };
        objective.act(&mut ctx, dt);
        Some(objective.debug_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{FindDivingGear, OperateItem, RepairItem};
    use crate::core::types::{LevelType, Team, Vec2};
    use crate::world::campaign::Campaign;
    use crate::world::character::Character;
    use crate::world::item::{Item, Repairable};

    fn world() -> World {
        World::new(LevelType::LocationConnection, Campaign::default())
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut world = world();
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));
        let pump = world.spawn_item(Item::new("pump", "Pump", Vec2::ZERO, None).with_condition(10.0));

        let mut manager = ObjectiveManager::new(crew);
        assert!(manager.add_objective(RepairItem::new(&world, pump).unwrap()));
        assert!(!manager.add_objective(RepairItem::new(&world, pump).unwrap()));
        assert!(manager.add_objective(FindDivingGear::new(false)));
        assert!(!manager.add_objective(FindDivingGear::new(true)));
        assert_eq!(manager.objectives().len(), 2);
    }

    #[test]
    fn test_order_outranks_autonomous_work() {
        let mut world = world();
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::ZERO, None)
                .with_operable(100.0)
                .with_condition(10.0)
                .with_repairable(Repairable::new(1.0)),
        );
        let mut manager = ObjectiveManager::new(crew);
        manager.add_objective(RepairItem::new(&world, pump).unwrap().with_priority(50.0));
        manager.set_order(OperateItem::new(&world, pump, "pumpwater", false, false).unwrap().looping());

        assert_eq!(manager.update(&mut world, 1.0), Some("operate item"));

        manager.clear_order();
        assert_eq!(manager.update(&mut world, 1.0), Some("repair item"));
    }

    #[test]
    fn test_completed_objectives_are_dropped() {
        let mut world = world();
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));
        let pump = world.spawn_item(Item::new("pump", "Pump", Vec2::ZERO, None).with_operable(1.0));

        let mut manager = ObjectiveManager::new(crew);
        manager.add_objective(OperateItem::new(&world, pump, "pumpwater", false, false).unwrap());
        assert_eq!(manager.update(&mut world, 1.0), Some("operate item"));
        assert_eq!(manager.update(&mut world, 1.0), None);
        assert!(manager.objectives().is_empty());
    }

    #[test]
    fn test_dead_characters_do_nothing() {
        let mut world = world();
        let mut corpse = Character::new("Jones", Team::Crew);
        corpse.is_dead = true;
        let crew = world.spawn_character(corpse);

        let mut manager = ObjectiveManager::new(crew);
        manager.add_objective(FindDivingGear::new(false));
        assert_eq!(manager.update(&mut world, 1.0), None);
    }
}

//! Walk to an item
//!
//! Movement is a straight line; routing around geometry is left to the
//! pathfinding layer. The objective gives up when the target disappears or
//! sits in a sealed hull.

use crate::ai::context::AgentContext;
use crate::ai::objective::{AiObjective, Objective, ObjectiveBase};
use crate::core::config::config;
use crate::core::types::EntityId;
use crate::ecs::world::World;

#[derive(Debug)]
pub struct GoTo {
    target: EntityId,
    can_be_completed: bool,
    base: ObjectiveBase,
}

impl GoTo {
    pub fn to_item(item: EntityId) -> Self {
        Self {
            target: item,
            can_be_completed: true,
            base: ObjectiveBase::default(),
        }
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Close enough to interact with the target
    pub fn reached(&self, world: &World, character: EntityId) -> bool {
        world.can_interact_with(character, self.target)
    }
}

impl Objective for GoTo {
    fn debug_tag(&self) -> &'static str {
        "go to"
    }

    fn priority(&self, _world: &World, _character: EntityId) -> f32 {
        self.base.priority.clamp(0.0, 100.0)
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        self.reached(ctx.world, ctx.character)
    }

    fn can_be_completed(&self) -> bool {
        self.can_be_completed
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(other, AiObjective::GoTo(other) if other.target == self.target)
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        let Some((position, hull)) = ctx.world.item_location(self.target) else {
            self.can_be_completed = false;
            return;
        };
        if hull.map(|h| ctx.world.is_hull_sealed(h)).unwrap_or(false) {
            tracing::debug!(?hull, "go to: target hull is sealed");
            self.can_be_completed = false;
            return;
        }
        if self.reached(ctx.world, ctx.character) {
            return;
        }
        ctx.world.move_toward(ctx.character, position, hull, config().walk_speed, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{HullId, LevelType, Team, Vec2};
    use crate::world::campaign::Campaign;
    use crate::world::character::Character;
    use crate::world::item::Item;

    #[test]
    fn test_walks_until_item_in_reach() {
        let mut world = World::new(LevelType::LocationConnection, Campaign::default());
        let walker = world.spawn_character(Character::new("Walker", Team::Crew).at(Vec2::ZERO, Some(HullId(1))));
        let pump = world.spawn_item(Item::new("pump", "Pump", Vec2::new(300.0, 0.0), Some(HullId(2))));

        let mut goto = GoTo::to_item(pump);
        let mut ctx = AgentContext::new(&mut world, walker);
        for _ in 0..10 {
            if goto.is_completed(&mut ctx) {
                break;
            }
            goto.act(&mut ctx, 1.0);
        }
        assert!(goto.is_completed(&mut ctx));
        assert_eq!(ctx.character().unwrap().hull, Some(HullId(2)));
    }

    #[test]
    fn test_sealed_hull_cannot_be_completed() {
        let mut world = World::new(LevelType::LocationConnection, Campaign::default());
        world.seal_hull(HullId(2));
        let walker = world.spawn_character(Character::new("Walker", Team::Crew));
        let pump = world.spawn_item(Item::new("pump", "Pump", Vec2::new(300.0, 0.0), Some(HullId(2))));

        let mut goto = GoTo::to_item(pump);
        goto.act(&mut AgentContext::new(&mut world, walker), 1.0);
        assert!(!goto.can_be_completed());
    }

    #[test]
    fn test_same_target_is_duplicate() {
        let item = EntityId::new();
        let a = GoTo::to_item(item);
        let b: AiObjective = GoTo::to_item(item).into();
        let c: AiObjective = GoTo::to_item(EntityId::new()).into();
        assert!(a.is_duplicate(&b));
        assert!(!a.is_duplicate(&c));
    }
}

//! Get into diving gear with a usable oxygen source

use crate::ai::contain_item::ContainItem;
use crate::ai::context::AgentContext;
use crate::ai::get_item::GetItem;
use crate::ai::objective::{AiObjective, Objective, SubObjective};
use crate::core::config::config;
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Identifiers and tags accepted as breathable
const OXYGEN_SOURCES: [&str; 2] = ["oxygentank", "oxygensource"];

#[derive(Debug)]
pub struct FindDivingGear {
    gear_tag: &'static str,
    sub: SubObjective,
}

impl FindDivingGear {
    /// `need_diving_suit` asks for a full suit rather than any diving gear
    pub fn new(need_diving_suit: bool) -> Self {
        Self {
            gear_tag: if need_diving_suit { "divingsuit" } else { "diving" },
            sub: SubObjective::default(),
        }
    }

    pub fn gear_tag(&self) -> &'static str {
        self.gear_tag
    }

    /// Equipped gear carrying the tag, if any
    fn equipped_gear(&self, world: &World, character: EntityId) -> Option<EntityId> {
        world.equipped_with_tag(character, self.gear_tag).into_iter().next()
    }
}

impl Objective for FindDivingGear {
    fn debug_tag(&self) -> &'static str {
        "find diving gear"
    }

    /// The less oxygen, the more urgent
    fn priority(&self, world: &World, character: EntityId) -> f32 {
        let oxygen = world.character(character).map(|c| c.oxygen_available).unwrap_or(100.0);
        (100.0 - oxygen).clamp(0.0, 100.0)
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        ctx.world
            .equipped_with_tag(ctx.character, self.gear_tag)
            .into_iter()
            .any(|gear| ctx.world.has_oxygen_source(gear))
    }

    fn can_be_completed(&self) -> bool {
        self.sub.can_be_completed()
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(other, AiObjective::FindDivingGear(_))
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        let Some(gear) = self.equipped_gear(ctx.world, ctx.character) else {
            if !matches!(self.sub.get(), Some(AiObjective::GetItem(_))) {
                ctx.speak("DialogGetDivingGear", None, "getdivinggear", config().dialogue_cooldown);
                self.sub.set(GetItem::matching(&[self.gear_tag], true));
            }
            self.sub.act(ctx, dt);
            return;
        };

        if ctx.world.item(gear).and_then(|i| i.container.as_ref()).is_none() {
            return;
        }

        let empty: Vec<EntityId> = ctx
            .world
            .contained_items(gear)
            .into_iter()
            .filter(|id| ctx.world.item(*id).map(|i| i.condition <= 0.0).unwrap_or(false))
            .collect();
        for item in empty {
            ctx.world.drop_item(ctx.character, item);
        }
        if ctx.world.has_oxygen_source(gear) {
            return;
        }

        let needs_new = match self.sub.get() {
            Some(AiObjective::ContainItem(contain)) => contain.container() != gear,
            _ => true,
        };
        if needs_new || self.sub.is_completed(ctx) {
            ctx.speak("DialogGetOxygenTank", None, "getoxygentank", config().dialogue_cooldown);
            self.sub.set(ContainItem::new(&OXYGEN_SOURCES, gear));
        }
        self.sub.act(ctx, dt);
    }
}

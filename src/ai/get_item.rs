//! Acquire an item, optionally equipping it

use crate::ai::context::AgentContext;
use crate::ai::go_to::GoTo;
use crate::ai::objective::{AiObjective, Objective, ObjectiveBase};
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// What the character is looking for
#[derive(Debug, Clone, PartialEq)]
pub enum ItemQuery {
    /// One particular item
    Specific(EntityId),
    /// Any item whose identifier or tags match
    Matching(Vec<String>),
}

#[derive(Debug)]
pub struct GetItem {
    query: ItemQuery,
    equip: bool,
    target: Option<EntityId>,
    goto: Option<GoTo>,
    can_be_completed: bool,
    base: ObjectiveBase,
}

impl GetItem {
    pub fn specific(item: EntityId, equip: bool) -> Self {
        Self::new(ItemQuery::Specific(item), equip)
    }

    pub fn matching<S: AsRef<str>>(identifiers: &[S], equip: bool) -> Self {
        let identifiers = identifiers.iter().map(|s| s.as_ref().to_string()).collect();
        Self::new(ItemQuery::Matching(identifiers), equip)
    }

    fn new(query: ItemQuery, equip: bool) -> Self {
        Self {
            query,
            equip,
            target: None,
            goto: None,
            can_be_completed: true,
            base: ObjectiveBase::default(),
        }
    }

    pub fn query(&self) -> &ItemQuery {
        &self.query
    }

    /// A carried item that satisfies the query
    fn held_match(&self, world: &World, character: EntityId) -> Option<EntityId> {
        match &self.query {
            ItemQuery::Specific(item) => world
                .character(character)
                .filter(|c| c.inventory.contains(*item))
                .map(|_| *item),
            ItemQuery::Matching(identifiers) => world.inventory_item_matching(character, identifiers),
        }
    }

    /// Pick the item to walk to
    fn find_target(&self, world: &World, character: EntityId) -> Option<EntityId> {
        match &self.query {
            ItemQuery::Specific(item) => is_available(world, character, *item).then_some(*item),
            ItemQuery::Matching(identifiers) => {
                let position = world.character(character)?.position;
                world
                    .items()
                    .filter(|i| i.pickable.is_some() && i.condition > 0.0 && i.matches_any(identifiers))
                    .filter(|i| world.holder_of(i.id).is_none())
                    .filter_map(|i| world.item_location(i.id).map(|(p, _)| (i.id, p.distance(position))))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(id, _)| id)
            }
        }
    }
}

impl Objective for GetItem {
    fn debug_tag(&self) -> &'static str {
        "get item"
    }

    fn priority(&self, _world: &World, _character: EntityId) -> f32 {
        self.base.priority.clamp(0.0, 100.0)
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        match self.held_match(ctx.world, ctx.character) {
            Some(item) => !self.equip || ctx.world.has_equipped(ctx.character, item),
            None => false,
        }
    }

    fn can_be_completed(&self) -> bool {
        self.can_be_completed
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(other, AiObjective::GetItem(other) if other.query == self.query && other.equip == self.equip)
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        let character = ctx.character;

        if let Some(held) = self.held_match(ctx.world, character) {
            if self.equip && !ctx.world.has_equipped(character, held) {
                ctx.world.pick_up(character, held, true);
                if !ctx.world.has_equipped(character, held) {
                    tracing::debug!(item = ?held, "get item: no free slot to equip into");
                    self.can_be_completed = false;
                }
            }
            return;
        }

        // Re-resolve when the previous target was taken by someone else
        let still_valid = self
            .target
            .map(|t| is_available(ctx.world, character, t))
            .unwrap_or(false);
        if !still_valid {
            self.target = self.find_target(ctx.world, character);
            self.goto = None;
        }
        let Some(target) = self.target else {
            tracing::debug!(query = ?self.query, "get item: nothing to pick up");
            self.can_be_completed = false;
            return;
        };

        if ctx.world.can_interact_with(character, target) {
            if !ctx.world.pick_up(character, target, self.equip) {
                self.can_be_completed = false;
            }
            self.goto = None;
            return;
        }

        let heading_there = self.goto.as_ref().map(|g| g.target()) == Some(target);
        if !heading_there {
            self.goto = Some(GoTo::to_item(target));
        }
        let Some(goto) = self.goto.as_mut() else {
            return;
        };
        goto.act(ctx, dt);
        if !goto.can_be_completed() {
            self.can_be_completed = false;
        }
    }
}

/// Exists and is loose or already ours
fn is_available(world: &World, character: EntityId, item: EntityId) -> bool {
    let holder = world.holder_of(item);
    world.item(item).is_some() && (holder.is_none() || holder == Some(character))
}

//! Put an item matching some identifiers into a container

use crate::ai::context::AgentContext;
use crate::ai::get_item::GetItem;
use crate::ai::objective::{AiObjective, Objective, ObjectiveBase};
use crate::core::types::EntityId;
use crate::ecs::world::World;

#[derive(Debug)]
pub struct ContainItem {
    identifiers: Vec<String>,
    container: EntityId,
    get_item: Option<GetItem>,
    can_be_completed: bool,
    base: ObjectiveBase,
}

impl ContainItem {
    pub fn new<S: AsRef<str>>(identifiers: &[S], container: EntityId) -> Self {
        Self {
            identifiers: identifiers.iter().map(|s| s.as_ref().to_string()).collect(),
            container,
            get_item: None,
            can_be_completed: true,
            base: ObjectiveBase::default(),
        }
    }

    pub fn container(&self) -> EntityId {
        self.container
    }

    /// A usable matching item is already inside
    fn is_contained(&self, world: &World) -> bool {
        world.contained_items(self.container).iter().any(|id| {
            world
                .item(*id)
                .map(|i| i.condition > 0.0 && i.matches_any(&self.identifiers))
                .unwrap_or(false)
        })
    }

    fn carried_candidate(&self, world: &World, character: EntityId) -> Option<EntityId> {
        let c = world.character(character)?;
        c.inventory.items().find(|id| {
            *id != self.container
                && world
                    .item(*id)
                    .map(|i| i.condition > 0.0 && i.matches_any(&self.identifiers))
                    .unwrap_or(false)
        })
    }
}

impl Objective for ContainItem {
    fn debug_tag(&self) -> &'static str {
        "contain item"
    }

    fn priority(&self, _world: &World, _character: EntityId) -> f32 {
        self.base.priority.clamp(0.0, 100.0)
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        self.is_contained(ctx.world)
    }

    fn can_be_completed(&self) -> bool {
        self.can_be_completed
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(
            other,
            AiObjective::ContainItem(other)
                if other.container == self.container && other.identifiers == self.identifiers
        )
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        if ctx.world.item(self.container).is_none() {
            self.can_be_completed = false;
            return;
        }

        if let Some(item) = self.carried_candidate(ctx.world, ctx.character) {
            if !ctx.world.put_in_container(item, self.container) {
                tracing::debug!(?item, container = ?self.container, "contain item: container refused item");
                self.can_be_completed = false;
            }
            self.get_item = None;
            return;
        }

        let identifiers = &self.identifiers;
        let get_item = self.get_item.get_or_insert_with(|| GetItem::matching(identifiers.as_slice(), false));
        get_item.act(ctx, dt);
        if !get_item.can_be_completed() {
            self.can_be_completed = false;
        }
    }
}

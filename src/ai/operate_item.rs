//! Operate an item, directly or through a connected controller
//!
//! Selectable targets (pumps, terminals) are walked to and used in place.
//! Handheld targets are fetched first and, when required, equipped into a
//! slot the item allows before they are operated.

use crate::ai::context::AgentContext;
use crate::ai::get_item::GetItem;
use crate::ai::go_to::GoTo;
use crate::ai::objective::{AiObjective, Objective, ObjectiveBase, SubObjective};
use crate::core::config::config;
use crate::core::error::{CrewError, Result};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::world::inventory::SlotType;

/// Devotion never contributes more than this to an unordered operate
const MAX_DEVOTION: f32 = 10.0;
/// Hard ceiling for autonomous operate priorities
const MAX_AUTONOMOUS_PRIORITY: f32 = 90.0;

#[derive(Debug)]
pub struct OperateItem {
    component: EntityId,
    controller: Option<EntityId>,
    use_controller: bool,
    require_equip: bool,
    is_order: bool,
    completed: bool,
    can_be_completed: bool,
    sub: SubObjective,
    base: ObjectiveBase,
}

impl OperateItem {
    /// Fails if the component item does not exist. The controller is looked
    /// up once, here, among the component's connected items.
    pub fn new(
        world: &World,
        component: EntityId,
        option: &str,
        require_equip: bool,
        use_controller: bool,
    ) -> Result<Self> {
        if world.item(component).is_none() {
            return Err(CrewError::ItemNotFound(component));
        }
        let controller = if use_controller {
            world.connected_controllers(component).into_iter().next()
        } else {
            None
        };
        Ok(Self {
            component,
            controller,
            use_controller,
            require_equip,
            is_order: false,
            completed: false,
            can_be_completed: true,
            sub: SubObjective::default(),
            base: ObjectiveBase { option: option.to_string(), ..ObjectiveBase::default() },
        })
    }

    pub fn with_priority(mut self, priority: f32, modifier: f32) -> Self {
        self.base.priority = priority;
        self.base.priority_modifier = modifier;
        self
    }

    /// Standing orders keep running after each completed cycle
    pub fn looping(mut self) -> Self {
        self.base.is_loop = true;
        self
    }

    pub fn component(&self) -> EntityId {
        self.component
    }

    pub fn controller(&self) -> Option<EntityId> {
        self.controller
    }

    pub fn option(&self) -> &str {
        &self.base.option
    }

    pub fn set_order(&mut self, is_order: bool) {
        self.is_order = is_order;
    }

    fn missing_controller(&self) -> bool {
        self.use_controller && self.controller.is_none()
    }

    fn goto_failed(&self) -> bool {
        matches!(self.sub.get(), Some(goto @ AiObjective::GoTo(_)) if !goto.can_be_completed())
    }

    fn operate(&mut self, ctx: &mut AgentContext, dt: f32) {
        if ctx.world.ai_operate(ctx.character, self.component, dt) {
            self.completed = true;
        }
    }

    /// Move whatever blocks the allowed equip slots aside, then equip
    fn equip(&mut self, ctx: &mut AgentContext) {
        let character = ctx.character;
        let Some(allowed) = ctx
            .world
            .item(self.component)
            .and_then(|i| i.pickable.as_ref())
            .map(|p| p.allowed_slots.clone())
            .filter(|slots| !slots.is_empty())
        else {
            tracing::error!(item = ?self.component, "operate item: equip required but the item has no equip slots");
            return;
        };
        let slots: Vec<(usize, Option<EntityId>)> = match ctx.world.character(character) {
            Some(c) => (0..c.inventory.capacity())
                .filter(|&i| c.inventory.slot_type(i).is_equip_slot() && allowed.contains(&c.inventory.slot_type(i)))
                .map(|i| (i, c.inventory.item_at(i)))
                .collect(),
            None => return,
        };
        for (index, occupant) in slots {
            if let Some(blocking) = occupant {
                let pocketable = ctx
                    .world
                    .item(blocking)
                    .and_then(|i| i.pickable.as_ref())
                    .map(|p| p.allowed_slots.is_empty() || p.allowed_slots.contains(&SlotType::Any))
                    .unwrap_or(false);
                if !pocketable || !ctx.world.try_put_in_any_slot(character, blocking) {
                    ctx.world.drop_item(character, blocking);
                }
            }
            if ctx.world.try_put_in_slot(character, self.component, index) {
                tracing::debug!(item = ?self.component, slot = index, "operate item: equipped");
                break;
            }
        }
    }
}

impl Objective for OperateItem {
    fn debug_tag(&self) -> &'static str {
        "operate item"
    }

    fn priority(&self, _world: &World, _character: EntityId) -> f32 {
        if self.goto_failed() {
            return 0.0;
        }
        let order_priority = config().order_priority;
        if self.is_order {
            return order_priority;
        }
        let devotion = self.base.priority.min(MAX_DEVOTION);
        let value = (devotion + order_priority / 2.0) * self.base.priority_modifier;
        let max = (order_priority - 1.0).min(MAX_AUTONOMOUS_PRIORITY);
        value.clamp(0.0, max)
    }

    fn is_completed(&mut self, _ctx: &mut AgentContext) -> bool {
        self.completed && !self.base.is_loop
    }

    fn can_be_completed(&self) -> bool {
        if self.goto_failed() || self.missing_controller() {
            return false;
        }
        self.can_be_completed
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(
            other,
            AiObjective::OperateItem(other)
                if other.component == self.component || other.base.option == self.base.option
        )
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        if self.missing_controller() {
            let name = ctx.item_name(self.component);
            ctx.speak("DialogCantFindController", Some(&name), "cantfindcontroller", config().dialogue_cooldown);
            return;
        }
        let character = ctx.character;
        let target = self.controller.unwrap_or(self.component);
        let Some((selectable, pickable)) = ctx.world.item(target).map(|i| (i.selectable, i.pickable.is_some())) else {
            self.can_be_completed = false;
            return;
        };

        if selectable {
            if ctx.world.can_interact_with(character, target) {
                let already_selected = ctx.character().and_then(|c| c.selected_item) == Some(target);
                if !already_selected && ctx.world.same_hull(character, target) {
                    ctx.world.select_item(character, target);
                }
                self.sub.clear();
                self.operate(ctx, dt);
                return;
            }
            self.sub.replace_unless_duplicate(GoTo::to_item(target));
            self.sub.act(ctx, dt);
            return;
        }

        if !pickable {
            tracing::debug!(item = ?target, "operate item: target can't be selected or picked up");
            self.can_be_completed = false;
            return;
        }
        let carried = ctx.character().map(|c| c.inventory.contains(self.component)).unwrap_or(false);
        if !carried {
            self.sub.replace_unless_duplicate(GetItem::specific(self.component, true));
            self.sub.act(ctx, dt);
            return;
        }
        self.sub.clear();
        if self.require_equip && !ctx.world.has_equipped(character, self.component) {
            self.equip(ctx);
            return;
        }
        self.operate(ctx, dt);
    }
}

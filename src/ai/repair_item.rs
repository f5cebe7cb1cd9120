//! Repair one damaged item
//!
//! Only one character works on a repairable at a time; the one currently
//! working claims it as `current_fixer`. A better-skilled fixer takes over
//! from a worse one, and nobody keeps repairing an item that deteriorates
//! faster than it is being fixed.

use crate::ai::context::AgentContext;
use crate::ai::get_item::GetItem;
use crate::ai::go_to::GoTo;
use crate::ai::objective::{AiObjective, Objective, ObjectiveBase, SubObjective};
use crate::core::config::config;
use crate::core::error::{CrewError, Result};
use crate::core::types::{inverse_lerp, lerp, EntityId};
use crate::ecs::world::World;
use crate::world::item::Item;

/// Condition headroom so barely damaged items still score a little
const DAMAGE_OFFSET: f32 = 10.0;

#[derive(Debug)]
pub struct RepairItem {
    item: EntityId,
    sub: SubObjective,
    previous_condition: Option<f32>,
    abandon: bool,
    base: ObjectiveBase,
}

impl RepairItem {
    pub fn new(world: &World, item: EntityId) -> Result<Self> {
        if world.item(item).is_none() {
            return Err(CrewError::ItemNotFound(item));
        }
        Ok(Self {
            item,
            sub: SubObjective::default(),
            previous_condition: None,
            abandon: false,
            base: ObjectiveBase::default(),
        })
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.base.priority = priority;
        self
    }

    pub fn item(&self) -> EntityId {
        self.item
    }

    /// Average degree of success over every repairable on the item
    fn success_chance(item: &Item, world: &World, character: EntityId) -> f32 {
        let Some(c) = world.character(character) else {
            return 0.0;
        };
        if item.repairables.is_empty() {
            return 0.0;
        }
        let sum: f32 = item.repairables.iter().map(|r| r.degree_of_success(c)).sum();
        sum / item.repairables.len() as f32
    }

    /// Someone other than `character` who is alive and claims a repairable
    fn other_fixers(item: &Item, world: &World, character: EntityId) -> Vec<EntityId> {
        item.repairables
            .iter()
            .filter_map(|r| r.current_fixer)
            .filter(|f| *f != character)
            .filter(|f| world.character(*f).map(|c| !c.is_dead).unwrap_or(false))
            .collect()
    }

    fn set_fixer(&self, world: &mut World, character: EntityId, claim: bool) {
        let Some(item) = world.item_mut(self.item) else {
            return;
        };
        for repairable in &mut item.repairables {
            if claim {
                repairable.current_fixer = Some(character);
            } else if repairable.current_fixer == Some(character) {
                repairable.current_fixer = None;
            }
        }
    }

    fn give_up(&mut self, ctx: &mut AgentContext) {
        self.abandon = true;
        self.set_fixer(ctx.world, ctx.character, false);
        if let Some(c) = ctx.world.character_mut(ctx.character) {
            if c.selected_item == Some(self.item) {
                c.selected_item = None;
            }
        }
        self.sub.clear();
        tracing::debug!(item = ?self.item, "repair item: abandoned");
    }

    fn sub_failed(&self) -> bool {
        matches!(
            self.sub.get(),
            Some(sub @ (AiObjective::GoTo(_) | AiObjective::GetItem(_))) if !sub.can_be_completed()
        )
    }

    fn heading_to_item(&self) -> bool {
        matches!(self.sub.get(), Some(AiObjective::GoTo(goto)) if goto.target() == self.item)
    }

    /// Aim a carried tool that satisfies a requirement at the item
    fn use_tool(&self, ctx: &mut AgentContext, dt: f32) {
        let tool = {
            let (Some(c), Some(item)) = (ctx.character(), ctx.world.item(self.item)) else {
                return;
            };
            c.inventory.items().find(|id| {
                ctx.world
                    .item(*id)
                    .filter(|tool| tool.repair_tool.is_some())
                    .map(|tool| {
                        item.repairables
                            .iter()
                            .flat_map(|r| r.required_items.iter())
                            .any(|req| req.matches(tool))
                    })
                    .unwrap_or(false)
            })
        };
        if let Some(tool) = tool {
            ctx.world.use_repair_tool(tool, self.item, dt);
        }
    }
}

impl Objective for RepairItem {
    fn debug_tag(&self) -> &'static str {
        "repair item"
    }

    fn priority(&self, world: &World, character: EntityId) -> f32 {
        let (Some(item), Some(c)) = (world.item(self.item), world.character(character)) else {
            return 0.0;
        };
        if item.repairables.is_empty() || !Self::other_fixers(item, world, character).is_empty() {
            return 0.0;
        }
        let Some((position, _)) = world.item_location(self.item) else {
            return 0.0;
        };
        let cfg = config();

        let offset = position - c.position;
        let distance = offset.x.abs() + offset.y.abs() * 2.0;
        let distance_factor = lerp(1.0, 0.5, inverse_lerp(0.0, cfg.repair_distance_range, distance));
        let damage_factor = lerp(1.0, 0.0, ((item.condition + DAMAGE_OFFSET) / item.max_condition).clamp(0.0, 1.0));
        let success_factor = Self::success_chance(item, world, character);
        let selected = c.selected_item == Some(self.item);
        let base_level = (self.base.priority + if selected { cfg.selection_bonus } else { 0.0 }).max(1.0);

        (base_level * distance_factor * damage_factor * success_factor).clamp(0.0, 100.0)
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        let Some(item) = ctx.world.item(self.item) else {
            self.abandon = true;
            return false;
        };
        if !item.is_full_condition() {
            return false;
        }
        let name = item.name.clone();
        self.set_fixer(ctx.world, ctx.character, false);
        ctx.speak("DialogItemRepaired", Some(&name), "itemrepaired", config().repair_dialogue_cooldown);
        true
    }

    fn can_be_completed(&self) -> bool {
        !self.abandon
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        matches!(other, AiObjective::RepairItem(other) if other.item == self.item)
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        let character = ctx.character;
        let name = ctx.item_name(self.item);
        let cooldown = config().repair_dialogue_cooldown;

        if self.sub_failed() {
            ctx.speak("DialogCannotRepair", Some(&name), "cannotrepair", cooldown);
            self.give_up(ctx);
            return;
        }
        let Some(item) = ctx.world.item(self.item) else {
            self.give_up(ctx);
            return;
        };

        let missing = item
            .repairables
            .iter()
            .flat_map(|r| ctx.world.missing_requirements(character, r))
            .next();
        if let Some(requirement) = missing {
            self.sub
                .replace_unless_duplicate(GetItem::matching(requirement.identifiers.as_slice(), true));
            self.sub.act(ctx, dt);
            return;
        }

        if !ctx.world.can_interact_with(character, self.item) {
            if !self.heading_to_item() {
                self.previous_condition = None;
                self.sub.set(GoTo::to_item(self.item));
            }
            self.sub.act(ctx, dt);
            return;
        }

        self.use_tool(ctx, dt);

        let Some(item) = ctx.world.item(self.item) else {
            self.give_up(ctx);
            return;
        };
        let condition = item.condition;
        let my_success = Self::success_chance(item, ctx.world, character);
        let outclassed = Self::other_fixers(item, ctx.world, character)
            .into_iter()
            .any(|fixer| Self::success_chance(item, ctx.world, fixer) > my_success);

        if outclassed {
            tracing::debug!(item = ?self.item, "repair item: a better fixer is on it");
            self.give_up(ctx);
            return;
        }

        ctx.world.select_item(character, self.item);
        if self.previous_condition.map(|prev| condition < prev).unwrap_or(false) {
            ctx.speak("DialogRepairFailed", Some(&name), "repairfailed", cooldown);
            self.give_up(ctx);
            return;
        }
        self.previous_condition = Some(condition);
        self.set_fixer(ctx.world, character, true);
        self.sub.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{HullId, LevelType, Team, Vec2};
    use crate::world::campaign::Campaign;
    use crate::world::character::Character;
    use crate::world::inventory::SlotType;
    use crate::world::item::Repairable;

    fn world() -> World {
        World::new(LevelType::LocationConnection, Campaign::default())
    }

    fn run(objective: &mut RepairItem, world: &mut World, character: EntityId, ticks: usize) -> bool {
        for _ in 0..ticks {
            let mut ctx = AgentContext::new(world, character);
            if objective.is_completed(&mut ctx) {
                return true;
            }
            if !objective.can_be_completed() {
                return false;
            }
            objective.act(&mut ctx, 1.0);
            world.update(1.0);
        }
        false
    }

    #[test]
    fn test_priority_zero_without_repairables() {
        let mut world = world();
        let crate_item = world.spawn_item(Item::new("crate", "Crate", Vec2::ZERO, None).with_condition(10.0));
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));

        let objective = RepairItem::new(&world, crate_item).unwrap();
        assert_eq!(objective.priority(&world, crew), 0.0);
    }

    #[test]
    fn test_priority_combines_damage_and_selection() {
        let mut world = world();
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::ZERO, None)
                .with_condition(50.0)
                .with_repairable(Repairable::new(10.0)),
        );
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));

        let idle = RepairItem::new(&world, pump).unwrap();
        assert!((idle.priority(&world, crew) - 0.4).abs() < 1e-4);

        world.select_item(crew, pump);
        let ordered = RepairItem::new(&world, pump).unwrap().with_priority(20.0);
        assert!((ordered.priority(&world, crew) - 28.0).abs() < 1e-3);
    }

    #[test]
    fn test_priority_zero_when_someone_else_fixes_it() {
        let mut world = world();
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));
        let rival = world.spawn_character(Character::new("Smith", Team::Crew));
        let mut repairable = Repairable::new(10.0);
        repairable.current_fixer = Some(rival);
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::ZERO, None)
                .with_condition(20.0)
                .with_repairable(repairable),
        );

        let objective = RepairItem::new(&world, pump).unwrap();
        assert_eq!(objective.priority(&world, crew), 0.0);

        // A dead fixer doesn't count
        world.character_mut(rival).unwrap().is_dead = true;
        assert!(objective.priority(&world, crew) > 0.0);
    }

    #[test]
    fn test_fetches_tool_walks_over_and_repairs() {
        let mut world = world();
        let hull = Some(HullId(1));
        let crew = world.spawn_character(Character::new("Jones", Team::Crew).at(Vec2::ZERO, hull));
        world.spawn_item(
            Item::new("wrench", "Wrench", Vec2::new(50.0, 0.0), hull).with_pickable(&[SlotType::RightHand]),
        );
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::new(200.0, 0.0), hull)
                .with_condition(40.0)
                .with_repairable(Repairable::new(20.0).with_required_item(&["wrench"])),
        );

        let mut objective = RepairItem::new(&world, pump).unwrap();
        assert!(run(&mut objective, &mut world, crew, 20));

        assert!(world.item(pump).unwrap().is_full_condition());
        assert_eq!(world.item(pump).unwrap().repairables[0].current_fixer, None);
        assert_eq!(world.character(crew).unwrap().speech.count("DialogItemRepaired"), 1);
    }

    #[test]
    fn test_abandons_when_decay_outpaces_repair() {
        let mut world = world();
        let crew = world.spawn_character(Character::new("Jones", Team::Crew));
        let mut leaking = Item::new("pump", "Pump", Vec2::ZERO, None)
            .with_condition(80.0)
            .with_repairable(Repairable::new(5.0));
        leaking.deterioration_rate = 20.0;
        let pump = world.spawn_item(leaking);

        let mut objective = RepairItem::new(&world, pump).unwrap();
        assert!(!run(&mut objective, &mut world, crew, 5));
        assert!(!objective.can_be_completed());
        assert_eq!(world.item(pump).unwrap().repairables[0].current_fixer, None);
        assert_eq!(world.character(crew).unwrap().speech.count("DialogRepairFailed"), 1);
    }

    #[test]
    fn test_yields_to_better_fixer() {
        let mut world = world();
        let novice = world.spawn_character(Character::new("Jones", Team::Crew).with_skill("mechanical", 50.0));
        let expert = world.spawn_character(Character::new("Smith", Team::Crew).with_skill("mechanical", 100.0));
        let mut repairable = Repairable::new(5.0).with_required_skill("mechanical", 50.0);
        repairable.current_fixer = Some(expert);
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::ZERO, None)
                .with_condition(30.0)
                .with_repairable(repairable),
        );

        let mut objective = RepairItem::new(&world, pump).unwrap();
        objective.act(&mut AgentContext::new(&mut world, novice), 1.0);

        assert!(!objective.can_be_completed());
        assert_eq!(world.item(pump).unwrap().repairables[0].current_fixer, Some(expert));
    }

    #[test]
    fn test_claim_lapses_when_fixer_leaves() {
        let mut world = world();
        let hull = Some(HullId(1));
        let fixer = world.spawn_character(Character::new("Jones", Team::Crew).at(Vec2::ZERO, hull));
        let rival = world.spawn_character(Character::new("Smith", Team::Crew).at(Vec2::ZERO, hull));
        let pump = world.spawn_item(
            Item::new("pump", "Pump", Vec2::new(50.0, 0.0), hull)
                .with_condition(20.0)
                .with_repairable(Repairable::new(5.0)),
        );

        let mut objective = RepairItem::new(&world, pump).unwrap();
        objective.act(&mut AgentContext::new(&mut world, fixer), 1.0);
        assert_eq!(world.item(pump).unwrap().repairables[0].current_fixer, Some(fixer));

        let c = world.character_mut(fixer).unwrap();
        c.position = Vec2::new(5000.0, 0.0);
        c.hull = Some(HullId(9));
        for _ in 0..5 {
            world.update(1.0);
        }

        assert_eq!(world.item(pump).unwrap().condition, 20.0);
        assert_eq!(world.item(pump).unwrap().repairables[0].current_fixer, None);
        let rival_objective = RepairItem::new(&world, pump).unwrap();
        assert!(rival_objective.priority(&world, rival) > 0.0);
    }

    #[test]
    fn test_same_item_is_duplicate() {
        let mut world = world();
        let pump = world.spawn_item(Item::new("pump", "Pump", Vec2::ZERO, None));
        let valve = world.spawn_item(Item::new("valve", "Valve", Vec2::ZERO, None));

        let a = RepairItem::new(&world, pump).unwrap();
        assert!(a.is_duplicate(&RepairItem::new(&world, pump).unwrap().into()));
        assert!(!a.is_duplicate(&RepairItem::new(&world, valve).unwrap().into()));
    }
}

//! The objective contract and the closed set of objective kinds
//!
//! Every objective is a small state machine polled once per tick. The
//! scheduler asks for a priority, acts the winner, and drops objectives that
//! are completed or can no longer be completed. An objective may delegate
//! to at most one sub-objective, which it owns outright.

use crate::ai::contain_item::ContainItem;
use crate::ai::context::AgentContext;
use crate::ai::find_diving_gear::FindDivingGear;
use crate::ai::get_item::GetItem;
use crate::ai::go_to::GoTo;
use crate::ai::operate_item::OperateItem;
use crate::ai::repair_item::RepairItem;
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Capability interface shared by all objective kinds
pub trait Objective {
    fn debug_tag(&self) -> &'static str;

    /// Urgency in [0, 100], recomputed every poll
    fn priority(&self, world: &World, character: EntityId) -> f32;

    /// May speak a one-shot line as a side effect
    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool;

    /// False once no further progress is possible
    fn can_be_completed(&self) -> bool;

    fn is_duplicate(&self, other: &AiObjective) -> bool;

    /// Advance one tick
    fn act(&mut self, ctx: &mut AgentContext, dt: f32);
}

/// Settings every objective carries
#[derive(Debug, Clone)]
pub struct ObjectiveBase {
    /// Intrinsic priority before per-objective scoring
    pub priority: f32,
    pub priority_modifier: f32,
    /// Free-form option string, e.g. the order option that spawned this
    pub option: String,
    /// Loop objectives (standing orders) never report completion
    pub is_loop: bool,
}

impl Default for ObjectiveBase {
    fn default() -> Self {
        Self {
            priority: 0.0,
            priority_modifier: 1.0,
            option: String::new(),
            is_loop: false,
        }
    }
}

#[derive(Debug)]
pub enum AiObjective {
    FindDivingGear(FindDivingGear),
    OperateItem(OperateItem),
    RepairItem(RepairItem),
    GoTo(GoTo),
    GetItem(GetItem),
    ContainItem(ContainItem),
}

macro_rules! dispatch {
    ($self:expr, $o:ident => $body:expr) => {
        match $self {
            AiObjective::FindDivingGear($o) => $body,
            AiObjective::OperateItem($o) => $body,
            AiObjective::RepairItem($o) => $body,
            AiObjective::GoTo($o) => $body,
            AiObjective::GetItem($o) => $body,
            AiObjective::ContainItem($o) => $body,
        }
    };
}

impl Objective for AiObjective {
    fn debug_tag(&self) -> &'static str {
        dispatch!(self, o => o.debug_tag())
    }

    fn priority(&self, world: &World, character: EntityId) -> f32 {
        dispatch!(self, o => o.priority(world, character))
    }

    fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        dispatch!(self, o => o.is_completed(ctx))
    }

    fn can_be_completed(&self) -> bool {
        dispatch!(self, o => o.can_be_completed())
    }

    fn is_duplicate(&self, other: &AiObjective) -> bool {
        dispatch!(self, o => o.is_duplicate(other))
    }

    fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        dispatch!(self, o => o.act(ctx, dt))
    }
}

impl From<FindDivingGear> for AiObjective {
    fn from(o: FindDivingGear) -> Self {
        AiObjective::FindDivingGear(o)
    }
}

impl From<OperateItem> for AiObjective {
    fn from(o: OperateItem) -> Self {
        AiObjective::OperateItem(o)
    }
}

impl From<RepairItem> for AiObjective {
    fn from(o: RepairItem) -> Self {
        AiObjective::RepairItem(o)
    }
}

impl From<GoTo> for AiObjective {
    fn from(o: GoTo) -> Self {
        AiObjective::GoTo(o)
    }
}

impl From<GetItem> for AiObjective {
    fn from(o: GetItem) -> Self {
        AiObjective::GetItem(o)
    }
}

impl From<ContainItem> for AiObjective {
    fn from(o: ContainItem) -> Self {
        AiObjective::ContainItem(o)
    }
}

/// Slot for the single sub-objective an objective may own.
///
/// Setting it drops whatever was there before.
#[derive(Debug, Default)]
pub struct SubObjective(Option<Box<AiObjective>>);

impl SubObjective {
    pub fn get(&self) -> Option<&AiObjective> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn set(&mut self, objective: impl Into<AiObjective>) {
        self.0 = Some(Box::new(objective.into()));
    }

    /// Install the objective unless an equivalent one is already running
    pub fn replace_unless_duplicate(&mut self, objective: impl Into<AiObjective>) {
        let objective = objective.into();
        if self.get().map(|current| current.is_duplicate(&objective)).unwrap_or(false) {
            return;
        }
        self.0 = Some(Box::new(objective));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// An empty slot never blocks completion
    pub fn can_be_completed(&self) -> bool {
        self.get().map(|o| o.can_be_completed()).unwrap_or(true)
    }

    pub fn is_completed(&mut self, ctx: &mut AgentContext) -> bool {
        self.0.as_mut().map(|o| o.is_completed(ctx)).unwrap_or(false)
    }

    /// Act the sub-objective this tick unless it's already done
    pub fn act(&mut self, ctx: &mut AgentContext, dt: f32) {
        if let Some(objective) = self.0.as_mut() {
            if !objective.is_completed(ctx) {
                objective.act(ctx, dt);
            }
        }
    }
}

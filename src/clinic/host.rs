//! What the clinic needs from the rest of the game

use ahash::AHashSet;

use crate::core::types::{CrewId, EntityId, LevelType, Team};
use crate::ecs::world::World;
use crate::health::CharacterHealth;
use crate::world::campaign::Location;

/// Campaign wallet, crew roster and combat state, as seen by the clinic.
///
/// Crew members are resolved by stable id on every call; the clinic never
/// holds on to a live character.
pub trait ClinicHost {
    fn money(&self) -> i32;
    fn deduct_money(&mut self, amount: i32);
    fn current_location(&self) -> Option<&Location>;
    fn crew_ids(&self) -> Vec<CrewId>;
    fn crew_health(&self, id: CrewId) -> Option<&CharacterHealth>;
    fn crew_health_mut(&mut self, id: CrewId) -> Option<&mut CharacterHealth>;
    /// An outpost resident is currently fighting a living crew member
    fn is_outpost_in_combat(&self) -> bool;
}

impl ClinicHost for World {
    fn money(&self) -> i32 {
        self.campaign.money
    }

    fn deduct_money(&mut self, amount: i32) {
        self.campaign.money = self.campaign.money.saturating_sub(amount);
    }

    fn current_location(&self) -> Option<&Location> {
        self.campaign.current_location.as_ref()
    }

    fn crew_ids(&self) -> Vec<CrewId> {
        self.crew().filter_map(|c| c.info_id).collect()
    }

    fn crew_health(&self, id: CrewId) -> Option<&CharacterHealth> {
        self.find_crew(id).map(|c| &c.health)
    }

    fn crew_health_mut(&mut self, id: CrewId) -> Option<&mut CharacterHealth> {
        self.find_crew_mut(id).map(|c| &mut c.health)
    }

    fn is_outpost_in_combat(&self) -> bool {
        if self.level_type != LevelType::Outpost {
            return false;
        }

        let crew: AHashSet<EntityId> = self.crew().filter(|c| !c.is_dead).map(|c| c.id).collect();

        self.characters()
            .filter(|npc| npc.team == Team::FriendlyNpc && !npc.is_dead && !npc.is_instigator)
            .any(|npc| npc.combat_target.map(|t| crew.contains(&t)).unwrap_or(false))
    }
}

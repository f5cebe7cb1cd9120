//! Per-tick context handed to an objective

use crate::core::types::{EntityId, Seconds};
use crate::ecs::world::World;
use crate::world::character::Character;

/// The world plus the character an objective acts for
pub struct AgentContext<'a> {
    pub world: &'a mut World,
    pub character: EntityId,
}

impl<'a> AgentContext<'a> {
    pub fn new(world: &'a mut World, character: EntityId) -> Self {
        Self { world, character }
    }

    pub fn character(&self) -> Option<&Character> {
        self.world.character(self.character)
    }

    /// Say a rate-limited line as this character
    pub fn speak(&mut self, key: &'static str, subject: Option<&str>, cooldown_tag: &str, cooldown: Seconds) -> bool {
        let now = self.world.time;
        self.world
            .character_mut(self.character)
            .map(|c| c.speak(key, subject, cooldown_tag, cooldown, now))
            .unwrap_or(false)
    }

    pub fn item_name(&self, item: EntityId) -> String {
        self.world.item(item).map(|i| i.name.clone()).unwrap_or_default()
    }
}

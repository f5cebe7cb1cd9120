//! Characters: crew, outpost residents and their spoken lines

use ahash::AHashMap;

use crate::core::types::{CrewId, EntityId, HullId, Seconds, Team, Vec2};
use crate::health::CharacterHealth;
use crate::world::inventory::Inventory;

/// A line a character said out loud
#[derive(Debug, Clone, PartialEq)]
pub struct SpokenLine {
    /// Dialogue key, resolved to text by the UI layer
    pub key: &'static str,
    /// Name substituted into the line, if any
    pub subject: Option<String>,
    pub time: Seconds,
}

/// Spoken lines plus per-tag cooldowns
#[derive(Debug, Clone, Default)]
pub struct SpeechLog {
    lines: Vec<SpokenLine>,
    last_spoken: AHashMap<String, Seconds>,
}

impl SpeechLog {
    pub fn lines(&self) -> &[SpokenLine] {
        &self.lines
    }

    pub fn count(&self, key: &str) -> usize {
        self.lines.iter().filter(|l| l.key == key).count()
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    pub id: EntityId,
    /// Stable crew identity; only player crew carry one
    pub info_id: Option<CrewId>,
    pub name: String,
    pub team: Team,
    pub position: Vec2,
    pub hull: Option<HullId>,
    /// 0 = suffocating, 100 = fine
    pub oxygen_available: f32,
    pub inventory: Inventory,
    pub health: CharacterHealth,
    pub skills: AHashMap<String, f32>,
    pub selected_item: Option<EntityId>,
    pub is_dead: bool,
    /// Started the fight; outposts don't refuse service over instigators
    pub is_instigator: bool,
    /// Enemy of the character's current combat objective
    pub combat_target: Option<EntityId>,
    pub speech: SpeechLog,
}

impl Character {
    pub fn new(name: &str, team: Team) -> Self {
        Self {
            id: EntityId::new(),
            info_id: None,
            name: name.to_string(),
            team,
            position: Vec2::ZERO,
            hull: None,
            oxygen_available: 100.0,
            inventory: Inventory::humanoid(),
            health: CharacterHealth::new(),
            skills: AHashMap::new(),
            selected_item: None,
            is_dead: false,
            is_instigator: false,
            combat_target: None,
            speech: SpeechLog::default(),
        }
    }

    pub fn with_crew_id(mut self, id: CrewId) -> Self {
        self.info_id = Some(id);
        self
    }

    pub fn at(mut self, position: Vec2, hull: Option<HullId>) -> Self {
        self.position = position;
        self.hull = hull;
        self
    }

    pub fn with_skill(mut self, skill: &str, level: f32) -> Self {
        self.skills.insert(skill.to_string(), level);
        self
    }

    pub fn skill_level(&self, skill: &str) -> f32 {
        self.skills.get(skill).copied().unwrap_or(0.0)
    }

    pub fn is_crew(&self) -> bool {
        self.team == Team::Crew && self.info_id.is_some()
    }

    /// Say a line unless the same cooldown tag spoke within `cooldown` seconds
    pub fn speak(
        &mut self,
        key: &'static str,
        subject: Option<&str>,
        cooldown_tag: &str,
        cooldown: Seconds,
        now: Seconds,
    ) -> bool {
        if let Some(last) = self.speech.last_spoken.get(cooldown_tag) {
            if now - last < cooldown {
                return false;
            }
        }
        self.speech.last_spoken.insert(cooldown_tag.to_string(), now);
        self.speech.lines.push(SpokenLine {
            key,
            subject: subject.map(str::to_string),
            time: now,
        });
        tracing::info!(character = %self.name, line = key, subject = ?subject, "spoke");
        true
    }
}

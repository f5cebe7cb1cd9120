//! Affliction definitions and the registry that resolves them
//!
//! Definitions are loaded once from TOML. Identifiers are interned with
//! ASCII case folding, the same folding live afflictions and clinic records
//! use when they compare identifiers, so every later lookup is a single
//! hash lookup.

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::{CrewError, Result};

const BUILTIN_AFFLICTIONS: &str = include_str!("../../data/afflictions.toml");

/// Static definition of an affliction type
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AfflictionPrefab {
    pub identifier: String,
    pub max_strength: f32,
    #[serde(default)]
    pub healable_in_medical_clinic: bool,
    #[serde(default)]
    pub show_icon_to_others_threshold: f32,
    #[serde(default)]
    pub show_in_health_scanner_threshold: f32,
    #[serde(default)]
    pub base_heal_cost: u32,
    #[serde(default)]
    pub heal_cost_multiplier: f32,
}

impl AfflictionPrefab {
    /// Strength an affliction must exceed before it is shown as needing treatment
    pub fn show_threshold(&self) -> f32 {
        self.show_icon_to_others_threshold
            .min(self.show_in_health_scanner_threshold)
            .max(0.0)
    }

    /// Undiscounted heal price for the given strength
    pub fn heal_price(&self, strength: f32) -> i32 {
        (self.base_heal_cost as f32 + self.heal_cost_multiplier * strength) as i32
    }
}

/// Index of a prefab inside its registry, valid for the registry's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefabHandle(u32);

#[derive(Deserialize)]
struct AfflictionFile {
    #[serde(default)]
    affliction: Vec<AfflictionPrefab>,
}

/// Table of all known affliction definitions
#[derive(Debug, Clone, Default)]
pub struct AfflictionRegistry {
    prefabs: Vec<Arc<AfflictionPrefab>>,
    by_identifier: AHashMap<String, PrefabHandle>,
}

impl AfflictionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from the definitions shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_AFFLICTIONS)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: AfflictionFile = toml::from_str(content)?;
        let mut registry = Self::new();
        for prefab in file.affliction {
            registry.register(prefab)?;
        }
        Ok(registry)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Add a definition. Identifiers must be unique ignoring case.
    pub fn register(&mut self, prefab: AfflictionPrefab) -> Result<PrefabHandle> {
        let key = prefab.identifier.to_ascii_lowercase();
        if key.is_empty() {
            return Err(CrewError::InvalidConfig("affliction identifier is empty".into()));
        }
        if self.by_identifier.contains_key(&key) {
            return Err(CrewError::InvalidConfig(format!(
                "duplicate affliction identifier '{}'",
                prefab.identifier
            )));
        }
        if prefab.max_strength < 0.0 {
            return Err(CrewError::InvalidConfig(format!(
                "affliction '{}' has negative max_strength",
                prefab.identifier
            )));
        }

        let handle = PrefabHandle(self.prefabs.len() as u32);
        self.prefabs.push(Arc::new(prefab));
        self.by_identifier.insert(key, handle);
        Ok(handle)
    }

    /// Resolve an identifier, ignoring case
    pub fn handle(&self, identifier: &str) -> Option<PrefabHandle> {
        if let Some(handle) = self.by_identifier.get(identifier) {
            return Some(*handle);
        }
        self.by_identifier.get(&identifier.to_ascii_lowercase()).copied()
    }

    pub fn resolve(&self, handle: PrefabHandle) -> &Arc<AfflictionPrefab> {
        &self.prefabs[handle.0 as usize]
    }

    pub fn get(&self, identifier: &str) -> Option<&Arc<AfflictionPrefab>> {
        self.handle(identifier).map(|h| self.resolve(h))
    }

    /// Like [`get`](Self::get) but an unknown identifier is an error
    pub fn require(&self, identifier: &str) -> Result<&Arc<AfflictionPrefab>> {
        self.get(identifier)
            .ok_or_else(|| CrewError::UnknownAffliction(identifier.to_string()))
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

//! Simulation configuration with documented constants
//!
//! Tunables for the crew AI and the clinic live here so they can be
//! overridden from a TOML file instead of being scattered as literals.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{CrewError, Result};

/// Configuration for crew AI and clinic systems
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === OBJECTIVES ===
    /// Priority of an objective given as a direct order
    ///
    /// Autonomous objectives are capped below this so an order always wins.
    pub order_priority: f32,

    /// Distance (world units) over which repair priority falls off
    ///
    /// Vertical distance counts double before being compared to this.
    pub repair_distance_range: f32,

    /// Priority bonus for repairing the item the character already has selected
    pub selection_bonus: f32,

    /// Cooldown for "go get gear" / "can't find controller" lines (seconds)
    pub dialogue_cooldown: f64,

    /// Cooldown for repair-related lines (seconds)
    pub repair_dialogue_cooldown: f64,

    // === MOVEMENT ===
    /// Straight-line walking speed (world units per second)
    pub walk_speed: f32,

    /// Interact distance for items that don't define their own
    pub default_interact_distance: f32,

    // === CLINIC ===
    /// Maximum number of crew members carried in one pending-heal list
    pub max_crew_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            order_priority: 70.0,
            repair_distance_range: 10000.0,
            selection_bonus: 50.0,
            dialogue_cooldown: 30.0,
            repair_dialogue_cooldown: 10.0,
            walk_speed: 100.0,
            default_interact_distance: 120.0,
            max_crew_size: 16,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.order_priority <= 1.0 || self.order_priority > 100.0 {
            return Err(CrewError::InvalidConfig(format!(
                "order_priority ({}) must be in (1, 100]",
                self.order_priority
            )));
        }

        if self.repair_distance_range <= 0.0 {
            return Err(CrewError::InvalidConfig(
                "repair_distance_range must be positive".into(),
            ));
        }

        if self.walk_speed <= 0.0 || self.default_interact_distance <= 0.0 {
            return Err(CrewError::InvalidConfig(
                "walk_speed and default_interact_distance must be positive".into(),
            ));
        }

        if self.max_crew_size == 0 {
            return Err(CrewError::InvalidConfig("max_crew_size must be at least 1".into()));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str("walk_speed = 250.0").unwrap();
        assert_eq!(config.walk_speed, 250.0);
        assert_eq!(config.order_priority, 70.0);
        assert_eq!(config.max_crew_size, 16);
    }

    #[test]
    fn test_rejects_zero_crew_size() {
        let result = SimulationConfig::from_toml_str("max_crew_size = 0");
        assert!(matches!(result, Err(CrewError::InvalidConfig(_))));
    }
}

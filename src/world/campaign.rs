//! Campaign state the clinic trades against: money and current location

use serde::{Deserialize, Serialize};

/// A location on the campaign map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub has_outpost: bool,
    /// Multiplier applied to medical prices here
    pub heal_price_multiplier: f32,
}

impl Location {
    pub fn outpost(name: &str, heal_price_multiplier: f32) -> Self {
        Self {
            name: name.to_string(),
            has_outpost: true,
            heal_price_multiplier,
        }
    }

    pub fn wilderness(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_outpost: false,
            heal_price_multiplier: 1.0,
        }
    }

    pub fn adjusted_heal_cost(&self, price: i32) -> i32 {
        (price as f32 * self.heal_price_multiplier).round() as i32
    }
}

/// Shared campaign wallet and map position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    pub money: i32,
    pub current_location: Option<Location>,
}

impl Campaign {
    pub fn new(money: i32, current_location: Option<Location>) -> Self {
        Self { money, current_location }
    }
}

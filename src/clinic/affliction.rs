//! Priced, network-transmissible affliction records
//!
//! A [`NetAffliction`] is a snapshot of one affliction type on one crew
//! member: identifier, rounded strength and the price of healing it. The
//! definition behind the identifier is resolved lazily and cached on the
//! record, so repeated severity checks don't go back to the registry.

use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::sync::Arc;

use crate::health::{Affliction, AfflictionPrefab, AfflictionRegistry};

/// Share of max strength at or below which an affliction is `Low`
const LOW_SEVERITY_RATIO: f32 = 0.1;
/// Share of max strength at or above which an affliction is `High`
const HIGH_SEVERITY_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AfflictionSeverity {
    Low,
    Medium,
    High,
}

impl AfflictionSeverity {
    /// Classify a strength against the definition's maximum.
    ///
    /// A missing definition (max of zero) is `Low`.
    pub fn classify(strength: f32, max_strength: f32) -> Self {
        if max_strength <= 0.0 {
            return AfflictionSeverity::Low;
        }
        let normalized = strength / max_strength;
        if normalized <= LOW_SEVERITY_RATIO {
            AfflictionSeverity::Low
        } else if normalized < HIGH_SEVERITY_RATIO {
            AfflictionSeverity::Medium
        } else {
            AfflictionSeverity::High
        }
    }
}

/// Whether the clinic treats this affliction: the definition must allow it
/// and the strength must be above the point where it starts showing up.
pub fn is_healable(affliction: &Affliction) -> bool {
    affliction.prefab.healable_in_medical_clinic && affliction.strength() > affliction.prefab.show_threshold()
}

/// Clamp a price into the wire range; anything too large becomes unpayable
pub fn clamp_price(price: i32) -> u16 {
    u16::try_from(price.max(0)).unwrap_or(u16::MAX)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetAffliction {
    pub identifier: String,
    pub strength: u16,
    pub price: u16,
    #[serde(skip)]
    prefab: OnceCell<Arc<AfflictionPrefab>>,
}

impl PartialEq for NetAffliction {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.strength == other.strength && self.price == other.price
    }
}

impl NetAffliction {
    pub fn new(identifier: &str, strength: u16, price: u16) -> Self {
        Self {
            identifier: identifier.to_string(),
            strength,
            price,
            prefab: OnceCell::new(),
        }
    }

    /// Empty record for a definition (zero strength and price)
    pub fn from_prefab(prefab: Arc<AfflictionPrefab>) -> Self {
        let record = Self::new(&prefab.identifier, 0, 0);
        let _ = record.prefab.set(prefab);
        record
    }

    /// Snapshot a live affliction: strength rounded up, price from the
    /// definition, then run through the location's price adjustment.
    pub fn from_affliction(affliction: &Affliction, adjust_price: impl Fn(i32) -> i32) -> Self {
        let prefab = &affliction.prefab;
        let strength = clamp_price(affliction.strength().ceil() as i32);
        let base = (prefab.base_heal_cost as f32 + strength as f32 * prefab.heal_cost_multiplier) as i32;
        let record = Self::new(&prefab.identifier, strength, clamp_price(adjust_price(base)));
        let _ = record.prefab.set(prefab.clone());
        record
    }

    /// Definition behind the identifier, looked up once and cached
    pub fn prefab(&self, registry: &AfflictionRegistry) -> Option<Arc<AfflictionPrefab>> {
        if let Some(cached) = self.prefab.get() {
            return Some(cached.clone());
        }
        let prefab = registry.get(&self.identifier)?.clone();
        let _ = self.prefab.set(prefab.clone());
        Some(prefab)
    }

    pub fn severity(&self, registry: &AfflictionRegistry) -> AfflictionSeverity {
        match self.prefab(registry) {
            Some(prefab) => AfflictionSeverity::classify(self.strength as f32, prefab.max_strength),
            None => AfflictionSeverity::Low,
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.identifier.eq_ignore_ascii_case(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AfflictionRegistry {
        AfflictionRegistry::builtin().unwrap()
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(AfflictionSeverity::classify(10.0, 100.0), AfflictionSeverity::Low);
        assert_eq!(AfflictionSeverity::classify(10.5, 100.0), AfflictionSeverity::Medium);
        assert_eq!(AfflictionSeverity::classify(49.9, 100.0), AfflictionSeverity::Medium);
        assert_eq!(AfflictionSeverity::classify(50.0, 100.0), AfflictionSeverity::High);
        assert_eq!(AfflictionSeverity::classify(100.0, 100.0), AfflictionSeverity::High);
    }

    #[test]
    fn test_missing_definition_is_low() {
        assert_eq!(AfflictionSeverity::classify(80.0, 0.0), AfflictionSeverity::Low);
        let unknown = NetAffliction::new("husk", 150, 10);
        assert_eq!(unknown.severity(&registry()), AfflictionSeverity::Low);
    }

    #[test]
    fn test_record_severity_uses_definition() {
        // burn max strength is 200
        let registry = registry();
        assert_eq!(NetAffliction::new("Burn", 20, 10).severity(&registry), AfflictionSeverity::Low);
        assert_eq!(NetAffliction::new("burn", 60, 10).severity(&registry), AfflictionSeverity::Medium);
        assert_eq!(NetAffliction::new("burn", 100, 10).severity(&registry), AfflictionSeverity::High);
    }

    #[test]
    fn test_from_affliction_rounds_up_and_prices() {
        let registry = registry();
        let burn = registry.require("burn").unwrap().clone();
        let live = Affliction::new(burn, 9.2);

        let record = NetAffliction::from_affliction(&live, |p| p);
        assert_eq!(record.strength, 10);
        // 15 base + 10 * 1.0
        assert_eq!(record.price, 25);

        let doubled = NetAffliction::from_affliction(&live, |p| p * 2);
        assert_eq!(doubled.price, 50);
    }

    #[test]
    fn test_unpayable_price_saturates() {
        let registry = registry();
        let burn = registry.require("burn").unwrap().clone();
        let record = NetAffliction::from_affliction(&Affliction::new(burn, 5.0), |_| i32::MAX);
        assert_eq!(record.price, u16::MAX);
    }

    #[test]
    fn test_is_healable_threshold() {
        let registry = registry();
        let burn = registry.require("burn").unwrap().clone();
        let oxygen = registry.require("oxygenlow").unwrap().clone();

        // burn threshold is min(5, 1) = 1
        assert!(!is_healable(&Affliction::new(burn.clone(), 1.0)));
        assert!(is_healable(&Affliction::new(burn, 1.5)));
        assert!(!is_healable(&Affliction::new(oxygen, 90.0)));
    }

    #[test]
    fn test_prefab_is_cached_after_lookup() {
        let registry = registry();
        let record = NetAffliction::new("LACERATIONS", 5, 10);
        let first = record.prefab(&registry).unwrap();
        // A different (empty) registry still returns the cached definition
        let again = record.prefab(&AfflictionRegistry::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_from_prefab_is_zeroed() {
        let registry = registry();
        let record = NetAffliction::from_prefab(registry.require("burn").unwrap().clone());
        assert_eq!((record.strength, record.price), (0, 0));
        assert!(record.matches("BURN"));
    }
}

//! Live afflictions carried by a character

use std::sync::Arc;

use crate::health::prefab::AfflictionPrefab;

/// An active affliction instance
#[derive(Debug, Clone)]
pub struct Affliction {
    pub prefab: Arc<AfflictionPrefab>,
    strength: f32,
}

impl Affliction {
    pub fn new(prefab: Arc<AfflictionPrefab>, strength: f32) -> Self {
        let strength = strength.clamp(0.0, prefab.max_strength);
        Self { prefab, strength }
    }

    pub fn identifier(&self) -> &str {
        &self.prefab.identifier
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Set strength, clamped to [0, max_strength]
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.clamp(0.0, self.prefab.max_strength);
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.prefab.identifier.eq_ignore_ascii_case(identifier)
    }
}

/// Health state of one character
#[derive(Debug, Clone, Default)]
pub struct CharacterHealth {
    afflictions: Vec<Affliction>,
}

impl CharacterHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an affliction; stacks onto an existing one of the same type
    pub fn apply(&mut self, prefab: Arc<AfflictionPrefab>, strength: f32) {
        if let Some(existing) = self.afflictions.iter_mut().find(|a| a.matches(&prefab.identifier)) {
            let total = existing.strength() + strength;
            existing.set_strength(total);
            return;
        }
        self.afflictions.push(Affliction::new(prefab, strength));
    }

    /// Push a separate instance even if one of the same type exists
    pub fn push_instance(&mut self, affliction: Affliction) {
        self.afflictions.push(affliction);
    }

    pub fn afflictions(&self) -> &[Affliction] {
        &self.afflictions
    }

    /// Combined strength of every instance with this identifier
    pub fn strength_of(&self, identifier: &str) -> f32 {
        self.afflictions
            .iter()
            .filter(|a| a.matches(identifier))
            .map(|a| a.strength())
            .sum()
    }

    /// Reduce afflictions of a type by `amount` in total, spread over
    /// instances in order. Instances that reach zero are removed.
    pub fn reduce_affliction(&mut self, identifier: &str, amount: f32) {
        let mut remaining = amount.max(0.0);
        for affliction in self.afflictions.iter_mut().filter(|a| a.matches(identifier)) {
            if remaining <= 0.0 {
                break;
            }
            let reduced = remaining.min(affliction.strength());
            affliction.set_strength(affliction.strength() - reduced);
            remaining -= reduced;
        }
        self.afflictions.retain(|a| a.strength() > 0.0);
    }
}

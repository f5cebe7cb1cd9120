//! Afflictions: static definitions and live per-character state

pub mod affliction;
pub mod prefab;

pub use affliction::{Affliction, CharacterHealth};
pub use prefab::{AfflictionPrefab, AfflictionRegistry, PrefabHandle};

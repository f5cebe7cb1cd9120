//! Abyss Crew - crew AI objectives and the outpost medical clinic
//!
//! Submarine crew members pursue prioritized objectives (find diving gear,
//! operate machinery, repair damage) while the campaign's medical clinic
//! prices their afflictions and sells treatment.

pub mod ai;
pub mod clinic;
pub mod core;
pub mod ecs;
pub mod health;
pub mod world;

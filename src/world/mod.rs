//! Characters, items and campaign state consumed by the crew AI and clinic

pub mod campaign;
pub mod character;
pub mod inventory;
pub mod item;

pub use campaign::{Campaign, Location};
pub use character::{Character, SpeechLog, SpokenLine};
pub use inventory::{Inventory, SlotType};
pub use item::{Item, ItemParent, Operable, Pickable, RelatedItem, Repairable, SkillRequirement};

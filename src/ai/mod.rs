//! Crew AI: prioritized objectives that nest sub-objectives
//!
//! Each character owns an [`ObjectiveManager`]. Every tick the manager
//! drops objectives that finished or became impossible, then acts the one
//! with the highest priority. Objectives talk to the world only through
//! [`AgentContext`].

pub mod contain_item;
pub mod context;
pub mod find_diving_gear;
pub mod get_item;
pub mod go_to;
pub mod manager;
pub mod objective;
pub mod operate_item;
pub mod repair_item;

pub use contain_item::ContainItem;
pub use context::AgentContext;
pub use find_diving_gear::FindDivingGear;
pub use get_item::{GetItem, ItemQuery};
pub use go_to::GoTo;
pub use manager::ObjectiveManager;
pub use objective::{AiObjective, Objective, ObjectiveBase, SubObjective};
pub use operate_item::OperateItem;
pub use repair_item::RepairItem;

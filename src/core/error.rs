use thiserror::Error;

use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("Item not found: {0:?}")]
    ItemNotFound(EntityId),

    #[error("Unknown affliction: {0}")]
    UnknownAffliction(String),

    #[error("Crew limit exceeded: {count} members (max {max})")]
    CrewLimitExceeded { count: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrewError>;

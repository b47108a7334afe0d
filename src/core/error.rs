use thiserror::Error;

use crate::core::types::CellId;
use crate::economy::upgrades::UpgradeId;

/// Which balance a rejected action was short of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Water,
    Coins,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Water => write!(f, "water"),
            Resource::Coins => write!(f, "coins"),
        }
    }
}

/// Reasons a player action or grid operation is rejected.
///
/// Every variant is recoverable: the action is refused and no state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: Resource,
        required: f64,
        available: f64,
    },

    #[error("No safe cells available to ignite")]
    NoSafeCellsAvailable,

    #[error("Cell {0:?} is already burning")]
    CellNotSafe(CellId),

    #[error("Cell {0:?} does not exist")]
    UnknownCell(CellId),

    #[error("Upgrade {0} is not in the catalog")]
    UnknownUpgrade(UpgradeId),

    #[error("Upgrade {id} is already at max level {level}")]
    MaxLevelReached { id: UpgradeId, level: u32 },

    #[error("Water tank is already full")]
    TankFull,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Simulation has not been started")]
    NotRunning,
}

/// Failures at the storage boundary. None of these are fatal to a session.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(#[from] serde_json::Error),

    #[error("Failed to write snapshot: {0}")]
    PersistenceWriteFailure(#[source] std::io::Error),

    #[error("Failed to read snapshot: {0}")]
    ReadFailure(#[source] std::io::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum FireError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FireError>;

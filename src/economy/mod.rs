//! Economy layer - water, coins and the upgrade shop

pub mod resources;
pub mod upgrades;

pub use resources::{ResourceEconomy, ResourceState};
pub use upgrades::{
    DerivedStats, EffectScale, Purchase, UpgradeCatalog, UpgradeDefinition, UpgradeEffect,
    UpgradeId, UpgradeState,
};

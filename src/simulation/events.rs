//! Events reported by ticks and actions for observers to react to

use std::time::Duration;

use crate::core::types::{CellId, ScreenPoint};
use crate::economy::upgrades::UpgradeId;

/// Something that happened during a tick or action
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// A safe cell caught fire
    FireStarted { cell: CellId },
    /// A tap hit a fire without putting it out
    CellDamaged {
        cell: CellId,
        remaining: u8,
        position: Option<ScreenPoint>,
    },
    /// A fire went out and paid its reward
    FireExtinguished {
        cell: CellId,
        reward: f64,
        position: Option<ScreenPoint>,
    },
    WaterRefilled { amount: f64 },
    UpgradePurchased {
        id: UpgradeId,
        level: u32,
        price: u64,
    },
    /// Area clear paid for, fires go out after `resolves_in`
    AreaClearStarted { resolves_in: Duration },
    AreaClearResolved { cleared: usize },
    /// State written to storage at this Unix millisecond
    Saved { at: u64 },
    SaveFailed { reason: String },
}

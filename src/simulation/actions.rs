//! Player actions accepted by the simulation

use crate::core::types::{CellId, ScreenPoint};
use crate::economy::upgrades::UpgradeId;

/// Input from the player, applied atomically between ticks
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    /// Spray a cell. `position` is where the tap landed, for effects.
    Extinguish {
        cell: CellId,
        position: Option<ScreenPoint>,
    },
    ManualRefill,
    BuyUpgrade(UpgradeId),
    /// The "rain" ability
    ActivateAreaClear,
}

impl PlayerAction {
    pub fn extinguish(cell: impl Into<CellId>) -> Self {
        PlayerAction::Extinguish {
            cell: cell.into(),
            position: None,
        }
    }
}

//! A single building plot

use serde::{Deserialize, Serialize};

/// Fire hit points of a freshly ignited cell
pub const MAX_FIRE_HP: u8 = 100;

/// Coarse state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireState {
    Safe,
    Burning,
}

/// Result of applying extinguish damage to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The cell was not burning, nothing changed
    AlreadySafe,
    /// Still burning with `remaining` hp
    Damaged { remaining: u8 },
    /// This hit put the fire out
    Extinguished,
}

/// One building. `fire_hp` is 0 when safe and only rises by ignition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    fire_hp: u8,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire_hp(&self) -> u8 {
        self.fire_hp
    }

    pub fn is_burning(&self) -> bool {
        self.fire_hp > 0
    }

    pub fn state(&self) -> FireState {
        if self.is_burning() {
            FireState::Burning
        } else {
            FireState::Safe
        }
    }

    /// Safe -> Burning at full hp. Returns false if already burning.
    pub(crate) fn ignite(&mut self) -> bool {
        if self.is_burning() {
            return false;
        }
        self.fire_hp = MAX_FIRE_HP;
        true
    }

    pub(crate) fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_burning() {
            return DamageOutcome::AlreadySafe;
        }
        let remaining = (self.fire_hp as u32).saturating_sub(amount) as u8;
        self.fire_hp = remaining;
        if remaining == 0 {
            DamageOutcome::Extinguished
        } else {
            DamageOutcome::Damaged { remaining }
        }
    }

    /// Put the fire out regardless of hp. Returns true if it was burning.
    pub(crate) fn extinguish(&mut self) -> bool {
        let was_burning = self.is_burning();
        self.fire_hp = 0;
        was_burning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lifecycle() {
        let mut cell = Cell::new();
        assert_eq!(cell.state(), FireState::Safe);

        assert!(cell.ignite());
        assert_eq!(cell.fire_hp(), MAX_FIRE_HP);
        assert!(!cell.ignite());

        assert_eq!(cell.apply_damage(30), DamageOutcome::Damaged { remaining: 70 });
        assert_eq!(cell.apply_damage(0), DamageOutcome::Damaged { remaining: 70 });
        assert_eq!(cell.apply_damage(500), DamageOutcome::Extinguished);
        assert_eq!(cell.fire_hp(), 0);
        assert_eq!(cell.apply_damage(25), DamageOutcome::AlreadySafe);
    }

    #[test]
    fn test_extinguish_reports_previous_state() {
        let mut cell = Cell::new();
        assert!(!cell.extinguish());
        cell.ignite();
        assert!(cell.extinguish());
        assert!(!cell.is_burning());
    }
}

//! Water and coin balances
//!
//! `ResourceState` is plain data owned by the store. `ResourceEconomy` holds
//! the rates from the config and applies them to a state. Callers run an
//! operation on a copy and commit it only when it succeeds, so a rejected
//! action never leaves a half-applied balance behind.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::{ActionError, Resource};

/// Current water and coin balances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Always within [0, max_water]
    pub water: f64,
    pub max_water: u32,
    /// Never negative
    pub coins: f64,
}

impl ResourceState {
    pub fn new(water: f64, max_water: u32, coins: f64) -> Self {
        let mut state = Self {
            water,
            max_water,
            coins,
        };
        state.normalize();
        state
    }

    /// Clamp balances back into their valid ranges
    pub fn normalize(&mut self) {
        let cap = self.max_water as f64;
        self.water = if self.water.is_finite() {
            self.water.clamp(0.0, cap)
        } else {
            0.0
        };
        if !self.coins.is_finite() || self.coins < 0.0 {
            self.coins = 0.0;
        }
    }

    pub fn is_full(&self) -> bool {
        self.water >= self.max_water as f64
    }

    /// Fraction of the tank that is filled (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        if self.max_water == 0 {
            return 0.0;
        }
        self.water / self.max_water as f64
    }

    /// Add water up to capacity, returns the amount actually added
    fn fill(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.is_full() {
            return 0.0;
        }
        let before = self.water;
        self.water = (self.water + amount).min(self.max_water as f64);
        self.water - before
    }

    /// Raise the tank capacity. Capacity never shrinks and water is untouched.
    pub fn raise_max_water(&mut self, max_water: u32) {
        self.max_water = self.max_water.max(max_water);
    }

    /// Spend water, failing without mutation when short
    pub fn spend(&mut self, amount: f64) -> Result<(), ActionError> {
        check_amount(amount)?;
        if self.water < amount {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Water,
                required: amount,
                available: self.water,
            });
        }
        self.water -= amount;
        Ok(())
    }

    /// Add coins. Negative deltas are rejected, purchases go through `debit_coins`.
    pub fn credit(&mut self, coins: f64) -> Result<(), ActionError> {
        check_amount(coins)?;
        self.coins += coins;
        Ok(())
    }

    /// Remove coins, failing without mutation when short
    pub fn debit_coins(&mut self, amount: f64) -> Result<(), ActionError> {
        check_amount(amount)?;
        if self.coins < amount {
            return Err(ActionError::InsufficientResource {
                resource: Resource::Coins,
                required: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }
}

fn check_amount(amount: f64) -> Result<(), ActionError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ActionError::InvalidAmount(amount));
    }
    Ok(())
}

/// Rates and limits applied to a `ResourceState`
#[derive(Debug, Clone)]
pub struct ResourceEconomy {
    regen_rate_per_second: f64,
    manual_refill_amount: f64,
    max_regen_step: Duration,
}

impl ResourceEconomy {
    pub fn new(regen_rate_per_second: f64, manual_refill_amount: f64, max_regen_step: Duration) -> Self {
        Self {
            regen_rate_per_second: regen_rate_per_second.max(0.0),
            manual_refill_amount: manual_refill_amount.max(0.0),
            max_regen_step,
        }
    }

    /// Rates from the config. The step limit matches the clock's, never
    /// shorter than one tick period.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.regen_rate_per_second,
            config.manual_refill_amount,
            config.max_tick_step().max(config.tick_period()),
        )
    }

    pub fn regen_rate_per_second(&self) -> f64 {
        self.regen_rate_per_second
    }

    pub fn manual_refill_amount(&self) -> f64 {
        self.manual_refill_amount
    }

    /// Passive regeneration over `dt`, clamped to the max step.
    ///
    /// Returns the water added. Never lowers water and never exceeds capacity.
    pub fn regenerate(&self, state: &mut ResourceState, dt: Duration) -> f64 {
        let dt = dt.min(self.max_regen_step).as_secs_f64();
        state.fill(self.regen_rate_per_second * dt)
    }

    /// Player-triggered refill. Same clamp as regeneration.
    pub fn manual_refill(&self, state: &mut ResourceState) -> Result<f64, ActionError> {
        if state.is_full() {
            return Err(ActionError::TankFull);
        }
        Ok(state.fill(self.manual_refill_amount))
    }

    /// Credit passive income accrued over `dt`
    pub fn accrue_income(&self, state: &mut ResourceState, per_second: f64, dt: Duration) -> f64 {
        let dt = dt.min(self.max_regen_step).as_secs_f64();
        let earned = per_second * dt;
        if earned <= 0.0 || state.credit(earned).is_err() {
            return 0.0;
        }
        earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy() -> ResourceEconomy {
        ResourceEconomy::new(20.0, 15.0, Duration::from_secs(1))
    }

    #[test]
    fn test_from_config_never_steps_shorter_than_a_tick() {
        // Built directly, skipping validation
        let config = GameConfig {
            max_tick_step_ms: 0,
            ..GameConfig::default()
        };
        let economy = ResourceEconomy::from_config(&config);
        let mut state = ResourceState::new(0.0, 100, 0.0);

        let added = economy.regenerate(&mut state, Duration::from_millis(50));
        let earned = economy.accrue_income(&mut state, 2.0, Duration::from_millis(50));

        assert!((added - 1.0).abs() < 1e-9);
        assert!((earned - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_regenerate_caps_at_max() {
        let mut state = ResourceState::new(95.0, 100, 0.0);
        let added = economy().regenerate(&mut state, Duration::from_millis(500));
        assert!((added - 5.0).abs() < 1e-9);
        assert_eq!(state.water, 100.0);
    }

    #[test]
    fn test_regenerate_clamps_large_dt() {
        let mut state = ResourceState::new(0.0, 1000, 0.0);
        economy().regenerate(&mut state, Duration::from_secs(60));
        // One second at 20/s, not sixty
        assert!((state.water - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_spend_rejects_without_mutation() {
        let mut state = ResourceState::new(4.0, 100, 0.0);
        let err = state.spend(5.0).unwrap_err();
        assert!(matches!(
            err,
            ActionError::InsufficientResource { resource: Resource::Water, .. }
        ));
        assert_eq!(state.water, 4.0);
    }

    #[test]
    fn test_credit_rejects_negative() {
        let mut state = ResourceState::new(0.0, 100, 10.0);
        assert_eq!(state.credit(-5.0), Err(ActionError::InvalidAmount(-5.0)));
        assert_eq!(state.coins, 10.0);
    }

    #[test]
    fn test_debit_coins() {
        let mut state = ResourceState::new(0.0, 100, 200.0);
        state.debit_coins(160.0).unwrap();
        assert_eq!(state.coins, 40.0);
        assert!(state.debit_coins(50.0).is_err());
        assert_eq!(state.coins, 40.0);
    }

    #[test]
    fn test_manual_refill() {
        let mut state = ResourceState::new(90.0, 100, 0.0);
        assert_eq!(economy().manual_refill(&mut state), Ok(10.0));
        assert_eq!(state.water, 100.0);
        assert_eq!(economy().manual_refill(&mut state), Err(ActionError::TankFull));
    }

    #[test]
    fn test_new_normalizes_out_of_range_values() {
        let state = ResourceState::new(500.0, 100, -3.0);
        assert_eq!(state.water, 100.0);
        assert_eq!(state.coins, 0.0);
    }

    #[test]
    fn test_raise_max_water_never_shrinks() {
        let mut state = ResourceState::new(50.0, 250, 0.0);
        state.raise_max_water(100);
        assert_eq!(state.max_water, 250);
        state.raise_max_water(400);
        assert_eq!(state.max_water, 400);
        assert_eq!(state.water, 50.0);
    }
}

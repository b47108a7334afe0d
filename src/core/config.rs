//! Simulation configuration with documented constants
//!
//! All balance numbers are collected here. Defaults reproduce the pacing of
//! the browser release; a TOML file may override any subset of them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::economy::upgrades::UpgradeCatalog;

/// Configuration for the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === GRID ===
    /// Number of building plots in the grid
    pub grid_size: usize,

    /// Probability of one new ignition per tick on an untouched grid
    ///
    /// Tuned from 0.015 per animation frame at ~60 fps. At the default
    /// 20 ticks per second, 0.045 keeps the same ignitions per second.
    pub spread_base: f64,

    /// Extra spread probability per unit of burned fraction
    ///
    /// A fully burning grid adds this on top of `spread_base`, so fires
    /// snowball when the player falls behind.
    pub spread_burn_factor: f64,

    // === CLOCK ===
    /// Nominal tick period in milliseconds
    pub tick_period_ms: u64,

    /// Largest step a single tick may apply, in milliseconds
    ///
    /// A backgrounded host can deliver one huge `dt`; clamping keeps a
    /// catch-up tick from refilling the whole tank at once.
    pub max_tick_step_ms: u64,

    // === WATER ===
    /// Water capacity before any tank bonus
    pub base_max_water: u32,

    /// Water at the start of a fresh session
    pub starting_water: f64,

    /// Passive water regeneration per second
    pub regen_rate_per_second: f64,

    /// Water added by one manual refill tap
    pub manual_refill_amount: f64,

    /// Water spent by one extinguish tap on a burning cell
    pub extinguish_cost: f64,

    // === AREA CLEAR ("rain") ===
    /// Water spent to activate the area clear
    pub area_clear_cost: f64,

    /// Delay between activation and the fires going out, in milliseconds
    ///
    /// Zero resolves the clear inside the activation call.
    pub area_clear_delay_ms: u64,

    // === COINS ===
    pub starting_coins: f64,

    /// Damage dealt per tap before pump bonuses
    pub base_click_power: u32,

    /// Coins for each extinguished fire before upgrade bonuses
    pub reward_base: f64,

    /// Extra coins per level of every click-power upgrade
    pub reward_per_power_level: f64,

    // === PERSISTENCE ===
    /// Simulated time between autosaves, in milliseconds
    pub autosave_interval_ms: u64,

    /// Seed for the ignition RNG. `None` draws from entropy.
    pub seed: Option<u64>,

    /// Purchasable upgrades
    pub upgrades: UpgradeCatalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 25,
            spread_base: 0.045,
            spread_burn_factor: 0.05,

            tick_period_ms: 50,
            max_tick_step_ms: 1000,

            base_max_water: 100,
            starting_water: 100.0,
            regen_rate_per_second: 20.0,
            manual_refill_amount: 15.0,
            extinguish_cost: 5.0,

            area_clear_cost: 50.0,
            area_clear_delay_ms: 1000,

            starting_coins: 0.0,
            base_click_power: 20,
            reward_base: 10.0,
            reward_per_power_level: 2.0,

            autosave_interval_ms: 5000,
            seed: None,

            upgrades: UpgradeCatalog::with_defaults(),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file, merging over defaults
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn max_tick_step(&self) -> Duration {
        Duration::from_millis(self.max_tick_step_ms)
    }

    pub fn area_clear_delay(&self) -> Duration {
        Duration::from_millis(self.area_clear_delay_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::Invalid("grid_size must be at least 1".into()));
        }

        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be positive".into()));
        }

        if self.max_tick_step_ms < self.tick_period_ms {
            return Err(ConfigError::Invalid(format!(
                "max_tick_step_ms ({}) must be at least tick_period_ms ({})",
                self.max_tick_step_ms, self.tick_period_ms
            )));
        }

        for (name, p) in [
            ("spread_base", self.spread_base),
            ("spread_burn_factor", self.spread_burn_factor),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "{} ({}) must be within [0, 1]",
                    name, p
                )));
            }
        }

        let amounts = [
            ("starting_water", self.starting_water),
            ("regen_rate_per_second", self.regen_rate_per_second),
            ("manual_refill_amount", self.manual_refill_amount),
            ("extinguish_cost", self.extinguish_cost),
            ("area_clear_cost", self.area_clear_cost),
            ("starting_coins", self.starting_coins),
            ("reward_base", self.reward_base),
            ("reward_per_power_level", self.reward_per_power_level),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} ({}) must be a non-negative number",
                    name, value
                )));
            }
        }

        if self.starting_water > self.base_max_water as f64 {
            return Err(ConfigError::Invalid(format!(
                "starting_water ({}) exceeds base_max_water ({})",
                self.starting_water, self.base_max_water
            )));
        }

        self.upgrades.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::parse_toml("grid_size = 16\nseed = 7\n").unwrap();
        assert_eq!(config.grid_size, 16);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.base_max_water, 100);
        assert_eq!(config.upgrades.definitions().len(), 3);
    }

    #[test]
    fn test_rejects_out_of_range_spread() {
        let result = GameConfig::parse_toml("spread_base = 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = GameConfig::parse_toml("grid_size = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = GameConfig::parse_toml(include_str!("../../data/firehero.toml")).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(shipped.upgrades, defaults.upgrades);
        assert_eq!(shipped.spread_base, defaults.spread_base);
        assert_eq!(shipped.autosave_interval_ms, defaults.autosave_interval_ms);
    }

    #[test]
    fn test_rejects_step_shorter_than_period() {
        for step in [0, 20] {
            let result = GameConfig::parse_toml(&format!("max_tick_step_ms = {}\n", step));
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "step {}", step);
        }
        assert!(GameConfig::parse_toml("max_tick_step_ms = 50\n").is_ok());
    }

    #[test]
    fn test_rejects_empty_grid() {
        let config = GameConfig {
            grid_size: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

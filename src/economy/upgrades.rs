//! Upgrade shop - definitions, price curve and effects
//!
//! Each definition carries its own effect variant, base cost and growth
//! factor. Prices follow `floor(base_cost * growth^level)`, so every purchase
//! is more expensive than the last.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::{ActionError, ConfigError};
use crate::economy::resources::ResourceState;

/// No level may cost more than this many coins. Keeps floored prices exact
/// and strictly increasing; levels past it cannot be bought.
pub const PRICE_CEILING: f64 = 1e15;

/// Identifier of a purchasable upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeId {
    /// Water cannon, increases damage per tap
    Pump,
    /// Water tank, increases capacity
    Tank,
    /// Fire station, pays passive income
    Station,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 3] = [UpgradeId::Pump, UpgradeId::Tank, UpgradeId::Station];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::Pump => "pump",
            UpgradeId::Tank => "tank",
            UpgradeId::Station => "station",
        }
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pump" => Ok(UpgradeId::Pump),
            "tank" => Ok(UpgradeId::Tank),
            "station" => Ok(UpgradeId::Station),
            other => Err(format!("unknown upgrade '{}'", other)),
        }
    }
}

/// How an effect's bonus grows with level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectScale {
    /// Bonus is `amount * level`
    PerLevel(f64),
    /// Bonus is `table[level]`, levels past the end use the last entry
    Table(Vec<f64>),
}

impl EffectScale {
    pub fn bonus_at(&self, level: u32) -> f64 {
        match self {
            EffectScale::PerLevel(amount) => amount * level as f64,
            EffectScale::Table(table) => {
                let idx = (level as usize).min(table.len().saturating_sub(1));
                table.get(idx).copied().unwrap_or(0.0)
            }
        }
    }
}

/// What owning an upgrade does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeEffect {
    IncreaseClickPower(EffectScale),
    IncreaseMaxWater(EffectScale),
    IncreasePassiveIncome(EffectScale),
}

impl UpgradeEffect {
    pub fn scale(&self) -> &EffectScale {
        match self {
            UpgradeEffect::IncreaseClickPower(scale)
            | UpgradeEffect::IncreaseMaxWater(scale)
            | UpgradeEffect::IncreasePassiveIncome(scale) => scale,
        }
    }

    /// Click power and capacity upgrades are owned from the start
    fn always_owned(&self) -> bool {
        !matches!(self, UpgradeEffect::IncreasePassiveIncome(_))
    }
}

/// A single entry in the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub id: UpgradeId,
    /// Human-readable name
    pub name: String,
    pub base_cost: f64,
    /// Price multiplier per level, kept in the 1.5 to 1.6 range by default
    pub growth: f64,
    /// Level a fresh save starts at
    pub starting_level: u32,
    /// Highest purchasable level, `None` to stop only at the price ceiling
    #[serde(default)]
    pub max_level: Option<u32>,
    pub effect: UpgradeEffect,
}

impl UpgradeDefinition {
    /// Price to buy the next level when currently at `level`.
    ///
    /// `None` once the price would pass `PRICE_CEILING`.
    pub fn price_at(&self, level: u32) -> Option<u64> {
        if level >= self.priced_levels() {
            return None;
        }
        Some((self.base_cost * self.growth.powf(level as f64)).floor() as u64)
    }

    /// Number of levels, counted from 0, whose price stays under the ceiling
    fn priced_levels(&self) -> u32 {
        if !(self.base_cost > 0.0 && self.base_cost <= PRICE_CEILING) {
            return 0;
        }
        let n = ((PRICE_CEILING / self.base_cost).ln() / self.growth.ln()).floor() + 1.0;
        if n.is_finite() {
            n.min(u32::MAX as f64) as u32
        } else {
            0
        }
    }

    /// Highest level that can be owned: `max_level` or the price ceiling,
    /// whichever comes first
    pub fn level_cap(&self) -> u32 {
        let priced = self.priced_levels();
        self.max_level.map_or(priced, |max| max.min(priced))
    }

    pub fn is_maxed(&self, level: u32) -> bool {
        level >= self.level_cap()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.growth.is_finite() || self.growth <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "upgrade {}: growth ({}) must be greater than 1",
                self.id, self.growth
            )));
        }

        // Each step then rises by at least one whole coin, so floored prices
        // strictly increase.
        if !self.base_cost.is_finite() || self.base_cost * (self.growth - 1.0) < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "upgrade {}: base_cost ({}) too small for growth ({})",
                self.id, self.base_cost, self.growth
            )));
        }

        if self.effect.always_owned() && self.starting_level == 0 {
            return Err(ConfigError::Invalid(format!(
                "upgrade {}: starting_level must be at least 1",
                self.id
            )));
        }

        if self.starting_level > self.priced_levels() {
            return Err(ConfigError::Invalid(format!(
                "upgrade {}: starting_level ({}) is priced past {}",
                self.id, self.starting_level, PRICE_CEILING
            )));
        }

        if let Some(max) = self.max_level {
            if max < self.starting_level {
                return Err(ConfigError::Invalid(format!(
                    "upgrade {}: max_level ({}) below starting_level ({})",
                    self.id, max, self.starting_level
                )));
            }
        }

        if let EffectScale::Table(table) = self.effect.scale() {
            if table.is_empty() || table.windows(2).any(|w| w[1] < w[0]) {
                return Err(ConfigError::Invalid(format!(
                    "upgrade {}: effect table must be non-empty and non-decreasing",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

/// Owned level per upgrade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeState {
    levels: BTreeMap<UpgradeId, u32>,
}

impl UpgradeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting levels of every upgrade in the catalog
    pub fn starting(catalog: &UpgradeCatalog) -> Self {
        let levels = catalog
            .definitions
            .iter()
            .map(|def| (def.id, def.starting_level))
            .collect();
        Self { levels }
    }

    /// Current level, 0 when never owned
    pub fn level(&self, id: UpgradeId) -> u32 {
        self.levels.get(&id).copied().unwrap_or(0)
    }

    /// Set a level. Lower values than the current level are ignored.
    pub fn raise_to(&mut self, id: UpgradeId, level: u32) {
        let entry = self.levels.entry(id).or_insert(0);
        *entry = (*entry).max(level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeId, u32)> + '_ {
        self.levels.iter().map(|(id, level)| (*id, *level))
    }
}

/// Values that follow from the owned upgrade levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    /// Damage per extinguish tap
    pub click_power: u32,
    pub max_water: u32,
    /// Coins per second
    pub passive_income: f64,
    /// Coins per extinguished fire
    pub extinguish_reward: f64,
}

/// Result of a successful purchase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purchase {
    pub id: UpgradeId,
    pub price: u64,
    pub new_level: u32,
}

/// Catalog of all available upgrades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeCatalog {
    definitions: Vec<UpgradeDefinition>,
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl UpgradeCatalog {
    pub fn new(definitions: Vec<UpgradeDefinition>) -> Self {
        Self { definitions }
    }

    /// Default shop: pump, tank and fire station
    pub fn with_defaults() -> Self {
        Self::new(vec![
            UpgradeDefinition {
                id: UpgradeId::Pump,
                name: "Hydro Cannon".into(),
                base_cost: 100.0,
                growth: 1.6,
                starting_level: 1,
                max_level: Some(5),
                effect: UpgradeEffect::IncreaseClickPower(EffectScale::Table(vec![
                    0.0, 5.0, 12.0, 25.0, 50.0, 100.0,
                ])),
            },
            UpgradeDefinition {
                id: UpgradeId::Tank,
                name: "Water Tank".into(),
                base_cost: 250.0,
                growth: 1.5,
                starting_level: 1,
                max_level: Some(5),
                // Level 1 is the stock tank, bonuses start with the first purchase
                effect: UpgradeEffect::IncreaseMaxWater(EffectScale::Table(vec![
                    0.0, 0.0, 150.0, 300.0, 600.0, 1000.0,
                ])),
            },
            UpgradeDefinition {
                id: UpgradeId::Station,
                name: "Fire Station".into(),
                base_cost: 500.0,
                growth: 1.55,
                starting_level: 0,
                max_level: Some(50),
                effect: UpgradeEffect::IncreasePassiveIncome(EffectScale::PerLevel(2.0)),
            },
        ])
    }

    pub fn get(&self, id: UpgradeId) -> Option<&UpgradeDefinition> {
        self.definitions.iter().find(|def| def.id == id)
    }

    pub fn definitions(&self) -> &[UpgradeDefinition] {
        &self.definitions
    }

    /// Price of the next level for `id` at `current_level`. Pure.
    pub fn price_of(&self, id: UpgradeId, current_level: u32) -> Result<u64, ActionError> {
        self.get(id)
            .ok_or(ActionError::UnknownUpgrade(id))?
            .price_at(current_level)
            .ok_or(ActionError::MaxLevelReached {
                id,
                level: current_level,
            })
    }

    /// Compute derived stats for a set of levels
    pub fn derive(&self, levels: &UpgradeState, config: &GameConfig) -> DerivedStats {
        let mut click_bonus = 0.0;
        let mut water_bonus = 0.0;
        let mut passive_income = 0.0;
        let mut power_levels = 0u32;

        for def in &self.definitions {
            let level = levels.level(def.id);
            let bonus = def.effect.scale().bonus_at(level);
            match def.effect {
                UpgradeEffect::IncreaseClickPower(_) => {
                    click_bonus += bonus;
                    power_levels += level;
                }
                UpgradeEffect::IncreaseMaxWater(_) => water_bonus += bonus,
                UpgradeEffect::IncreasePassiveIncome(_) => passive_income += bonus,
            }
        }

        DerivedStats {
            click_power: config.base_click_power.saturating_add(click_bonus as u32),
            max_water: config.base_max_water.saturating_add(water_bonus as u32),
            passive_income,
            extinguish_reward: config.reward_base
                + config.reward_per_power_level * power_levels as f64,
        }
    }

    /// Buy the next level of `id`.
    ///
    /// Works on the caller's state: coins are debited, the level incremented
    /// and the capacity effect applied, or nothing changes at all.
    pub fn purchase(
        &self,
        id: UpgradeId,
        resources: &mut ResourceState,
        levels: &mut UpgradeState,
        config: &GameConfig,
    ) -> Result<Purchase, ActionError> {
        let def = self.get(id).ok_or(ActionError::UnknownUpgrade(id))?;
        let current = levels.level(id);
        if def.is_maxed(current) {
            return Err(ActionError::MaxLevelReached { id, level: current });
        }

        let maxed = ActionError::MaxLevelReached { id, level: current };
        let price = def.price_at(current).ok_or_else(|| maxed.clone())?;
        let new_level = current.checked_add(1).ok_or(maxed)?;
        resources.debit_coins(price as f64)?;
        levels.raise_to(id, new_level);

        if let UpgradeEffect::IncreaseMaxWater(_) = def.effect {
            let stats = self.derive(levels, config);
            resources.raise_max_water(stats.max_water);
        }

        Ok(Purchase {
            id,
            price,
            new_level,
        })
    }

    /// Validate the catalog for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, def) in self.definitions.iter().enumerate() {
            if self.definitions[..i].iter().any(|other| other.id == def.id) {
                return Err(ConfigError::Invalid(format!(
                    "upgrade {} defined more than once",
                    def.id
                )));
            }
            def.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Resource;

    #[test]
    fn test_pump_price_curve() {
        let catalog = UpgradeCatalog::with_defaults();
        assert_eq!(catalog.price_of(UpgradeId::Pump, 1), Ok(160));
        assert_eq!(catalog.price_of(UpgradeId::Pump, 2), Ok(256));
        assert_eq!(catalog.price_of(UpgradeId::Tank, 1), Ok(375));
    }

    #[test]
    fn test_purchase_rejected_when_short() {
        let catalog = UpgradeCatalog::with_defaults();
        let config = GameConfig::default();
        let mut resources = ResourceState::new(100.0, 100, 100.0);
        let mut levels = UpgradeState::starting(&catalog);

        let err = catalog
            .purchase(UpgradeId::Pump, &mut resources, &mut levels, &config)
            .unwrap_err();

        assert!(matches!(
            err,
            ActionError::InsufficientResource { resource: Resource::Coins, .. }
        ));
        assert_eq!(resources.coins, 100.0);
        assert_eq!(levels.level(UpgradeId::Pump), 1);
    }

    #[test]
    fn test_tank_purchase_raises_capacity() {
        let catalog = UpgradeCatalog::with_defaults();
        let config = GameConfig::default();
        let mut resources = ResourceState::new(80.0, 100, 400.0);
        let mut levels = UpgradeState::starting(&catalog);

        let purchase = catalog
            .purchase(UpgradeId::Tank, &mut resources, &mut levels, &config)
            .unwrap();

        assert_eq!(purchase.price, 375);
        assert_eq!(purchase.new_level, 2);
        assert_eq!(resources.max_water, 250);
        assert_eq!(resources.coins, 25.0);
        assert_eq!(resources.water, 80.0);
    }

    #[test]
    fn test_max_level_blocks_purchase() {
        let catalog = UpgradeCatalog::with_defaults();
        let config = GameConfig::default();
        let mut resources = ResourceState::new(0.0, 100, 1e9);
        let mut levels = UpgradeState::starting(&catalog);
        levels.raise_to(UpgradeId::Pump, 5);

        let err = catalog
            .purchase(UpgradeId::Pump, &mut resources, &mut levels, &config)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::MaxLevelReached {
                id: UpgradeId::Pump,
                level: 5
            }
        );
        assert_eq!(resources.coins, 1e9);
    }

    #[test]
    fn test_derived_stats_at_start() {
        let catalog = UpgradeCatalog::with_defaults();
        let config = GameConfig::default();
        let stats = catalog.derive(&UpgradeState::starting(&catalog), &config);
        assert_eq!(stats.click_power, 25);
        assert_eq!(stats.max_water, 100);
        assert_eq!(stats.passive_income, 0.0);
        assert_eq!(stats.extinguish_reward, 12.0);
    }

    #[test]
    fn test_station_pays_per_level() {
        let catalog = UpgradeCatalog::with_defaults();
        let config = GameConfig::default();
        let mut levels = UpgradeState::starting(&catalog);
        levels.raise_to(UpgradeId::Station, 3);
        assert_eq!(catalog.derive(&levels, &config).passive_income, 6.0);
    }

    #[test]
    fn test_table_clamps_past_end() {
        let scale = EffectScale::Table(vec![0.0, 10.0, 20.0]);
        assert_eq!(scale.bonus_at(2), 20.0);
        assert_eq!(scale.bonus_at(9), 20.0);
        assert_eq!(EffectScale::Table(vec![]).bonus_at(3), 0.0);
    }

    #[test]
    fn test_validate_rejects_flat_growth() {
        let mut catalog = UpgradeCatalog::with_defaults();
        catalog.definitions[0].growth = 1.0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut catalog = UpgradeCatalog::with_defaults();
        let pump = catalog.definitions[0].clone();
        catalog.definitions.push(pump);
        assert!(catalog.validate().is_err());
    }

    fn unbounded_station() -> UpgradeDefinition {
        let mut def = UpgradeCatalog::with_defaults()
            .get(UpgradeId::Station)
            .unwrap()
            .clone();
        def.max_level = None;
        def
    }

    #[test]
    fn test_prices_stop_at_ceiling() {
        let def = unbounded_station();
        let cap = def.level_cap();
        assert!(cap > 50);

        let last = def.price_at(cap - 1).unwrap();
        assert!(last > def.price_at(cap - 2).unwrap());
        assert!(last as f64 <= PRICE_CEILING * 1.0001);
        assert_eq!(def.price_at(cap), None);
        assert_eq!(def.price_at(3_000_000_000), None);
        assert_eq!(def.price_at(u32::MAX), None);
    }

    #[test]
    fn test_purchase_at_top_level_is_rejected() {
        let config = GameConfig::default();
        let catalog = UpgradeCatalog::new(vec![unbounded_station()]);
        let mut resources = ResourceState::new(0.0, 100, 1e18);
        let mut levels = UpgradeState::new();
        levels.raise_to(UpgradeId::Station, u32::MAX);

        let err = catalog
            .purchase(UpgradeId::Station, &mut resources, &mut levels, &config)
            .unwrap_err();

        assert_eq!(
            err,
            ActionError::MaxLevelReached {
                id: UpgradeId::Station,
                level: u32::MAX
            }
        );
        assert_eq!(levels.level(UpgradeId::Station), u32::MAX);
        assert_eq!(resources.coins, 1e18);
        assert!(catalog.price_of(UpgradeId::Station, u32::MAX).is_err());
    }

    #[test]
    fn test_validate_rejects_start_past_ceiling() {
        let mut catalog = UpgradeCatalog::with_defaults();
        catalog.definitions[2].max_level = None;
        catalog.definitions[2].starting_level = 1_000;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_upgrade_id_parsing() {
        assert_eq!("Pump".parse::<UpgradeId>(), Ok(UpgradeId::Pump));
        assert!("drone".parse::<UpgradeId>().is_err());
    }
}

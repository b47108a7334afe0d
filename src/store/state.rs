//! Canonical game state and its observable fields

use crate::core::config::GameConfig;
use crate::economy::resources::ResourceState;
use crate::economy::upgrades::UpgradeState;

/// Observable field of the game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Coins,
    Water,
    MaxWater,
    BurnedPercent,
    Upgrades,
    LastSave,
    FiresExtinguished,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Coins,
        Field::Water,
        Field::MaxWater,
        Field::BurnedPercent,
        Field::Upgrades,
        Field::LastSave,
        Field::FiresExtinguished,
    ];

    /// Name used in the persisted snapshot
    pub fn name(&self) -> &'static str {
        match self {
            Field::Coins => "coins",
            Field::Water => "water",
            Field::MaxWater => "maxWater",
            Field::BurnedPercent => "burnedPercent",
            Field::Upgrades => "upgrades",
            Field::LastSave => "lastSave",
            Field::FiresExtinguished => "firesExtinguished",
        }
    }
}

/// A new value for one field. The variant names the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Coins(f64),
    Water(f64),
    MaxWater(u32),
    BurnedPercent(u8),
    Upgrades(UpgradeState),
    /// Unix milliseconds
    LastSave(u64),
    FiresExtinguished(u64),
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Coins(_) => Field::Coins,
            FieldValue::Water(_) => Field::Water,
            FieldValue::MaxWater(_) => Field::MaxWater,
            FieldValue::BurnedPercent(_) => Field::BurnedPercent,
            FieldValue::Upgrades(_) => Field::Upgrades,
            FieldValue::LastSave(_) => Field::LastSave,
            FieldValue::FiresExtinguished(_) => Field::FiresExtinguished,
        }
    }

    /// Numeric view of scalar fields, `None` for the upgrade map
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Coins(v) | FieldValue::Water(v) => Some(*v),
            FieldValue::MaxWater(v) => Some(*v as f64),
            FieldValue::BurnedPercent(v) => Some(*v as f64),
            FieldValue::LastSave(v) | FieldValue::FiresExtinguished(v) => Some(*v as f64),
            FieldValue::Upgrades(_) => None,
        }
    }
}

/// Everything the store tracks and the snapshot persists
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub resources: ResourceState,
    pub upgrades: UpgradeState,
    /// floor(burned fraction * 100)
    pub burned_percent: u8,
    /// Unix milliseconds of the last successful save
    pub last_save: u64,
    pub fires_extinguished: u64,
}

impl GameState {
    /// Fresh-session state for a config
    pub fn from_config(config: &GameConfig) -> Self {
        let upgrades = UpgradeState::starting(&config.upgrades);
        let max_water = config.upgrades.derive(&upgrades, config).max_water;
        Self {
            resources: ResourceState::new(config.starting_water, max_water, config.starting_coins),
            upgrades,
            burned_percent: 0,
            last_save: 0,
            fires_extinguished: 0,
        }
    }

    /// Current value of a field
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Coins => FieldValue::Coins(self.resources.coins),
            Field::Water => FieldValue::Water(self.resources.water),
            Field::MaxWater => FieldValue::MaxWater(self.resources.max_water),
            Field::BurnedPercent => FieldValue::BurnedPercent(self.burned_percent),
            Field::Upgrades => FieldValue::Upgrades(self.upgrades.clone()),
            Field::LastSave => FieldValue::LastSave(self.last_save),
            Field::FiresExtinguished => FieldValue::FiresExtinguished(self.fires_extinguished),
        }
    }

    pub(crate) fn apply(&mut self, value: FieldValue) {
        match value {
            FieldValue::Coins(v) => self.resources.coins = v,
            FieldValue::Water(v) => self.resources.water = v,
            FieldValue::MaxWater(v) => self.resources.max_water = v,
            FieldValue::BurnedPercent(v) => self.burned_percent = v,
            FieldValue::Upgrades(v) => self.upgrades = v,
            FieldValue::LastSave(v) => self.last_save = v,
            FieldValue::FiresExtinguished(v) => self.fires_extinguished = v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_fresh_game() {
        let state = GameState::from_config(&GameConfig::default());
        assert_eq!(state.resources.water, 100.0);
        assert_eq!(state.resources.max_water, 100);
        assert_eq!(state.resources.coins, 0.0);
        assert_eq!(state.upgrades.level(crate::economy::UpgradeId::Pump), 1);
        assert_eq!(state.upgrades.level(crate::economy::UpgradeId::Tank), 1);
    }

    #[test]
    fn test_get_apply_round_trip() {
        let mut state = GameState::from_config(&GameConfig::default());
        for field in Field::ALL {
            let value = state.get(field);
            assert_eq!(value.field(), field);
            state.apply(value);
        }
        assert_eq!(state, GameState::from_config(&GameConfig::default()));
    }
}

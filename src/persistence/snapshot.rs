//! Snapshot wire format
//!
//! A JSON object with camelCase keys:
//! `{coins, water, maxWater, upgrades: {id: level}, burnedPercent, lastSave, firesExtinguished}`.
//! Saved keys are merged over the defaults, so older saves missing a key and
//! newer saves carrying extra keys both load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::config::GameConfig;
use crate::core::error::PersistenceError;
use crate::economy::resources::ResourceState;
use crate::economy::upgrades::{UpgradeId, UpgradeState};
use crate::persistence::storage::SnapshotStorage;
use crate::store::state::GameState;

/// Serialized projection of the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub coins: f64,
    pub water: f64,
    pub max_water: u32,
    pub upgrades: BTreeMap<String, u32>,
    pub burned_percent: u8,
    /// Unix milliseconds
    pub last_save: u64,
    pub fires_extinguished: u64,
}

impl PersistedSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            coins: state.resources.coins,
            water: state.resources.water,
            max_water: state.resources.max_water,
            upgrades: state
                .upgrades
                .iter()
                .map(|(id, level)| (id.as_str().to_string(), level))
                .collect(),
            burned_percent: state.burned_percent,
            last_save: state.last_save,
            fires_extinguished: state.fires_extinguished,
        }
    }

    /// Convert to game state, repairing anything out of range
    pub fn into_state(self, config: &GameConfig) -> GameState {
        let catalog = &config.upgrades;
        let mut upgrades = UpgradeState::starting(catalog);
        for (key, level) in &self.upgrades {
            let id = match key.parse::<UpgradeId>() {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Ignoring saved upgrade: {}", e);
                    continue;
                }
            };
            let Some(def) = catalog.get(id) else {
                tracing::warn!("Ignoring saved upgrade {} missing from catalog", id);
                continue;
            };
            let cap = def.level_cap();
            if *level > cap {
                tracing::warn!("Saved {} level {} capped at {}", id, level, cap);
            }
            upgrades.raise_to(id, (*level).min(cap));
        }

        let max_water = catalog.derive(&upgrades, config).max_water;
        if max_water != self.max_water {
            tracing::debug!(
                "Saved maxWater {} differs from upgrades, using {}",
                self.max_water,
                max_water
            );
        }

        GameState {
            resources: ResourceState::new(self.water, max_water, self.coins),
            upgrades,
            burned_percent: self.burned_percent.min(100),
            last_save: self.last_save,
            fires_extinguished: self.fires_extinguished,
        }
    }
}

/// Serialize state to the JSON snapshot format
pub fn encode(state: &GameState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(&PersistedSnapshot::from_state(state))?)
}

/// Parse a snapshot payload, merging its keys over the config defaults
pub fn decode(payload: &str, config: &GameConfig) -> Result<GameState, PersistenceError> {
    let saved: Value = serde_json::from_str(payload)?;
    let Value::Object(saved) = saved else {
        return Err(PersistenceError::CorruptSnapshot(
            <serde_json::Error as serde::de::Error>::custom("snapshot is not a JSON object"),
        ));
    };

    let defaults = PersistedSnapshot::from_state(&GameState::from_config(config));
    let mut merged = match serde_json::to_value(defaults)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merge_over(&mut merged, saved);

    let snapshot: PersistedSnapshot = serde_json::from_value(Value::Object(merged))?;
    Ok(snapshot.into_state(config))
}

/// Saved keys win; nulls count as missing; the upgrade map merges per id
fn merge_over(defaults: &mut Map<String, Value>, saved: Map<String, Value>) {
    for (key, value) in saved {
        match value {
            Value::Null => {}
            Value::Object(incoming) if matches!(defaults.get(&key), Some(Value::Object(_))) => {
                if let Some(Value::Object(existing)) = defaults.get_mut(&key) {
                    for (id, level) in incoming {
                        if !level.is_null() {
                            existing.insert(id, level);
                        }
                    }
                }
            }
            value => {
                defaults.insert(key, value);
            }
        }
    }
}

/// How a load went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing saved yet
    Fresh,
    Restored,
    /// The save was unreadable and defaults were used
    Recovered,
}

/// Load state from storage, falling back to defaults on any failure
pub fn load(storage: &dyn SnapshotStorage, config: &GameConfig) -> (GameState, LoadOutcome) {
    let payload = match storage.read() {
        Ok(Some(payload)) => payload,
        Ok(None) => return (GameState::from_config(config), LoadOutcome::Fresh),
        Err(e) => {
            tracing::warn!("Could not read save, starting fresh: {}", e);
            return (GameState::from_config(config), LoadOutcome::Recovered);
        }
    };

    match decode(&payload, config) {
        Ok(state) => (state, LoadOutcome::Restored),
        Err(e) => {
            tracing::warn!("Save file corrupted, starting fresh: {}", e);
            (GameState::from_config(config), LoadOutcome::Recovered)
        }
    }
}

/// Write state to storage
pub fn save(storage: &mut dyn SnapshotStorage, state: &GameState) -> Result<(), PersistenceError> {
    let payload = encode(state)?;
    storage.write(&payload)
}

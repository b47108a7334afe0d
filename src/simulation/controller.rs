//! Simulation controller
//!
//! Owns the grid, the economy, the store and the storage slot. Ticks run a
//! fixed sequence of steps; player actions either complete fully (debit,
//! effect, notification) or are rejected with nothing changed.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::clock::{now_millis, Clock};
use crate::core::config::GameConfig;
use crate::core::error::{ActionError, PersistenceError};
use crate::core::types::{CellId, ScreenPoint};
use crate::economy::resources::{ResourceEconomy, ResourceState};
use crate::economy::upgrades::{DerivedStats, UpgradeId};
use crate::feedback::{Haptics, ImpactStyle, NoHaptics, NotifyOutcome};
use crate::grid::{spread_probability, DamageOutcome, Grid};
use crate::persistence::{self, LoadOutcome, SnapshotStorage};
use crate::simulation::actions::PlayerAction;
use crate::simulation::events::SimulationEvent;
use crate::store::{Field, FieldValue, GameState, ReactiveStore, SubscriptionId};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, save not yet loaded. Subscribe here to receive the load replay.
    Loading,
    Running,
}

/// One game session
pub struct Simulation {
    config: GameConfig,
    phase: SessionPhase,
    clock: Clock,
    economy: ResourceEconomy,
    grid: Grid,
    store: ReactiveStore,
    storage: Box<dyn SnapshotStorage>,
    haptics: Box<dyn Haptics>,
    rng: ChaCha8Rng,
    /// Time left before each activated area clear resolves
    pending_clears: Vec<Duration>,
    /// Simulated time of the last autosave attempt
    last_autosave: Duration,
}

impl Simulation {
    pub fn new(config: GameConfig, storage: Box<dyn SnapshotStorage>) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            phase: SessionPhase::Loading,
            clock: Clock::new(config.tick_period(), config.max_tick_step()),
            economy: ResourceEconomy::from_config(&config),
            grid: Grid::new(config.grid_size),
            store: ReactiveStore::new(GameState::from_config(&config)),
            storage,
            haptics: Box::new(NoHaptics),
            rng,
            pending_clears: Vec::new(),
            last_autosave: Duration::ZERO,
            config,
        }
    }

    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    // === OBSERVATION ===

    pub fn subscribe<F>(&mut self, field: Field, callback: F) -> SubscriptionId
    where
        F: FnMut(&FieldValue) + 'static,
    {
        self.store.subscribe(field, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Click power, capacity, income and reward for the owned upgrades
    pub fn stats(&self) -> DerivedStats {
        self.config
            .upgrades
            .derive(&self.store.state().upgrades, &self.config)
    }

    /// Price of the next level of `id`
    pub fn price_of(&self, id: UpgradeId) -> Result<u64, ActionError> {
        let level = self.store.state().upgrades.level(id);
        self.config.upgrades.price_of(id, level)
    }

    // === LIFECYCLE ===

    /// Load the save, replay every field to subscribers and begin running.
    ///
    /// Returns `None` if the session was already started.
    pub fn start(&mut self) -> Option<LoadOutcome> {
        if self.phase == SessionPhase::Running {
            tracing::warn!("Simulation already started");
            return None;
        }

        let (state, outcome) = persistence::load(self.storage.as_ref(), &self.config);
        self.store.replace(state);
        self.store.replay();
        self.phase = SessionPhase::Running;

        tracing::info!(
            ?outcome,
            coins = self.state().resources.coins,
            "Simulation running with {} cells",
            self.grid.len()
        );
        Some(outcome)
    }

    fn ensure_running(&self) -> Result<(), ActionError> {
        match self.phase {
            SessionPhase::Running => Ok(()),
            SessionPhase::Loading => Err(ActionError::NotRunning),
        }
    }

    // === TICK ===

    /// Advance the simulation by `dt`.
    ///
    /// Steps run in order: economy, burned percentage, spread, autosave.
    /// Nothing in here fails; a step that cannot act is skipped.
    pub fn tick(&mut self, dt: Duration) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Running {
            return events;
        }

        let step = self.clock.advance(dt);

        // 1. Water regeneration, passive income, due area clears
        let stats = self.stats();
        let mut resources = self.store.state().resources;
        self.economy.regenerate(&mut resources, step);
        self.economy
            .accrue_income(&mut resources, stats.passive_income, step);
        self.commit_resources(resources);
        self.advance_area_clears(step, &mut events);

        // 2. Burned percentage
        let burned_fraction = self.grid.burned_fraction();
        let percent = self.burned_percent();
        if percent != self.store.state().burned_percent {
            self.store.set(FieldValue::BurnedPercent(percent));
        }

        // 3. Spread
        let p = spread_probability(
            self.config.spread_base,
            self.config.spread_burn_factor,
            burned_fraction,
        );
        if let Some(cell) = self.grid.spread_tick(p, &mut self.rng) {
            tracing::debug!(?cell, p, "Fire started");
            events.push(SimulationEvent::FireStarted { cell });
        }

        // 4. Autosave
        if self.clock.elapsed().saturating_sub(self.last_autosave) >= self.config.autosave_interval() {
            self.last_autosave = self.clock.elapsed();
            events.push(self.persist());
        }

        events
    }

    fn burned_percent(&self) -> u8 {
        if self.grid.is_empty() {
            return 0;
        }
        (self.grid.burning_count() * 100 / self.grid.len()) as u8
    }

    fn advance_area_clears(&mut self, step: Duration, events: &mut Vec<SimulationEvent>) {
        if self.pending_clears.is_empty() {
            return;
        }

        let mut due = 0;
        self.pending_clears.retain_mut(|remaining| {
            *remaining = remaining.saturating_sub(step);
            if remaining.is_zero() {
                due += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..due {
            self.resolve_area_clear(events);
        }
    }

    fn resolve_area_clear(&mut self, events: &mut Vec<SimulationEvent>) {
        let cleared = self.grid.extinguish_all();
        let reward = self.stats().extinguish_reward;

        let mut resources = self.store.state().resources;
        for &cell in &cleared {
            if resources.credit(reward).is_ok() {
                events.push(SimulationEvent::FireExtinguished {
                    cell,
                    reward,
                    position: None,
                });
            }
        }
        self.commit_resources(resources);

        if !cleared.is_empty() {
            let total = self.store.state().fires_extinguished + cleared.len() as u64;
            self.store.set(FieldValue::FiresExtinguished(total));
            self.haptics.notify(NotifyOutcome::Success);
        }

        tracing::debug!(cleared = cleared.len(), "Area clear resolved");
        events.push(SimulationEvent::AreaClearResolved {
            cleared: cleared.len(),
        });
    }

    // === PERSISTENCE ===

    /// Write the current state to storage now
    pub fn save_now(&mut self) -> Result<(), PersistenceError> {
        let now = now_millis();
        let mut snapshot = self.store.state().clone();
        snapshot.last_save = now;
        persistence::save(self.storage.as_mut(), &snapshot)?;
        self.store.set(FieldValue::LastSave(now));
        Ok(())
    }

    /// Best-effort save. Failures are logged and retried at the next interval.
    fn persist(&mut self) -> SimulationEvent {
        match self.save_now() {
            Ok(()) => SimulationEvent::Saved {
                at: self.store.state().last_save,
            },
            Err(e) => {
                tracing::warn!("Autosave failed: {}", e);
                SimulationEvent::SaveFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    // === ACTIONS ===

    /// Apply any player action
    pub fn dispatch(&mut self, action: PlayerAction) -> Result<Vec<SimulationEvent>, ActionError> {
        match action {
            PlayerAction::Extinguish { cell, position } => self.extinguish(cell, position),
            PlayerAction::ManualRefill => self.manual_refill(),
            PlayerAction::BuyUpgrade(id) => self.buy_upgrade(id),
            PlayerAction::ActivateAreaClear => self.activate_area_clear(),
        }
    }

    /// Spray one cell. A safe cell is a no-op that costs nothing.
    pub fn extinguish(
        &mut self,
        cell: CellId,
        position: Option<ScreenPoint>,
    ) -> Result<Vec<SimulationEvent>, ActionError> {
        self.ensure_running()?;
        let fire_hp = self
            .grid
            .cell(cell)
            .ok_or(ActionError::UnknownCell(cell))?
            .fire_hp();
        if fire_hp == 0 {
            return Ok(Vec::new());
        }

        let stats = self.stats();
        let mut resources = self.store.state().resources;
        if let Err(e) = resources.spend(self.config.extinguish_cost) {
            self.haptics.notify(NotifyOutcome::Error);
            return Err(e);
        }
        if fire_hp as u32 <= stats.click_power {
            resources.credit(stats.extinguish_reward)?;
        }

        let outcome = self.grid.apply_damage(cell, stats.click_power)?;
        self.commit_resources(resources);
        self.haptics.impact(ImpactStyle::Light);

        let event = match outcome {
            DamageOutcome::Extinguished => {
                let total = self.store.state().fires_extinguished + 1;
                self.store.set(FieldValue::FiresExtinguished(total));
                self.haptics.notify(NotifyOutcome::Success);
                tracing::debug!(?cell, reward = stats.extinguish_reward, "Fire extinguished");
                SimulationEvent::FireExtinguished {
                    cell,
                    reward: stats.extinguish_reward,
                    position,
                }
            }
            DamageOutcome::Damaged { remaining } => SimulationEvent::CellDamaged {
                cell,
                remaining,
                position,
            },
            DamageOutcome::AlreadySafe => return Ok(Vec::new()),
        };
        Ok(vec![event])
    }

    /// Player-triggered water top-up
    pub fn manual_refill(&mut self) -> Result<Vec<SimulationEvent>, ActionError> {
        self.ensure_running()?;
        let mut resources = self.store.state().resources;
        let amount = self.economy.manual_refill(&mut resources)?;
        self.commit_resources(resources);
        self.haptics.select();
        Ok(vec![SimulationEvent::WaterRefilled { amount }])
    }

    /// Buy the next level of an upgrade, then save immediately
    pub fn buy_upgrade(&mut self, id: UpgradeId) -> Result<Vec<SimulationEvent>, ActionError> {
        self.ensure_running()?;
        let mut resources = self.store.state().resources;
        let mut levels = self.store.state().upgrades.clone();

        let purchase = match self
            .config
            .upgrades
            .purchase(id, &mut resources, &mut levels, &self.config)
        {
            Ok(purchase) => purchase,
            Err(e) => {
                self.haptics.notify(NotifyOutcome::Error);
                return Err(e);
            }
        };

        self.commit_resources(resources);
        self.store.set(FieldValue::Upgrades(levels));
        self.haptics.notify(NotifyOutcome::Success);
        tracing::info!(
            upgrade = %purchase.id,
            level = purchase.new_level,
            price = purchase.price,
            "Upgrade purchased"
        );

        Ok(vec![
            SimulationEvent::UpgradePurchased {
                id: purchase.id,
                level: purchase.new_level,
                price: purchase.price,
            },
            self.persist(),
        ])
    }

    /// Pay for rain; every burning cell goes out once the delay elapses
    pub fn activate_area_clear(&mut self) -> Result<Vec<SimulationEvent>, ActionError> {
        self.ensure_running()?;
        let mut resources = self.store.state().resources;
        if let Err(e) = resources.spend(self.config.area_clear_cost) {
            self.haptics.notify(NotifyOutcome::Error);
            return Err(e);
        }
        self.commit_resources(resources);
        self.haptics.notify(NotifyOutcome::Success);

        let delay = self.config.area_clear_delay();
        let mut events = vec![SimulationEvent::AreaClearStarted { resolves_in: delay }];
        if delay.is_zero() {
            self.resolve_area_clear(&mut events);
        } else {
            self.pending_clears.push(delay);
        }
        Ok(events)
    }

    /// Light a specific cell, or a random safe one. For hosts and scripted scenarios.
    pub fn ignite(&mut self, target: Option<CellId>) -> Result<CellId, ActionError> {
        self.ensure_running()?;
        self.grid.ignite(target, &mut self.rng)
    }

    /// Push changed resource fields through the store
    fn commit_resources(&mut self, resources: ResourceState) {
        let current = self.store.state().resources;
        if resources.water != current.water {
            self.store.set(FieldValue::Water(resources.water));
        }
        if resources.max_water != current.max_water {
            self.store.set(FieldValue::MaxWater(resources.max_water));
        }
        if resources.coins != current.coins {
            self.store.set(FieldValue::Coins(resources.coins));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn running(config: GameConfig) -> Simulation {
        let mut sim = Simulation::new(config, Box::new(MemoryStorage::new()));
        sim.start();
        sim
    }

    fn quiet_config() -> GameConfig {
        GameConfig {
            seed: Some(7),
            spread_base: 0.0,
            spread_burn_factor: 0.0,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_actions_rejected_before_start() {
        let mut sim = Simulation::new(quiet_config(), Box::new(MemoryStorage::new()));
        assert_eq!(sim.manual_refill(), Err(ActionError::NotRunning));
        assert!(sim.tick(Duration::from_millis(50)).is_empty());
        assert_eq!(sim.clock().ticks(), 0);
    }

    #[test]
    fn test_start_only_once() {
        let mut sim = running(quiet_config());
        assert_eq!(sim.phase(), SessionPhase::Running);
        assert!(sim.start().is_none());
    }

    #[test]
    fn test_tick_updates_burned_percent() {
        let mut sim = running(quiet_config());
        sim.ignite(Some(CellId(0))).unwrap();
        sim.ignite(Some(CellId(1))).unwrap();
        sim.tick(Duration::from_millis(50));
        assert_eq!(sim.state().burned_percent, 8);
    }

    #[test]
    fn test_spread_fires_when_certain() {
        let config = GameConfig {
            spread_base: 1.0,
            ..quiet_config()
        };
        let mut sim = running(config);
        let events = sim.tick(Duration::from_millis(50));
        assert!(matches!(events[0], SimulationEvent::FireStarted { .. }));
        assert_eq!(sim.grid().burning_count(), 1);
    }

    #[test]
    fn test_passive_income_accrues() {
        let mut sim = running(quiet_config());
        let mut levels = sim.state().upgrades.clone();
        levels.raise_to(UpgradeId::Station, 2);
        sim.store.set(FieldValue::Upgrades(levels));

        sim.tick(Duration::from_millis(500));

        assert!((sim.state().resources.coins - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_extinguish_unknown_cell() {
        let mut sim = running(quiet_config());
        assert_eq!(
            sim.extinguish(CellId(99), None),
            Err(ActionError::UnknownCell(CellId(99)))
        );
    }

    #[test]
    fn test_delayed_area_clear_resolves_after_delay() {
        let mut sim = running(quiet_config());
        sim.ignite(Some(CellId(3))).unwrap();

        let events = sim.activate_area_clear().unwrap();
        assert_eq!(
            events,
            vec![SimulationEvent::AreaClearStarted {
                resolves_in: Duration::from_secs(1)
            }]
        );
        assert_eq!(sim.grid().burning_count(), 1);

        sim.tick(Duration::from_millis(600));
        assert_eq!(sim.grid().burning_count(), 1);

        let events = sim.tick(Duration::from_millis(600));
        assert!(events.contains(&SimulationEvent::AreaClearResolved { cleared: 1 }));
        assert_eq!(sim.grid().burning_count(), 0);
        assert_eq!(sim.state().fires_extinguished, 1);
    }
}

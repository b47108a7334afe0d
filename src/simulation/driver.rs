//! Real-time tick driver
//!
//! Runs a `Simulation` on a tokio interval, interleaving queued player actions
//! between ticks. Actions and ticks are handled on one task, so an action
//! always sees a consistent state and is never split across a tick.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::core::config::GameConfig;
use crate::core::error::ActionError;
use crate::simulation::actions::PlayerAction;
use crate::simulation::controller::Simulation;
use crate::simulation::events::SimulationEvent;

/// Reported to the observer after every tick or action
#[derive(Debug, Clone, PartialEq)]
pub enum DriverUpdate {
    Tick(Vec<SimulationEvent>),
    Action {
        action: PlayerAction,
        result: Result<Vec<SimulationEvent>, ActionError>,
    },
}

/// Totals for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub ticks: u64,
    pub actions: u64,
}

/// Stops a running driver. Dropping the handle stops it too.
#[derive(Debug)]
pub struct StopHandle {
    tx: oneshot::Sender<()>,
}

impl StopHandle {
    pub fn stop(self) {
        let _ = self.tx.send(());
    }
}

#[derive(Debug)]
pub struct TickDriver {
    period: Duration,
    stop: oneshot::Receiver<()>,
}

impl TickDriver {
    pub fn new(period: Duration) -> (Self, StopHandle) {
        let (tx, rx) = oneshot::channel();
        let period = period.max(Duration::from_millis(1));
        (Self { period, stop: rx }, StopHandle { tx })
    }

    pub fn from_config(config: &GameConfig) -> (Self, StopHandle) {
        Self::new(config.tick_period())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drive `sim` until stopped. The simulation should already be started.
    ///
    /// Pending actions are applied before the next tick. A closed action
    /// channel does not stop the driver; only the stop handle does.
    pub async fn run<F>(
        mut self,
        sim: &mut Simulation,
        mut actions: mpsc::UnboundedReceiver<PlayerAction>,
        mut observer: F,
    ) -> DriverReport
    where
        F: FnMut(&Simulation, &DriverUpdate),
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick completes immediately and only marks the start
        let mut last = interval.tick().await;
        let mut report = DriverReport::default();
        let mut actions_open = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.stop => break,

                action = actions.recv(), if actions_open => match action {
                    Some(action) => {
                        let result = sim.dispatch(action.clone());
                        if let Err(e) = &result {
                            tracing::debug!(?action, "Action rejected: {}", e);
                        }
                        report.actions += 1;
                        observer(sim, &DriverUpdate::Action { action, result });
                    }
                    None => actions_open = false,
                },

                now = interval.tick() => {
                    let dt = now.duration_since(last);
                    last = now;
                    let events = sim.tick(dt);
                    report.ticks += 1;
                    observer(sim, &DriverUpdate::Tick(events));
                }
            }
        }

        tracing::info!(ticks = report.ticks, actions = report.actions, "Tick driver stopped");
        report
    }
}

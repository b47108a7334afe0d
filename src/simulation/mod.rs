//! Simulation layer - tick sequencing, player actions and the tick driver

pub mod actions;
pub mod controller;
pub mod driver;
pub mod events;

pub use actions::PlayerAction;
pub use controller::{SessionPhase, Simulation};
pub use driver::{DriverReport, DriverUpdate, StopHandle, TickDriver};
pub use events::SimulationEvent;

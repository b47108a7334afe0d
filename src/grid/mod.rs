//! Grid layer - building plots and the fire automaton

pub mod automaton;
pub mod cell;

pub use automaton::{spread_probability, Grid};
pub use cell::{Cell, DamageOutcome, FireState, MAX_FIRE_HP};

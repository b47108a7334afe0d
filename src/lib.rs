//! FireHero - Incremental fire-fighting simulation
//!
//! A grid of building plots catches fire over time. The player spends water
//! to put fires out, earns coins, and buys upgrades that raise click power,
//! tank capacity and passive income. State lives in a reactive store and is
//! persisted as a JSON snapshot.

pub mod core;
pub mod economy;
pub mod feedback;
pub mod grid;
pub mod persistence;
pub mod simulation;
pub mod store;

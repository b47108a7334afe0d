//! Observable game state
//!
//! The store owns the canonical values that observers care about. Every
//! mutation goes through `ReactiveStore::set`, which notifies subscribers of
//! that field synchronously, so views never poll and never drift.

pub mod reactive;
pub mod state;

pub use reactive::{ReactiveStore, SubscriptionId};
pub use state::{Field, FieldValue, GameState};

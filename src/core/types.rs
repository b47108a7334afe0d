//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable identifier of a cell in the grid arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for CellId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Screen position supplied by the input layer, passed through to events
/// so effects can be spawned where the player tapped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

//! Fire automaton over a fixed arena of cells
//!
//! Cells are addressed by `CellId`, an index into the arena. Renderers keep
//! their own mapping from view elements to ids.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::ActionError;
use crate::core::types::CellId;
use crate::grid::cell::{Cell, DamageOutcome};

/// Ordered, fixed-size collection of cells
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of `size` safe cells
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![Cell::new(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (CellId::from(i), cell))
    }

    pub fn burning_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_burning()).count()
    }

    /// Burning cells / grid size
    pub fn burned_fraction(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.burning_count() as f64 / self.cells.len() as f64
    }

    fn safe_cells(&self) -> Vec<CellId> {
        self.iter()
            .filter(|(_, cell)| !cell.is_burning())
            .map(|(id, _)| id)
            .collect()
    }

    /// Ignite `target`, or a uniformly random safe cell when `None`
    pub fn ignite<R: Rng + ?Sized>(
        &mut self,
        target: Option<CellId>,
        rng: &mut R,
    ) -> Result<CellId, ActionError> {
        let id = match target {
            Some(id) => id,
            None => *self
                .safe_cells()
                .choose(rng)
                .ok_or(ActionError::NoSafeCellsAvailable)?,
        };

        let cell = self
            .cells
            .get_mut(id.index())
            .ok_or(ActionError::UnknownCell(id))?;
        if !cell.ignite() {
            return Err(ActionError::CellNotSafe(id));
        }
        Ok(id)
    }

    /// Reduce a cell's fire hp by `amount`, never below zero
    pub fn apply_damage(&mut self, id: CellId, amount: u32) -> Result<DamageOutcome, ActionError> {
        let cell = self
            .cells
            .get_mut(id.index())
            .ok_or(ActionError::UnknownCell(id))?;
        Ok(cell.apply_damage(amount))
    }

    /// One spread roll: with probability `p`, ignite a random safe cell.
    ///
    /// A single trial per tick gates at most one new fire.
    pub fn spread_tick<R: Rng + ?Sized>(&mut self, p: f64, rng: &mut R) -> Option<CellId> {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        if !rng.gen_bool(p) {
            return None;
        }
        if self.burning_count() >= self.cells.len() {
            return None;
        }
        self.ignite(None, rng).ok()
    }

    /// Put out every burning cell, returning the ids that were burning
    pub fn extinguish_all(&mut self) -> Vec<CellId> {
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(|(i, cell)| cell.extinguish().then(|| CellId::from(i)))
            .collect()
    }
}

/// Spread probability for the current burned fraction, clamped to [0, 1]
pub fn spread_probability(base: f64, burn_factor: f64, burned_fraction: f64) -> f64 {
    (base + burned_fraction * burn_factor).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::MAX_FIRE_HP;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_ignite_lights_one_cell() {
        let mut grid = Grid::new(25);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let id = grid.ignite(None, &mut rng).unwrap();

        assert_eq!(grid.cell(id).unwrap().fire_hp(), MAX_FIRE_HP);
        assert_eq!(grid.burning_count(), 1);
        assert!((grid.burned_fraction() - 1.0 / 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_ignite_full_grid_fails() {
        let mut grid = Grid::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..3 {
            grid.ignite(None, &mut rng).unwrap();
        }
        assert_eq!(
            grid.ignite(None, &mut rng),
            Err(ActionError::NoSafeCellsAvailable)
        );
    }

    #[test]
    fn test_targeted_ignite() {
        let mut grid = Grid::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(grid.ignite(Some(CellId(2)), &mut rng), Ok(CellId(2)));
        assert_eq!(
            grid.ignite(Some(CellId(2)), &mut rng),
            Err(ActionError::CellNotSafe(CellId(2)))
        );
        assert_eq!(
            grid.ignite(Some(CellId(9)), &mut rng),
            Err(ActionError::UnknownCell(CellId(9)))
        );
    }

    #[test]
    fn test_damage_unknown_cell() {
        let mut grid = Grid::new(4);
        assert_eq!(
            grid.apply_damage(CellId(4), 10),
            Err(ActionError::UnknownCell(CellId(4)))
        );
    }

    #[test]
    fn test_spread_certain_and_never() {
        let mut grid = Grid::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert!(grid.spread_tick(0.0, &mut rng).is_none());
        assert_eq!(grid.burning_count(), 0);

        for expected in 1..=5 {
            assert!(grid.spread_tick(1.0, &mut rng).is_some());
            assert_eq!(grid.burning_count(), expected);
        }

        // Saturated grid is a no-op
        assert!(grid.spread_tick(1.0, &mut rng).is_none());
    }

    #[test]
    fn test_extinguish_all() {
        let mut grid = Grid::new(6);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        grid.ignite(Some(CellId(1)), &mut rng).unwrap();
        grid.ignite(Some(CellId(4)), &mut rng).unwrap();

        assert_eq!(grid.extinguish_all(), vec![CellId(1), CellId(4)]);
        assert_eq!(grid.burning_count(), 0);
        assert!(grid.extinguish_all().is_empty());
    }

    #[test]
    fn test_spread_probability_rises_with_burn() {
        assert_eq!(spread_probability(0.05, 0.5, 0.0), 0.05);
        assert!((spread_probability(0.05, 0.5, 0.5) - 0.3).abs() < 1e-12);
        assert_eq!(spread_probability(0.9, 0.5, 1.0), 1.0);
    }
}

//! Occupancy grid and hazard-buffer rasterization.

use crate::models::{GridCell, Hazard};
use crate::rules::SafetyRules;
use crate::spatial::Projector;

/// Free/blocked map over the planning area, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    /// Allocate an all-free grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            blocked: vec![false; rows * cols],
        }
    }

    pub fn from_rules(rules: &SafetyRules) -> Self {
        Self::new(rules.grid_rows, rules.grid_cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell: &GridCell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Flat index of an in-bounds cell.
    pub fn index(&self, cell: &GridCell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn cell_at(&self, index: usize) -> GridCell {
        GridCell {
            row: index / self.cols,
            col: index % self.cols,
        }
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: &GridCell) -> bool {
        !self.contains(cell) || self.blocked[self.index(cell)]
    }

    pub fn block(&mut self, cell: &GridCell) {
        if self.contains(cell) {
            let idx = self.index(cell);
            self.blocked[idx] = true;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }

    /// Block the square of half-width `radius` around `center`, clipped to bounds.
    pub fn block_square(&mut self, center: &GridCell, radius: usize) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let row_lo = center.row.saturating_sub(radius);
        let row_hi = center.row.saturating_add(radius).min(self.rows - 1);
        let col_lo = center.col.saturating_sub(radius);
        let col_hi = center.col.saturating_add(radius).min(self.cols - 1);
        if row_lo > row_hi || col_lo > col_hi {
            return;
        }
        for row in row_lo..=row_hi {
            let base = row * self.cols;
            self.blocked[base + col_lo..=base + col_hi].fill(true);
        }
    }

    /// Mark the exclusion zone of every hazard as blocked.
    ///
    /// Blocking is a set union, so overlapping buffers and processing order
    /// do not change the result. Route endpoints are not exempted.
    pub fn rasterize(&mut self, hazards: &[Hazard], projector: &Projector, buffer_radius: usize) {
        for hazard in hazards {
            let center = projector.to_grid(&hazard.position);
            self.block_square(&center, buffer_radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::spatial::Origin;

    fn small_rules() -> SafetyRules {
        SafetyRules::default().with_grid_size(100)
    }

    fn projector(rules: &SafetyRules) -> Projector {
        let start = GeoPoint::new(21.0, 39.0);
        let goal = GeoPoint::new(21.001, 39.001);
        Projector::new(Origin::from_endpoints(&start, &goal), rules)
    }

    #[test]
    fn hazard_blocks_square_buffer() {
        let rules = small_rules();
        let projector = projector(&rules);
        let mut grid = OccupancyGrid::from_rules(&rules);
        grid.rasterize(&[Hazard::new(21.0005, 39.0005)], &projector, 2);

        assert_eq!(grid.blocked_count(), 25);
        for row in 26..=30 {
            for col in 24..=28 {
                assert!(grid.is_blocked(&GridCell::new(row, col)));
            }
        }
        assert!(!grid.is_blocked(&GridCell::new(25, 26)));
        assert!(!grid.is_blocked(&GridCell::new(28, 29)));
    }

    #[test]
    fn buffer_is_clipped_at_grid_corner() {
        let rules = small_rules();
        let projector = projector(&rules);
        let mut grid = OccupancyGrid::from_rules(&rules);
        // South-west of the origin: clamps to (0, 0).
        grid.rasterize(&[Hazard::new(20.9, 38.9)], &projector, 2);
        assert_eq!(grid.blocked_count(), 9);
        assert!(grid.is_blocked(&GridCell::new(0, 0)));
        assert!(grid.is_blocked(&GridCell::new(2, 2)));
        assert!(!grid.is_blocked(&GridCell::new(3, 0)));
    }

    #[test]
    fn rasterization_is_order_independent() {
        let rules = small_rules();
        let projector = projector(&rules);
        let hazards = vec![
            Hazard::new(21.0005, 39.0005),
            Hazard::new(21.0002, 39.0006),
            Hazard::new(21.00051, 39.00049),
            Hazard::new(21.0009, 39.0001),
        ];

        let mut forward = OccupancyGrid::from_rules(&rules);
        forward.rasterize(&hazards, &projector, 2);

        let mut reversed_hazards = hazards.clone();
        reversed_hazards.reverse();
        let mut reversed = OccupancyGrid::from_rules(&rules);
        reversed.rasterize(&reversed_hazards, &projector, 2);

        let mut rotated_hazards = hazards.clone();
        rotated_hazards.rotate_left(1);
        let mut rotated = OccupancyGrid::from_rules(&rules);
        rotated.rasterize(&rotated_hazards, &projector, 2);

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);

        let mut twice = forward.clone();
        twice.rasterize(&hazards, &projector, 2);
        assert_eq!(forward, twice);
    }

    #[test]
    fn zero_radius_blocks_single_cell() {
        let mut grid = OccupancyGrid::new(10, 10);
        grid.block_square(&GridCell::new(4, 7), 0);
        assert_eq!(grid.blocked_count(), 1);
        assert!(grid.is_blocked(&GridCell::new(4, 7)));
    }

    #[test]
    fn out_of_bounds_cells_are_blocked() {
        let grid = OccupancyGrid::new(5, 5);
        assert!(grid.is_blocked(&GridCell::new(5, 0)));
        assert!(grid.is_blocked(&GridCell::new(0, 5)));
        assert!(!grid.is_blocked(&GridCell::new(4, 4)));
    }
}

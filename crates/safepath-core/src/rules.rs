//! Safety rules and grid parameters for a planning request.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// Approximate meters per degree of latitude used by the equirectangular projection.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Largest grid the engine will allocate. Search state costs about ten bytes per cell.
pub const MAX_GRID_CELLS: usize = 100_000_000;

/// Immutable configuration passed into every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRules {
    /// Number of grid rows (north/south extent)
    pub grid_rows: usize,
    /// Number of grid columns (east/west extent)
    pub grid_cols: usize,
    /// Side length of one square cell in meters
    pub cell_size_m: f64,
    /// Meters per degree of latitude
    pub meters_per_deg_lat: f64,
    /// Half-width of the square exclusion zone around each hazard, in cells
    pub buffer_radius_cells: usize,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            grid_rows: 2000,
            grid_cols: 2000,
            cell_size_m: 2.0,
            meters_per_deg_lat: METERS_PER_DEG_LAT,
            buffer_radius_cells: 2,
        }
    }
}

impl SafetyRules {
    /// Builder-style setter for a square grid extent.
    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_rows = size;
        self.grid_cols = size;
        self
    }

    /// Builder-style setter for the cell size.
    pub fn with_cell_size(mut self, cell_size_m: f64) -> Self {
        self.cell_size_m = cell_size_m;
        self
    }

    /// Builder-style setter for the hazard buffer radius.
    pub fn with_buffer_radius(mut self, cells: usize) -> Self {
        self.buffer_radius_cells = cells;
        self
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.grid_rows.saturating_mul(self.grid_cols)
    }

    /// Reject parameters the engine cannot operate on.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(PlanError::InvalidRules("grid extent must be non-zero".into()));
        }
        if self.grid_rows.checked_mul(self.grid_cols).map_or(true, |n| n > MAX_GRID_CELLS) {
            return Err(PlanError::InvalidRules(format!(
                "grid {}x{} exceeds the {} cell limit",
                self.grid_rows, self.grid_cols, MAX_GRID_CELLS
            )));
        }
        if !(self.cell_size_m.is_finite() && self.cell_size_m > 0.0) {
            return Err(PlanError::InvalidRules(format!(
                "cell size must be positive, got {}",
                self.cell_size_m
            )));
        }
        if !(self.meters_per_deg_lat.is_finite() && self.meters_per_deg_lat > 0.0) {
            return Err(PlanError::InvalidRules(
                "meters per degree must be positive".into(),
            ));
        }
        Ok(())
    }
}

//! Geodetic projection between geographic coordinates and grid cells.
//!
//! Uses an equirectangular approximation anchored at a per-request origin:
//! one degree of latitude is a fixed number of meters, and longitude is scaled
//! by the cosine of the origin latitude. This is accurate at the local scale
//! the grid covers (a few kilometers) but is not geodesically exact over long
//! distances.

use crate::models::{GeoPoint, GridCell};
use crate::rules::SafetyRules;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Reference point anchoring the planar projection for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
}

impl Origin {
    /// Minimum latitude and minimum longitude over the two route endpoints.
    ///
    /// Hazards never move the origin.
    pub fn from_endpoints(start: &GeoPoint, goal: &GeoPoint) -> Self {
        Self {
            latitude: start.latitude.min(goal.latitude),
            longitude: start.longitude.min(goal.longitude),
        }
    }
}

/// Forward and inverse mapping for a fixed origin and grid.
#[derive(Debug, Clone)]
pub struct Projector {
    origin: Origin,
    rows: usize,
    cols: usize,
    cell_size_m: f64,
    meters_per_deg_lat: f64,
    meters_per_deg_lon: f64,
}

impl Projector {
    pub fn new(origin: Origin, rules: &SafetyRules) -> Self {
        let meters_per_deg_lon =
            (rules.meters_per_deg_lat * origin.latitude.to_radians().cos()).max(1e-9);
        Self {
            origin,
            rows: rules.grid_rows,
            cols: rules.grid_cols,
            cell_size_m: rules.cell_size_m,
            meters_per_deg_lat: rules.meters_per_deg_lat,
            meters_per_deg_lon,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Project a point onto the grid, clamping to the grid boundary.
    ///
    /// Out-of-range input is not rejected: a point south/west of the origin
    /// lands on row/col 0, a point beyond the far edge lands on the last index.
    pub fn to_grid(&self, point: &GeoPoint) -> GridCell {
        let row = (point.latitude - self.origin.latitude) * self.meters_per_deg_lat
            / self.cell_size_m;
        let col = (point.longitude - self.origin.longitude) * self.meters_per_deg_lon
            / self.cell_size_m;
        GridCell {
            row: clamp_index(row, self.rows),
            col: clamp_index(col, self.cols),
        }
    }

    /// Inverse of the unclamped forward mapping.
    pub fn to_geo(&self, cell: &GridCell) -> GeoPoint {
        GeoPoint {
            latitude: self.origin.latitude
                + cell.row as f64 * self.cell_size_m / self.meters_per_deg_lat,
            longitude: self.origin.longitude
                + cell.col as f64 * self.cell_size_m / self.meters_per_deg_lon,
        }
    }
}

fn clamp_index(value: f64, extent: usize) -> usize {
    let max = extent.saturating_sub(1) as f64;
    // NaN saturates to 0 on the cast.
    value.round().clamp(0.0, max) as usize
}

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Total great-circle length of a polyline in meters.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| {
            haversine_distance(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            )
        })
        .sum()
}

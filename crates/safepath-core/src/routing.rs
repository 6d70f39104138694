//! Path assembly and the planning entry point.

use crate::error::PlanError;
use crate::models::{GeoPoint, Hazard, PlanRequest, PlanResult};
use crate::occupancy::OccupancyGrid;
use crate::route_engine::{search, SearchOutcome};
use crate::rules::SafetyRules;
use crate::spatial::{path_length_m, Origin, Projector};

/// Plan a route from `request.start` to `request.goal` that keeps every
/// waypoint outside the buffer of every hazard.
///
/// Either returns a complete, validated plan or an error; nothing partial.
pub fn plan_safe_path(request: &PlanRequest, rules: &SafetyRules) -> Result<PlanResult, PlanError> {
    rules.validate()?;
    check_endpoint("start", &request.start)?;
    check_endpoint("end", &request.goal)?;

    let origin = Origin::from_endpoints(&request.start, &request.goal);
    let projector = Projector::new(origin, rules);

    let mut grid = OccupancyGrid::from_rules(rules);
    grid.rasterize(&request.hazards, &projector, rules.buffer_radius_cells);

    let start = projector.to_grid(&request.start);
    let goal = projector.to_grid(&request.goal);
    tracing::debug!(
        origin_lat = origin.latitude,
        origin_lon = origin.longitude,
        ?start,
        ?goal,
        hazards = request.hazards.len(),
        blocked_cells = grid.blocked_count(),
        "rasterized hazard buffers"
    );

    let outcome = search(&grid, start, goal)?;
    let result = assemble(&outcome, &grid, &projector, &request.hazards)?;

    tracing::info!(
        cells = result.grid_path.len(),
        nodes_expanded = outcome.nodes_expanded,
        length_m = path_length_m(&result.safe_path),
        hazards = result.hazard_count,
        "safe path planned"
    );
    Ok(result)
}

/// Convert a search outcome into a geographic plan.
///
/// Every cell is re-checked against the grid it was searched on; a blocked
/// or non-adjacent step means the search and rasterizer disagree, which is
/// fatal.
pub fn assemble(
    outcome: &SearchOutcome,
    grid: &OccupancyGrid,
    projector: &Projector,
    hazards: &[Hazard],
) -> Result<PlanResult, PlanError> {
    if outcome.path.is_empty() {
        return Err(PlanError::InternalConsistency("search returned an empty path".into()));
    }
    if let Some(cell) = outcome.path.iter().find(|cell| grid.is_blocked(cell)) {
        return Err(PlanError::InternalConsistency(format!(
            "path enters blocked cell ({}, {})",
            cell.row, cell.col
        )));
    }
    if let Some(pair) = outcome.path.windows(2).find(|pair| pair[0].chebyshev(&pair[1]) != 1) {
        return Err(PlanError::InternalConsistency(format!(
            "path jumps from ({}, {}) to ({}, {})",
            pair[0].row, pair[0].col, pair[1].row, pair[1].col
        )));
    }

    Ok(PlanResult {
        safe_path: outcome.path.iter().map(|cell| projector.to_geo(cell)).collect(),
        grid_path: outcome.path.clone(),
        hazard_count: hazards.len(),
        hazards: hazards.to_vec(),
    })
}

fn check_endpoint(field: &str, point: &GeoPoint) -> Result<(), PlanError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(PlanError::InvalidCoordinate {
            field: field.to_string(),
            lat: point.latitude,
            lon: point.longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridCell;

    fn projector(rules: &SafetyRules) -> Projector {
        Projector::new(
            Origin::from_endpoints(&GeoPoint::new(21.0, 39.0), &GeoPoint::new(21.001, 39.001)),
            rules,
        )
    }

    #[test]
    fn assemble_rejects_path_through_blocked_cell() {
        let rules = SafetyRules::default().with_grid_size(10);
        let mut grid = OccupancyGrid::from_rules(&rules);
        grid.block(&GridCell::new(1, 1));
        let outcome = SearchOutcome {
            path: vec![GridCell::new(0, 0), GridCell::new(1, 1), GridCell::new(2, 2)],
            nodes_expanded: 3,
        };
        let err = assemble(&outcome, &grid, &projector(&rules), &[]).unwrap_err();
        assert!(matches!(err, PlanError::InternalConsistency(_)));
    }

    #[test]
    fn assemble_rejects_disconnected_path() {
        let rules = SafetyRules::default().with_grid_size(10);
        let grid = OccupancyGrid::from_rules(&rules);
        let outcome = SearchOutcome {
            path: vec![GridCell::new(0, 0), GridCell::new(2, 2)],
            nodes_expanded: 2,
        };
        let err = assemble(&outcome, &grid, &projector(&rules), &[]).unwrap_err();
        assert!(matches!(err, PlanError::InternalConsistency(_)));
    }

    #[test]
    fn assemble_echoes_hazards_and_projects_cells() {
        let rules = SafetyRules::default().with_grid_size(10);
        let grid = OccupancyGrid::from_rules(&rules);
        let projector = projector(&rules);
        let hazards = vec![Hazard::new(21.5, 39.5).with_source("far-away")];
        let outcome = SearchOutcome {
            path: vec![GridCell::new(0, 0), GridCell::new(1, 1)],
            nodes_expanded: 2,
        };
        let result = assemble(&outcome, &grid, &projector, &hazards).unwrap();
        assert_eq!(result.hazard_count, 1);
        assert_eq!(result.hazards, hazards);
        assert_eq!(result.safe_path[0], GeoPoint::new(21.0, 39.0));
        assert_eq!(result.safe_path[1], projector.to_geo(&GridCell::new(1, 1)));
    }

    #[test]
    fn invalid_endpoint_is_rejected_before_search() {
        let request = PlanRequest {
            start: GeoPoint::new(91.0, 39.0),
            goal: GeoPoint::new(21.0, 39.0),
            hazards: Vec::new(),
        };
        let err = plan_safe_path(&request, &SafetyRules::default()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidCoordinate { ref field, .. } if field == "start"));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let request = PlanRequest {
            start: GeoPoint::new(21.0, 39.0),
            goal: GeoPoint::new(21.001, 39.001),
            hazards: Vec::new(),
        };
        let rules = SafetyRules::default().with_cell_size(-1.0);
        assert!(matches!(
            plan_safe_path(&request, &rules),
            Err(PlanError::InvalidRules(_))
        ));
    }
}

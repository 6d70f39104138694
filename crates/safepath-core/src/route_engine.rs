//! Best-first grid search over a rasterized occupancy grid.
//!
//! Movement is 8-directional with unit step cost, and the frontier is ordered
//! by `f = g + h` with `h` the Manhattan distance to the goal. Diagonal and
//! orthogonal steps cost the same, so the result minimizes grid steps, not
//! metric length, and the Manhattan estimate can exceed the true remaining
//! step count on diagonals. Closed cells are never reopened; the search is an
//! accepted approximation rather than a guaranteed optimum.
//!
//! Ties on `f` are broken by insertion order, and neighbours are expanded in a
//! fixed order, so the same grid and endpoints always produce the same path.
//! There is no built-in step budget: a nearly fully blocked grid forces a
//! near-exhaustive search, and callers needing bounded latency must impose
//! their own deadline.

use crate::error::PlanError;
use crate::models::GridCell;
use crate::occupancy::OccupancyGrid;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// N, S, W, E, NW, NE, SW, SE.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

const UNSEEN_G: u32 = u32::MAX;
const NO_PARENT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CellState {
    #[default]
    Unseen,
    Open,
    Closed,
}

/// Frontier entry. Field order defines the ordering: `f`, then insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f_score: u32,
    sequence: u64,
    index: u32,
}

/// Path found by the search, start to goal inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub path: Vec<GridCell>,
    pub nodes_expanded: usize,
}

/// Per-cell search bookkeeping, flat arrays indexed like the grid.
struct SearchState {
    g_score: Vec<u32>,
    came_from: Vec<u32>,
    state: Vec<CellState>,
}

impl SearchState {
    fn new(cells: usize) -> Self {
        Self {
            g_score: vec![UNSEEN_G; cells],
            came_from: vec![NO_PARENT; cells],
            state: vec![CellState::Unseen; cells],
        }
    }
}

/// Find a path from `start` to `goal` that only visits unblocked cells.
///
/// A blocked start or goal fails immediately with [`PlanError::NoPathFound`]
/// rather than searching out of (or into) a hazard buffer.
pub fn search(
    grid: &OccupancyGrid,
    start: GridCell,
    goal: GridCell,
) -> Result<SearchOutcome, PlanError> {
    if !grid.contains(&start) || !grid.contains(&goal) {
        return Err(PlanError::InternalConsistency(format!(
            "search endpoints {start:?} -> {goal:?} outside {}x{} grid",
            grid.rows(),
            grid.cols()
        )));
    }
    if grid.is_blocked(&start) {
        tracing::debug!(?start, "start cell is inside a hazard buffer");
        return Err(PlanError::NoPathFound);
    }
    if grid.is_blocked(&goal) {
        tracing::debug!(?goal, "goal cell is inside a hazard buffer");
        return Err(PlanError::NoPathFound);
    }
    if start == goal {
        return Ok(SearchOutcome {
            path: vec![start],
            nodes_expanded: 1,
        });
    }

    let rows = grid.rows() as isize;
    let cols = grid.cols() as isize;
    let start_idx = grid.index(&start);
    let goal_idx = grid.index(&goal);

    let mut search_state = SearchState::new(grid.rows() * grid.cols());
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    let mut sequence = 0u64;

    search_state.g_score[start_idx] = 0;
    search_state.state[start_idx] = CellState::Open;
    open_set.push(Reverse(OpenNode {
        f_score: heuristic(&start, &goal),
        sequence,
        index: start_idx as u32,
    }));

    let mut nodes_expanded = 0usize;

    while let Some(Reverse(current)) = open_set.pop() {
        let current_idx = current.index as usize;
        if search_state.state[current_idx] == CellState::Closed {
            continue;
        }

        nodes_expanded += 1;
        if current_idx == goal_idx {
            let path = reconstruct_path(grid, &search_state, start_idx, goal_idx)?;
            return Ok(SearchOutcome {
                path,
                nodes_expanded,
            });
        }

        search_state.state[current_idx] = CellState::Closed;
        let current_cell = grid.cell_at(current_idx);
        let current_g = search_state.g_score[current_idx];

        for (dr, dc) in NEIGHBOR_OFFSETS {
            let row = current_cell.row as isize + dr;
            let col = current_cell.col as isize + dc;
            if row < 0 || row >= rows || col < 0 || col >= cols {
                continue;
            }
            let neighbor = GridCell::new(row as usize, col as usize);
            let neighbor_idx = grid.index(&neighbor);
            if grid.is_blocked(&neighbor)
                || search_state.state[neighbor_idx] == CellState::Closed
            {
                continue;
            }

            let tentative_g = current_g + 1;
            if tentative_g < search_state.g_score[neighbor_idx] {
                search_state.came_from[neighbor_idx] = current_idx as u32;
                search_state.g_score[neighbor_idx] = tentative_g;
                search_state.state[neighbor_idx] = CellState::Open;
                sequence += 1;
                open_set.push(Reverse(OpenNode {
                    f_score: tentative_g + heuristic(&neighbor, &goal),
                    sequence,
                    index: neighbor_idx as u32,
                }));
            }
        }
    }

    tracing::debug!(nodes_expanded, "frontier exhausted before reaching goal");
    Err(PlanError::NoPathFound)
}

fn heuristic(cell: &GridCell, goal: &GridCell) -> u32 {
    cell.manhattan(goal) as u32
}

fn reconstruct_path(
    grid: &OccupancyGrid,
    search_state: &SearchState,
    start_idx: usize,
    goal_idx: usize,
) -> Result<Vec<GridCell>, PlanError> {
    let mut path = vec![grid.cell_at(goal_idx)];
    let mut current = goal_idx;
    while current != start_idx {
        let parent = search_state.came_from[current];
        if parent == NO_PARENT || path.len() > search_state.came_from.len() {
            return Err(PlanError::InternalConsistency(format!(
                "broken predecessor chain at {:?}",
                grid.cell_at(current)
            )));
        }
        current = parent as usize;
        path.push(grid.cell_at(current));
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(path: &[GridCell]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].chebyshev(&pair[1]), 1, "gap between {:?}", pair);
        }
    }

    #[test]
    fn empty_grid_yields_chebyshev_staircase() {
        let grid = OccupancyGrid::new(60, 60);
        for (start, goal) in [
            (GridCell::new(0, 0), GridCell::new(56, 52)),
            (GridCell::new(10, 40), GridCell::new(30, 5)),
            (GridCell::new(50, 50), GridCell::new(50, 10)),
            (GridCell::new(59, 0), GridCell::new(0, 59)),
        ] {
            let outcome = search(&grid, start, goal).unwrap();
            assert_eq!(outcome.path.len(), start.chebyshev(&goal) + 1);
            assert_eq!(outcome.path.first(), Some(&start));
            assert_eq!(outcome.path.last(), Some(&goal));
            assert_contiguous(&outcome.path);
        }
    }

    #[test]
    fn routes_through_gap_in_wall() {
        let mut grid = OccupancyGrid::new(10, 10);
        for row in 0..9 {
            grid.block(&GridCell::new(row, 5));
        }
        let outcome = search(&grid, GridCell::new(0, 0), GridCell::new(0, 9)).unwrap();
        assert!(outcome.path.contains(&GridCell::new(9, 5)));
        assert!(outcome.path.iter().all(|cell| !grid.is_blocked(cell)));
        assert_contiguous(&outcome.path);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let mut grid = OccupancyGrid::new(40, 40);
        grid.block_square(&GridCell::new(20, 20), 4);
        grid.block_square(&GridCell::new(8, 30), 2);
        let first = search(&grid, GridCell::new(2, 2), GridCell::new(37, 35)).unwrap();
        for _ in 0..5 {
            let again = search(&grid, GridCell::new(2, 2), GridCell::new(37, 35)).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn blocked_start_fails_closed() {
        let mut grid = OccupancyGrid::new(20, 20);
        grid.block_square(&GridCell::new(0, 0), 2);
        assert_eq!(
            search(&grid, GridCell::new(1, 1), GridCell::new(15, 15)),
            Err(PlanError::NoPathFound)
        );
    }

    #[test]
    fn blocked_goal_fails_closed() {
        let mut grid = OccupancyGrid::new(20, 20);
        grid.block_square(&GridCell::new(15, 15), 1);
        assert_eq!(
            search(&grid, GridCell::new(0, 0), GridCell::new(15, 15)),
            Err(PlanError::NoPathFound)
        );
    }

    #[test]
    fn enclosed_goal_exhausts_frontier() {
        // Ring of blocked cells; the goal itself stays free.
        let mut walled = OccupancyGrid::new(20, 20);
        for row in 7..=13 {
            for col in 7..=13 {
                let cell = GridCell::new(row, col);
                if cell.chebyshev(&GridCell::new(10, 10)) == 3 {
                    walled.block(&cell);
                }
            }
        }
        assert_eq!(
            search(&walled, GridCell::new(0, 0), GridCell::new(10, 10)),
            Err(PlanError::NoPathFound)
        );
    }

    #[test]
    fn start_equal_to_goal_is_single_cell() {
        let grid = OccupancyGrid::new(5, 5);
        let outcome = search(&grid, GridCell::new(2, 3), GridCell::new(2, 3)).unwrap();
        assert_eq!(outcome.path, vec![GridCell::new(2, 3)]);
    }

    #[test]
    fn endpoints_outside_grid_are_contract_violations() {
        let grid = OccupancyGrid::new(5, 5);
        assert!(matches!(
            search(&grid, GridCell::new(0, 0), GridCell::new(5, 0)),
            Err(PlanError::InternalConsistency(_))
        ));
    }
}

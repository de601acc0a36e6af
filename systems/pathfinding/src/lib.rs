#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that finds the shortest walkable route between two units.
//!
//! The search is a uniform-cost (Dijkstra) expansion over the 4-connected
//! battlefield grid. Every live unit other than the attacker and its target
//! blocks the cell it stands on. Routes exclude the attacker's own cell and end
//! on the target's cell; an empty route means the target cannot be reached.

use std::{cmp::Reverse, collections::BinaryHeap};

use grid_battle_core::{CellCoord, GridDimensions, Unit};
use tracing::{debug, trace};

const UNREACHED: u32 = u32::MAX;

/// Shortest-path search that reuses scratch buffers between requests.
///
/// Every request resets the obstacle snapshot, distance, visited and
/// predecessor grids before searching, so no state leaks from one turn into
/// the next. Hosts that search in parallel create one pathfinder per worker.
#[derive(Debug)]
pub struct Pathfinder {
    dimensions: GridDimensions,
    blocked: Vec<bool>,
    distances: Vec<u32>,
    visited: Vec<bool>,
    predecessors: Vec<Option<CellCoord>>,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
}

impl Pathfinder {
    /// Creates a pathfinder for grids of the provided dimensions.
    #[must_use]
    pub fn new(dimensions: GridDimensions) -> Self {
        let cell_count = dimensions.cell_count();
        Self {
            dimensions,
            blocked: vec![false; cell_count],
            distances: vec![UNREACHED; cell_count],
            visited: vec![false; cell_count],
            predecessors: vec![None; cell_count],
            frontier: BinaryHeap::new(),
        }
    }

    /// Grid the pathfinder searches.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Computes the shortest route from `attacker` to `target`.
    ///
    /// `units` is the complete roster of both sides, dead units included. The
    /// returned cells start next to the attacker and end on the target's cell.
    /// Adjacent units yield a single-cell route. Unreachable targets, and
    /// units standing outside the grid, yield an empty route.
    pub fn find_path(&mut self, attacker: &Unit, target: &Unit, units: &[Unit]) -> Vec<CellCoord> {
        let start = attacker.cell();
        let goal = target.cell();
        let (Some(start_index), Some(goal_index)) =
            (self.dimensions.index(start), self.dimensions.index(goal))
        else {
            debug!(
                attacker = ?attacker.id(),
                target = ?target.id(),
                "path request references a cell outside the grid"
            );
            return Vec::new();
        };

        self.reset();
        self.snapshot_obstacles(attacker, target, units);
        self.search(start, start_index, goal);
        let path = self.reconstruct(goal, goal_index);

        if path.is_empty() {
            debug!(attacker = ?attacker.id(), target = ?target.id(), "target unreachable");
        } else {
            trace!(
                attacker = ?attacker.id(),
                target = ?target.id(),
                length = path.len(),
                "path found"
            );
        }

        path
    }

    fn reset(&mut self) {
        self.blocked.fill(false);
        self.distances.fill(UNREACHED);
        self.visited.fill(false);
        self.predecessors.fill(None);
        self.frontier.clear();
    }

    fn snapshot_obstacles(&mut self, attacker: &Unit, target: &Unit, units: &[Unit]) {
        for unit in units {
            if !unit.is_alive() || unit.id() == attacker.id() || unit.id() == target.id() {
                continue;
            }

            // Endpoints stay open even when another unit shares them.
            if unit.cell() == attacker.cell() || unit.cell() == target.cell() {
                continue;
            }

            if let Some(index) = self.dimensions.index(unit.cell()) {
                self.blocked[index] = true;
            }
        }
    }

    fn search(&mut self, start: CellCoord, start_index: usize, goal: CellCoord) {
        self.distances[start_index] = 0;
        self.frontier.push(Reverse(FrontierEntry::new(0, start)));

        while let Some(Reverse(entry)) = self.frontier.pop() {
            let cell = entry.cell();
            let Some(current_index) = self.dimensions.index(cell) else {
                continue;
            };

            // Stale duplicates stay queued until popped; the first pop is final.
            if self.visited[current_index] {
                continue;
            }
            self.visited[current_index] = true;

            if cell == goal {
                break;
            }

            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell, self.dimensions) {
                let Some(neighbor_index) = self.dimensions.index(neighbor) else {
                    continue;
                };

                if self.blocked[neighbor_index] {
                    continue;
                }

                if next_distance >= self.distances[neighbor_index] {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                self.predecessors[neighbor_index] = Some(cell);
                self.frontier
                    .push(Reverse(FrontierEntry::new(next_distance, neighbor)));
            }
        }
    }

    fn reconstruct(&self, goal: CellCoord, goal_index: usize) -> Vec<CellCoord> {
        let mut chain = vec![goal];
        let mut cursor = self.predecessors[goal_index];

        while let Some(cell) = cursor {
            chain.push(cell);
            cursor = self
                .dimensions
                .index(cell)
                .and_then(|index| self.predecessors[index]);
        }

        // The chain ends on the attacker's cell, or is just the goal when the
        // goal was never reached. Either way that last cell is not part of the route.
        let _ = chain.pop();
        chain.reverse();
        chain
    }
}

/// Computes the shortest route using a freshly allocated [`Pathfinder`].
#[must_use]
pub fn find_path(
    dimensions: GridDimensions,
    attacker: &Unit,
    target: &Unit,
    units: &[Unit],
) -> Vec<CellCoord> {
    Pathfinder::new(dimensions).find_path(attacker, target, units)
}

/// Heap entry ordered by distance, then row, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    distance: u32,
    row: u32,
    column: u32,
}

impl FrontierEntry {
    fn new(distance: u32, cell: CellCoord) -> Self {
        Self {
            distance,
            row: cell.row(),
            column: cell.column(),
        }
    }

    fn cell(self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

fn neighbors(cell: CellCoord, dimensions: GridDimensions) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < dimensions.columns() {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < dimensions.rows() {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

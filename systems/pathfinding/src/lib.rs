#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* shortest-path search over a walkability grid.
//!
//! Movement is 4-directional and every step costs exactly one, so the
//! Manhattan distance is an admissible and consistent heuristic. Tile speed
//! factors never influence the route; they only change how fast a token
//! travels along it.

use std::{cmp::Ordering, collections::BinaryHeap};

use courier_core::{Cell, Path, Terrain};
use tracing::trace;

/// Finds a minimal-step path from `start` to `goal`.
///
/// Returns `None` when either cell lies outside the terrain, when the goal is
/// not walkable, or when no walkable route connects the two cells. The start
/// cell itself is not checked for walkability; only the cells entered along
/// the way are.
#[must_use]
pub fn find_path<T>(terrain: &T, start: Cell, goal: Cell) -> Option<Path>
where
    T: Terrain + ?Sized,
{
    PathFinder::default().find_path(terrain, start, goal)
}

/// Reusable A* search workspace.
///
/// Keeping a `PathFinder` around avoids reallocating the dense search buffers
/// when paths are requested repeatedly on the same grid, for example on every
/// pointer click.
#[derive(Debug, Default)]
pub struct PathFinder {
    costs: Vec<u32>,
    came_from: Vec<Option<Cell>>,
    closed: Vec<bool>,
    open: BinaryHeap<OpenNode>,
}

impl PathFinder {
    /// Creates an empty search workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a minimal-step path from `start` to `goal`; see [`find_path`].
    pub fn find_path<T>(&mut self, terrain: &T, start: Cell, goal: Cell) -> Option<Path>
    where
        T: Terrain + ?Sized,
    {
        if start == goal {
            return Some(Path::stationary(start));
        }

        let start_index = terrain.index_of(start)?;
        if !terrain.contains(goal) {
            return None;
        }
        if !terrain.is_walkable(goal) {
            trace!(?goal, "goal is not walkable");
            return None;
        }

        self.prepare_workspace(terrain);
        self.costs[start_index] = 0;
        self.open.push(OpenNode {
            estimate: start.manhattan_distance(goal),
            cost: 0,
            cell: start,
        });

        while let Some(node) = self.open.pop() {
            let Some(index) = terrain.index_of(node.cell) else {
                continue;
            };
            if self.closed[index] {
                continue;
            }
            if node.cell == goal {
                return self.reconstruct(terrain, start, goal);
            }
            self.closed[index] = true;

            let next_cost = node.cost + 1;
            for neighbor in node.cell.neighbors() {
                let Some(neighbor_index) = terrain.index_of(neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || !terrain.is_walkable(neighbor) {
                    continue;
                }
                if next_cost >= self.costs[neighbor_index] {
                    continue;
                }

                self.costs[neighbor_index] = next_cost;
                self.came_from[neighbor_index] = Some(node.cell);
                self.open.push(OpenNode {
                    estimate: next_cost + neighbor.manhattan_distance(goal),
                    cost: next_cost,
                    cell: neighbor,
                });
            }
        }

        trace!(?start, ?goal, "no route between cells");
        None
    }

    fn prepare_workspace<T>(&mut self, terrain: &T)
    where
        T: Terrain + ?Sized,
    {
        let node_count = usize::try_from(u64::from(terrain.width()) * u64::from(terrain.height()))
            .unwrap_or(0);

        self.costs.clear();
        self.costs.resize(node_count, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(node_count, None);
        self.closed.clear();
        self.closed.resize(node_count, false);
        self.open.clear();
    }

    fn reconstruct<T>(&self, terrain: &T, start: Cell, goal: Cell) -> Option<Path>
    where
        T: Terrain + ?Sized,
    {
        let mut cells = vec![goal];
        let mut current = goal;
        while current != start {
            current = self.came_from[terrain.index_of(current)?]?;
            cells.push(current);
        }
        cells.reverse();
        Path::try_from(cells).ok()
    }
}

/// Frontier entry ordered so that [`BinaryHeap`] pops the lowest `f = g + h`
/// first, breaking ties on the lower cost so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    cost: u32,
    cell: Cell,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flipped so the max-heap behaves as a min-heap.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_nodes_pop_lowest_estimate_then_lowest_cost() {
        let mut open = BinaryHeap::new();
        open.push(OpenNode {
            estimate: 5,
            cost: 1,
            cell: Cell::new(0, 0),
        });
        open.push(OpenNode {
            estimate: 4,
            cost: 3,
            cell: Cell::new(1, 0),
        });
        open.push(OpenNode {
            estimate: 4,
            cost: 2,
            cell: Cell::new(2, 0),
        });

        let order: Vec<Cell> = std::iter::from_fn(|| open.pop().map(|node| node.cell)).collect();
        assert_eq!(order, vec![Cell::new(2, 0), Cell::new(1, 0), Cell::new(0, 0)]);
    }
}

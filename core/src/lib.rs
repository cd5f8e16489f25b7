#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the courier navigation crates.
//!
//! This crate defines the vocabulary that connects the grid builder, the path
//! finder and the movement controller. Grids expose themselves through the
//! [`Terrain`] trait, the path finder answers with a [`Path`] of [`Cell`]
//! values, and the movement controller reports step outcomes as
//! [`MovementEvent`] values carrying a typed [`StepRejection`] when a step is
//! refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
///
/// Coordinates are signed so that callers can describe cells just outside the
/// grid (for example the west neighbour of column zero) and have them rejected
/// as out of bounds instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Cell reached by moving one step in `direction`.
    ///
    /// Rows grow southwards in cell space regardless of how the grid is drawn.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Cell {
        match direction {
            Direction::North => Cell::new(self.x, self.y - 1),
            Direction::East => Cell::new(self.x + 1, self.y),
            Direction::South => Cell::new(self.x, self.y + 1),
            Direction::West => Cell::new(self.x - 1, self.y),
        }
    }

    /// The four edge-sharing neighbours, which may lie outside any grid.
    #[must_use]
    pub const fn neighbors(self) -> [Cell; 4] {
        [
            self.step(Direction::East),
            self.step(Direction::West),
            self.step(Direction::South),
            self.step(Direction::North),
        ]
    }

    /// Direction that leads from this cell to an adjacent `other` cell.
    #[must_use]
    pub fn direction_to(self, other: Cell) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == other)
    }
}

/// Cardinal movement directions. Diagonal movement is not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Read-only walkability surface shared by the path finder and the movement
/// controller.
///
/// Implementors must be rectangular: every cell with `0 <= x < width` and
/// `0 <= y < height` is addressable.
pub trait Terrain {
    /// Number of columns in the terrain.
    fn width(&self) -> u32;

    /// Number of rows in the terrain.
    fn height(&self) -> u32;

    /// Reports whether a token may occupy `cell`. Out-of-bounds cells are
    /// never walkable.
    fn is_walkable(&self, cell: Cell) -> bool;

    /// Relative speed factor of the tile at `cell`, `0.0` outside the terrain.
    fn speed_at(&self, cell: Cell) -> f32;

    /// Reports whether `cell` lies within the terrain bounds.
    fn contains(&self, cell: Cell) -> bool {
        u32::try_from(cell.x()).is_ok_and(|x| x < self.width())
            && u32::try_from(cell.y()).is_ok_and(|y| y < self.height())
    }

    /// Dense row-major index of `cell`, if it lies within the terrain.
    fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.width()).ok()?;
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

/// Ordered sequence of 4-directionally adjacent cells.
///
/// The first cell is the start and the last cell the goal. A path always holds
/// at least one cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    /// Single-cell path that starts and ends at `cell`.
    #[must_use]
    pub fn stationary(cell: Cell) -> Self {
        Self { cells: vec![cell] }
    }

    /// Cell the path starts at.
    #[must_use]
    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    /// Cell the path ends at.
    #[must_use]
    pub fn goal(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// Number of cells in the path, including the start.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Paths are never empty; provided for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of steps needed to walk the path.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.cells.len() - 1
    }

    /// Cells of the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Consumes the path, yielding its cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

impl TryFrom<Vec<Cell>> for Path {
    type Error = PathError;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        if cells.is_empty() {
            return Err(PathError::Empty);
        }

        if let Some(index) = cells
            .windows(2)
            .position(|pair| !pair[0].is_adjacent(pair[1]))
        {
            return Err(PathError::Disjoint {
                index: index + 1,
                from: cells[index],
                to: cells[index + 1],
            });
        }

        Ok(Self { cells })
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let cells = Vec::<Cell>::deserialize(deserializer)?;
        Path::try_from(cells).map_err(serde::de::Error::custom)
    }
}

/// Reasons a cell sequence cannot form a [`Path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The sequence contained no cells.
    #[error("a path needs at least one cell")]
    Empty,
    /// Two consecutive cells do not share an edge.
    #[error("path cell {index} ({to:?}) is not adjacent to {from:?}")]
    Disjoint {
        /// Position of the offending cell within the sequence.
        index: usize,
        /// Cell preceding the gap.
        from: Cell,
        /// Cell following the gap.
        to: Cell,
    },
}

/// Reasons the movement controller refuses to start a step.
///
/// The `Display` form is the stable snake_case reason string reported to UI
/// collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum StepRejection {
    /// A one-off step request targeted a cell that does not share an edge with
    /// the current cell.
    #[error("not_adjacent")]
    NotAdjacent,
    /// The destination lies outside the grid.
    #[error("out_of_bounds")]
    OutOfBounds,
    /// The destination tile is not walkable.
    #[error("blocked_by_tile")]
    BlockedByTile,
    /// The next planned cell does not share an edge with the current cell,
    /// which indicates a stale or corrupted plan.
    #[error("step_not_adjacent")]
    StepNotAdjacent,
}

impl StepRejection {
    /// Stable reason string for the rejection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAdjacent => "not_adjacent",
            Self::OutOfBounds => "out_of_bounds",
            Self::BlockedByTile => "blocked_by_tile",
            Self::StepNotAdjacent => "step_not_adjacent",
        }
    }
}

/// Notifications queued by the movement controller for its owner to drain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementEvent {
    /// A planned step could not start.
    Blocked {
        /// Cell the step attempted to enter.
        cell: Cell,
        /// Specific reason the step was refused.
        reason: StepRejection,
    },
    /// The token finished interpolating and now rests on `cell`.
    Arrived {
        /// Cell derived from the token's final pixel position.
        cell: Cell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Open {
        width: u32,
        height: u32,
    }

    impl Terrain for Open {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn is_walkable(&self, cell: Cell) -> bool {
            self.contains(cell)
        }

        fn speed_at(&self, cell: Cell) -> f32 {
            if self.contains(cell) {
                1.0
            } else {
                0.0
            }
        }
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(Cell::new(-1, 0).manhattan_distance(Cell::new(1, 0)), 2);
    }

    #[test]
    fn diagonal_cells_are_not_adjacent() {
        let origin = Cell::new(2, 2);
        assert!(origin.is_adjacent(Cell::new(2, 3)));
        assert!(!origin.is_adjacent(Cell::new(3, 3)));
        assert!(!origin.is_adjacent(origin));
    }

    #[test]
    fn direction_to_inverts_step() {
        let origin = Cell::new(3, 3);
        for direction in Direction::ALL {
            assert_eq!(origin.direction_to(origin.step(direction)), Some(direction));
        }
        assert_eq!(origin.direction_to(Cell::new(4, 4)), None);
    }

    #[test]
    fn terrain_bounds_reject_negative_and_overflowing_cells() {
        let terrain = Open {
            width: 3,
            height: 2,
        };
        assert!(terrain.contains(Cell::new(2, 1)));
        assert!(!terrain.contains(Cell::new(-1, 0)));
        assert!(!terrain.contains(Cell::new(3, 0)));
        assert!(!terrain.contains(Cell::new(0, 2)));
        assert_eq!(terrain.index_of(Cell::new(1, 1)), Some(4));
        assert_eq!(terrain.index_of(Cell::new(0, -1)), None);
    }

    #[test]
    fn path_rejects_gaps() {
        let error = Path::try_from(vec![Cell::new(0, 0), Cell::new(1, 1)])
            .expect_err("diagonal jump must be rejected");
        assert_eq!(
            error,
            PathError::Disjoint {
                index: 1,
                from: Cell::new(0, 0),
                to: Cell::new(1, 1),
            }
        );
        assert_eq!(Path::try_from(Vec::new()), Err(PathError::Empty));
    }

    #[test]
    fn path_reports_endpoints() {
        let path = Path::try_from(vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)])
            .expect("contiguous path");
        assert_eq!(path.start(), Cell::new(0, 0));
        assert_eq!(path.goal(), Cell::new(1, 1));
        assert_eq!(path.step_count(), 2);
    }

    #[test]
    fn path_deserialization_validates_adjacency() {
        let parsed: Result<Path, _> =
            serde_json::from_str(r#"[{"x":0,"y":0},{"x":0,"y":2}]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn step_rejection_renders_reason_strings() {
        assert_eq!(StepRejection::NotAdjacent.to_string(), "not_adjacent");
        assert_eq!(StepRejection::StepNotAdjacent.as_str(), "step_not_adjacent");
        assert_eq!(
            serde_json::to_string(&StepRejection::BlockedByTile).expect("serialize"),
            "\"blocked_by_tile\""
        );
    }
}

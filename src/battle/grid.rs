//! Rectangular battle grid with orthogonal movement
//!
//! Cells are integer (x, y) pairs inside `[0, width) x [0, height)`.
//! x grows to the right, y grows downward.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{GRID_HEIGHT, GRID_WIDTH};
use crate::battle::units::Unit;

/// Grid coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Number of orthogonal steps between two cells on an empty grid
    pub fn manhattan_distance(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Fixed-size battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        // Both dimensions are clamped non-negative in `new`
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// In-bounds orthogonal neighbors, in exploration order: left, right, up, down.
    ///
    /// Out-of-bounds input is tolerated; only in-bounds cells are returned.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        [
            Cell::new(cell.x - 1, cell.y),
            Cell::new(cell.x + 1, cell.y),
            Cell::new(cell.x, cell.y - 1),
            Cell::new(cell.x, cell.y + 1),
        ]
        .into_iter()
        .filter(|c| self.contains(*c))
        .collect()
    }

    /// All cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }
}

/// Cells held by living units at the moment a path query runs.
///
/// A snapshot: rebuild it before every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancySet {
    cells: HashSet<Cell>,
}

impl OccupancySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the cells of all living units
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        Self {
            cells: units
                .into_iter()
                .filter(|u| u.is_alive())
                .map(|u| u.position)
                .collect(),
        }
    }

    pub fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn remove(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<Cell> for OccupancySet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

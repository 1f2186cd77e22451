//! Shortest-path search for attackers on the battle grid
//!
//! Uniform-cost search: every step costs 1 and cells held by living units
//! block movement, except the start and goal cells themselves.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::battle::grid::{Cell, Grid, OccupancySet};
use crate::battle::units::Unit;

/// Entry in the search frontier.
///
/// The heap may hold several entries for one cell; only the one whose
/// distance still matches the best known distance is acted on.
#[derive(Debug, Clone, Copy)]
struct FrontierNode {
    cell: Cell,
    distance: u32,
    order: u64, // insertion counter, keeps equal-distance pops FIFO
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierNode {}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest route from `attacker` to `target`.
///
/// `all_units` is every unit on the field; the occupancy snapshot is taken
/// from it on each call. Returns `[start]` when both stand on the same cell
/// and an empty path when the target cannot be reached.
pub fn find_path<'a>(
    grid: &Grid,
    attacker: &Unit,
    target: &Unit,
    all_units: impl IntoIterator<Item = &'a Unit>,
) -> Vec<Cell> {
    if attacker.position == target.position {
        return vec![attacker.position];
    }

    let occupied = OccupancySet::from_units(all_units);
    let path = find_path_between(grid, attacker.position, target.position, &occupied);

    tracing::trace!(
        "path {} -> {}: {} steps",
        attacker.name,
        target.name,
        path.len().saturating_sub(1)
    );
    path
}

/// Shortest orthogonal path from `start` to `goal` avoiding `occupied`.
///
/// Neighbors are explored left, right, up, down. `start` and `goal` are
/// never treated as blocked.
pub fn find_path_between(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    occupied: &OccupancySet,
) -> Vec<Cell> {
    if start == goal {
        return vec![start];
    }
    if !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }

    let mut frontier = BinaryHeap::new();
    let mut distances: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut order = 0u64;

    distances.insert(start, 0);
    frontier.push(FrontierNode {
        cell: start,
        distance: 0,
        order,
    });

    while let Some(current) = frontier.pop() {
        // Stale entry: a shorter route to this cell was found after it was queued
        if distances.get(&current.cell) != Some(&current.distance) {
            continue;
        }

        if current.cell == goal {
            return reconstruct_path(&came_from, current.cell);
        }

        for neighbor in grid.neighbors(current.cell) {
            if neighbor != goal && occupied.contains(neighbor) {
                continue;
            }

            let tentative = current.distance + 1;
            let known = distances.get(&neighbor).copied().unwrap_or(u32::MAX);

            if tentative < known {
                distances.insert(neighbor, tentative);
                came_from.insert(neighbor, current.cell);
                order += 1;
                frontier.push(FrontierNode {
                    cell: neighbor,
                    distance: tentative,
                    order,
                });
            }
        }
    }

    Vec::new() // No path found
}

/// Walk predecessor links back from `current` to the start
fn reconstruct_path(came_from: &HashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Number of moves along a path; `None` for the empty "no path" result
pub fn path_steps(path: &[Cell]) -> Option<usize> {
    if path.is_empty() {
        None
    } else {
        Some(path.len() - 1)
    }
}

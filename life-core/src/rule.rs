//! The fixed neighbour-count rule (Conway's Game of Life on a torus).
//!
//! The compute shader in `life-gpu` mirrors this arithmetic exactly; tests
//! compare the two cell by cell.

use crate::{CellGrid, LifeError, ALIVE, DEAD};
use rayon::prelude::*;

/// Neighbour offsets in the order the compute shader visits them.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counts live neighbours of `(x, y)` with wraparound on both axes.
///
/// Each of the 8 lookups is counted separately even when several of them
/// resolve to the same cell, so on a 1x1 grid a live cell sees itself 8 times.
pub fn neighbor_count(grid: &CellGrid, x: u32, y: u32) -> u32 {
    NEIGHBOR_OFFSETS
        .iter()
        .map(|&(dx, dy)| u32::from(*grid.wrapped(x, y, dx, dy) != DEAD))
        .sum()
}

/// Next state of a cell given its current state and live neighbour count.
pub const fn next_state(alive: bool, neighbors: u32) -> u32 {
    match (alive, neighbors) {
        (true, 2 | 3) | (false, 3) => ALIVE,
        _ => DEAD,
    }
}

/// Writes the next generation of `src` into `dst`.
///
/// `src` is never modified; every cell of `dst` is written exactly once.
/// Rows are processed in parallel and the call returns only after all of
/// them are done.
pub fn step_into(src: &CellGrid, dst: &mut CellGrid) -> Result<(), LifeError> {
    if src.dims() != dst.dims() {
        return Err(LifeError::DimensionMismatch {
            expected: (src.width(), src.height()),
            actual: (dst.width(), dst.height()),
        });
    }
    let width = src.width() as usize;
    dst.data
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let (x, y) = (x as u32, y as u32);
                *cell = next_state(src.is_alive(x, y), neighbor_count(src, x, y));
            }
        });
    Ok(())
}

/// Returns the next generation of `grid` as a new grid.
pub fn step(grid: &CellGrid) -> CellGrid {
    let mut next = CellGrid::new(grid.dims());
    // Both grids share `grid.dims()`, so this cannot fail.
    let _ = step_into(grid, &mut next);
    next
}

//! Core library for the Life Forge cellular automaton.
//! Defines the grid model, the toroidal neighbour rule and a CPU reference
//! simulation that the GPU implementation is checked against.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic 2D grid structures and the cell-state grid.
pub mod grid;
/// Fixed seed patterns (block, blinker, glider).
pub mod pattern;
/// The toroidal neighbour-count rule.
pub mod rule;
/// Randomized initial state generation.
pub mod seed;
/// Double-buffered CPU simulation.
pub mod simulation;

/// Dimensions of a simulation grid.
pub use crate::grid::GridDims;
/// Generic 2D grid structure.
pub use crate::grid::Grid;
/// Grid holding one `u32` state (0 = dead, 1 = alive) per cell.
pub use crate::grid::CellGrid;
pub use crate::pattern::Pattern;
pub use crate::seed::{seed_random, SeedConfig};
/// Ping-pong CPU simulation used as reference implementation.
pub use crate::simulation::CpuSimulation;

/// Cell value for a dead cell.
pub const DEAD: u32 = 0;
/// Cell value for a live cell.
pub const ALIVE: u32 = 1;

/// Errors raised by the grid model. All of them are precondition violations
/// detected before a simulation starts.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LifeError {
    /// Width or height was zero.
    #[error("Invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u32, height: u32 },
    /// Initial live-cell probability outside `[0, 1]`.
    #[error("Invalid live-cell probability {0}: must lie in [0, 1]")]
    InvalidProbability(f64),
    /// Two grids that must agree in size do not.
    #[error("Grid dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// A cell coordinate outside the grid.
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

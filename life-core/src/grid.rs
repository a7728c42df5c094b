use crate::{LifeError, ALIVE, DEAD};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable dimensions of a simulation grid.
///
/// Both sides are guaranteed positive, so every `GridDims` describes at least
/// one cell. Cells are addressed row-major: `index = y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridDims {
    width: u32,
    height: u32,
}

impl GridDims {
    /// Creates new dimensions, rejecting a zero width or height.
    pub const fn new(width: u32, height: u32) -> Result<Self, LifeError> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Square grid of side `size`.
    pub const fn square(size: u32) -> Result<Self, LifeError> {
        Self::new(size, size)
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of `(x, y)`, or `None` when out of bounds.
    pub const fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`GridDims::index`]. `index` must be below `cell_count`.
    pub const fn coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Coordinate reached from `(x, y)` by the offset `(dx, dy)`, wrapping
    /// around both axes so that edges connect to the opposite edge.
    pub fn wrapped(&self, x: u32, y: u32, dx: i32, dy: i32) -> (u32, u32) {
        let wx = (i64::from(x) + i64::from(dx)).rem_euclid(i64::from(self.width));
        let wy = (i64::from(y) + i64::from(dy)).rem_euclid(i64::from(self.height));
        (wx as u32, wy as u32)
    }
}

/// Generic 2D grid stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid<T> {
    dims: GridDims,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            data: vec![T::default(); dims.cell_count()],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major vector. Its length must equal `dims.cell_count()`.
    pub fn from_vec(dims: GridDims, data: Vec<T>) -> Result<Self, LifeError> {
        if data.len() != dims.cell_count() {
            return Err(LifeError::DimensionMismatch {
                expected: (dims.width(), dims.height()),
                actual: (data.len() as u32, 1),
            });
        }
        Ok(Self { dims, data })
    }

    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    pub const fn width(&self) -> u32 {
        self.dims.width()
    }

    pub const fn height(&self) -> u32 {
        self.dims.height()
    }

    /// Returns an immutable reference to the element at `(x, y)`,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        self.dims.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at `(x, y)`,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        self.dims
            .index(x, y)
            .and_then(move |idx| self.data.get_mut(idx))
    }

    /// Element at `(x, y)` with toroidal wraparound applied to the offset.
    pub fn wrapped(&self, x: u32, y: u32, dx: i32, dy: i32) -> &T {
        let (wx, wy) = self.dims.wrapped(x, y, dx, dy);
        // Wrapped coordinates are always in range.
        &self.data[wy as usize * self.dims.width() as usize + wx as usize]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

/// Grid of cell states, one `u32` per cell (0 = dead, 1 = alive).
/// Matches the layout of a GPU cell-state buffer word for word.
pub type CellGrid = Grid<u32>;

impl Grid<u32> {
    /// Builds a grid where exactly the listed cells are alive.
    pub fn from_live_cells(dims: GridDims, cells: &[(u32, u32)]) -> Result<Self, LifeError> {
        let mut grid = Self::new(dims);
        for &(x, y) in cells {
            grid.set_alive(x, y, true)?;
        }
        Ok(grid)
    }

    pub fn is_alive(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(|&v| v != DEAD)
    }

    /// Sets one cell alive or dead.
    pub fn set_alive(&mut self, x: u32, y: u32, alive: bool) -> Result<(), LifeError> {
        let dims = self.dims;
        let cell = self.get_mut(x, y).ok_or(LifeError::OutOfBounds {
            x,
            y,
            width: dims.width(),
            height: dims.height(),
        })?;
        *cell = if alive { ALIVE } else { DEAD };
        Ok(())
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.data.iter().filter(|&&v| v != DEAD).count()
    }

    /// Coordinates of all live cells in row-major order.
    pub fn live_cells(&self) -> Vec<(u32, u32)> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != DEAD)
            .map(|(i, _)| self.dims.coords(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            GridDims::new(0, 4),
            Err(LifeError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(GridDims::new(4, 0).is_err());
        assert!(GridDims::new(1, 1).is_ok());
    }

    #[test]
    fn index_and_coords_agree() {
        let dims = GridDims::new(5, 3).unwrap();
        for i in 0..dims.cell_count() {
            let (x, y) = dims.coords(i);
            assert_eq!(dims.index(x, y), Some(i));
        }
        assert_eq!(dims.index(5, 0), None);
        assert_eq!(dims.index(0, 3), None);
    }

    #[test]
    fn wrapping_connects_opposite_edges() {
        let dims = GridDims::new(4, 3).unwrap();
        assert_eq!(dims.wrapped(0, 0, -1, -1), (3, 2));
        assert_eq!(dims.wrapped(3, 2, 1, 1), (0, 0));
        assert_eq!(dims.wrapped(2, 1, 0, 0), (2, 1));
    }

    #[test]
    fn from_vec_checks_length() {
        let dims = GridDims::new(2, 2).unwrap();
        assert!(Grid::from_vec(dims, vec![0u32; 4]).is_ok());
        assert!(Grid::from_vec(dims, vec![0u32; 3]).is_err());
    }
}

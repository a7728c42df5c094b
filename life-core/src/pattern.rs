use crate::{CellGrid, GridDims, LifeError};

/// Well-known patterns used to seed deterministic scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// 2x2 still life.
    Block,
    /// Period-2 oscillator, horizontal phase.
    Blinker,
    /// Five-cell spaceship travelling towards +x, +y.
    Glider,
}

impl Pattern {
    /// Live cell offsets relative to the pattern's top-left corner.
    pub const fn offsets(self) -> &'static [(u32, u32)] {
        match self {
            Self::Block => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::Blinker => &[(0, 0), (1, 0), (2, 0)],
            Self::Glider => &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
        }
    }

    /// Sets the pattern alive with its top-left corner at `(x, y)`.
    /// Cells past an edge wrap to the opposite edge.
    pub fn place(self, grid: &mut CellGrid, x: u32, y: u32) -> Result<(), LifeError> {
        let dims = grid.dims();
        if dims.index(x, y).is_none() {
            return Err(LifeError::OutOfBounds {
                x,
                y,
                width: dims.width(),
                height: dims.height(),
            });
        }
        for &(ox, oy) in self.offsets() {
            let (cx, cy) = dims.wrapped(x, y, ox as i32, oy as i32);
            grid.set_alive(cx, cy, true)?;
        }
        Ok(())
    }

    /// A fresh grid containing only this pattern.
    pub fn on_grid(self, dims: GridDims, x: u32, y: u32) -> Result<CellGrid, LifeError> {
        let mut grid = CellGrid::new(dims);
        self.place(&mut grid, x, y)?;
        Ok(grid)
    }
}

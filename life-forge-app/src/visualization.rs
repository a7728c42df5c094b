use life_core::CellGrid;
use std::io::Write;

/// Trait for types that can present a cell grid to the user.
pub trait Visualizer {
    /// Displays the given generation.
    fn display_state(&mut self, step: u64, grid: &CellGrid) -> Result<(), anyhow::Error>;
}

/// Prints grids as text, one character per cell.
pub struct TerminalVisualizer<W: Write> {
    out: W,
    alive: char,
    dead: char,
}

impl TerminalVisualizer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalVisualizer<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            alive: '#',
            dead: '.',
        }
    }

    /// Formats `grid` row by row, top row first.
    pub fn render(&self, grid: &CellGrid) -> String {
        let width = grid.width() as usize;
        let mut text = String::with_capacity((width + 1) * grid.height() as usize);
        for row in grid.as_slice().chunks(width) {
            text.extend(
                row.iter()
                    .map(|&cell| if cell != 0 { self.alive } else { self.dead }),
            );
            text.push('\n');
        }
        text
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, step: u64, grid: &CellGrid) -> Result<(), anyhow::Error> {
        let text = self.render(grid);
        writeln!(
            self.out,
            "--- step {step} | {}x{} | population {} ---",
            grid.width(),
            grid.height(),
            grid.population()
        )?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{GridDims, Pattern};

    #[test]
    fn test_render_blinker() {
        let dims = GridDims::new(5, 3).unwrap();
        let grid = Pattern::Blinker.on_grid(dims, 1, 1).unwrap();
        let vis = TerminalVisualizer::new(Vec::new());
        assert_eq!(vis.render(&grid), ".....\n.###.\n.....\n");
    }

    #[test]
    fn test_display_writes_header_and_rows() {
        let dims = GridDims::new(2, 2).unwrap();
        let grid = Pattern::Block.on_grid(dims, 0, 0).unwrap();
        let mut vis = TerminalVisualizer::new(Vec::new());
        vis.display_state(7, &grid).unwrap();
        let out = String::from_utf8(vis.into_inner()).unwrap();
        assert_eq!(out, "--- step 7 | 2x2 | population 4 ---\n##\n##\n");
    }
}

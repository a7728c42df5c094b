use crate::{rule, CellGrid, GridDims};

/// Double-buffered CPU simulation.
///
/// Holds two grids that alternate between "current" and "next" by the parity
/// of the step counter, mirroring the GPU buffer pair. A step reads
/// `buffers[step & 1]`, writes `buffers[(step + 1) & 1]` and joins all of its
/// parallel work before the counter advances, so readers never observe a
/// partially written generation.
#[derive(Debug, Clone)]
pub struct CpuSimulation {
    buffers: [CellGrid; 2],
    step: u64,
}

impl CpuSimulation {
    /// Starts a simulation from `initial`, which becomes buffer 0.
    pub fn new(initial: CellGrid) -> Self {
        let next = CellGrid::new(initial.dims());
        Self {
            buffers: [initial, next],
            step: 0,
        }
    }

    pub const fn dims(&self) -> GridDims {
        self.buffers[0].dims()
    }

    /// Number of completed steps.
    pub const fn step_count(&self) -> u64 {
        self.step
    }

    /// Index of the buffer holding the latest generation.
    pub const fn current_index(&self) -> usize {
        (self.step & 1) as usize
    }

    /// The latest completed generation.
    pub fn current(&self) -> &CellGrid {
        &self.buffers[self.current_index()]
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        let read = self.current_index();
        let [a, b] = &mut self.buffers;
        let (src, dst) = if read == 0 { (&*a, b) } else { (&*b, a) };
        // Both buffers were created with the same dimensions.
        let _ = rule::step_into(src, dst);
        self.step += 1;
        log::trace!("CPU simulation advanced to step {}", self.step);
    }

    /// Advances `steps` generations.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pattern;

    #[test]
    fn alternates_buffers() {
        let dims = GridDims::new(6, 6).unwrap();
        let mut sim = CpuSimulation::new(Pattern::Blinker.on_grid(dims, 1, 2).unwrap());
        assert_eq!(sim.current_index(), 0);
        sim.step();
        assert_eq!(sim.current_index(), 1);
        assert_eq!(sim.current().live_cells(), vec![(2, 1), (2, 2), (2, 3)]);
        sim.step();
        assert_eq!(sim.current_index(), 0);
        assert_eq!(sim.current().live_cells(), vec![(1, 2), (2, 2), (3, 2)]);
        assert_eq!(sim.step_count(), 2);
    }
}

use bytemuck::{Pod, Zeroable};
use life_core::{CellGrid, GridDims};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::GpuError;

/// Grid dimensions as seen by both shader stages.
///
/// Written once when the [`GridState`] is created and never updated.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridUniform {
    /// `[width, height]` as floats.
    pub size: [f32; 2],
}

impl GridUniform {
    pub fn new(dims: GridDims) -> Self {
        Self {
            size: [dims.width() as f32, dims.height() as f32],
        }
    }
}

/// Two triangles forming the shared cell quad, `[-0.8, 0.8]` on both axes.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-0.8, -0.8],
    [0.8, -0.8],
    [0.8, 0.8],
    [-0.8, -0.8],
    [0.8, 0.8],
    [-0.8, 0.8],
];

/// Index of the buffer holding the latest generation after `step` steps.
pub const fn current_index(step: u64) -> usize {
    (step & 1) as usize
}

/// Index of the buffer the next step writes to.
pub const fn next_index(step: u64) -> usize {
    (step.wrapping_add(1) & 1) as usize
}

/// Stores the GPU buffers describing the simulation grid.
///
/// The two cell-state buffers keep their identity for the whole session:
/// bind groups are created against them once and their roles alternate by
/// step parity, they are never swapped or reallocated.
#[derive(Debug, Clone)]
pub struct GridState {
    dims: GridDims,
    /// Uniform buffer holding the [`GridUniform`].
    pub uniform_buf: Arc<wgpu::Buffer>,
    /// The ping-pong pair of cell-state buffers, `cell_count` `u32`s each.
    pub cell_state_bufs: [Arc<wgpu::Buffer>; 2],
    /// Vertex buffer holding [`QUAD_VERTICES`].
    pub vertex_buf: Arc<wgpu::Buffer>,
    /// Staging buffer used to read a cell-state buffer back to the CPU.
    pub staging_buf: Arc<wgpu::Buffer>,
}

impl GridState {
    /// Allocates the buffers. Buffer 0 receives `initial`, buffer 1 starts
    /// zeroed and is first written by the initial compute pass.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to allocate on.
    /// * `initial` - Generation 0. Its dimensions fix the buffer sizes.
    ///
    /// # Returns
    ///
    /// * `Ok(GridState)` - Buffers ready for binding.
    /// * `Err(GpuError::GridTooLarge)` - If one cell-state buffer would exceed
    ///   the device's storage binding or buffer size limit.
    pub fn new(device: &wgpu::Device, initial: &CellGrid) -> Result<Self, GpuError> {
        let dims = initial.dims();
        let state_size = Self::state_buffer_size_for(dims);
        let limits = device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if state_size > limit {
            return Err(GpuError::GridTooLarge {
                cells: dims.cell_count(),
                bytes: state_size,
                limit,
            });
        }

        let uniform = GridUniform::new(dims);
        let uniform_buf = Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Uniforms"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }));

        let state_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        let state_a = Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell State A"),
            contents: bytemuck::cast_slice(initial.as_slice()),
            usage: state_usage,
        }));
        let state_b = Arc::new(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell State B"),
            size: state_size,
            usage: state_usage,
            mapped_at_creation: false,
        }));

        let vertex_buf = Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell Vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }));

        let staging_buf = Arc::new(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell State Staging"),
            size: state_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));

        log::debug!(
            "Allocated grid state for {}x{} cells ({} bytes per state buffer)",
            dims.width(),
            dims.height(),
            state_size
        );

        Ok(Self {
            dims,
            uniform_buf,
            cell_state_bufs: [state_a, state_b],
            vertex_buf,
            staging_buf,
        })
    }

    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Size in bytes of one cell-state buffer.
    pub fn state_buffer_size(&self) -> u64 {
        Self::state_buffer_size_for(self.dims)
    }

    fn state_buffer_size_for(dims: GridDims) -> u64 {
        (dims.cell_count() * std::mem::size_of::<u32>()) as u64
    }

    /// Cell-state buffer by index; only the parity of `index` matters.
    pub fn cell_buffer(&self, index: usize) -> &wgpu::Buffer {
        &self.cell_state_bufs[index & 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_two_floats() {
        assert_eq!(std::mem::size_of::<GridUniform>(), 8);
        let dims = GridDims::new(32, 16).unwrap();
        assert_eq!(GridUniform::new(dims).size, [32.0, 16.0]);
    }

    #[test]
    fn indices_alternate_every_step() {
        for step in 0..10u64 {
            assert_ne!(current_index(step), next_index(step));
            assert_eq!(next_index(step), current_index(step + 1));
        }
        assert_eq!(current_index(0), 0);
        assert_eq!(current_index(u64::MAX), 1);
    }

    #[test]
    fn quad_is_two_triangles() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        assert!(QUAD_VERTICES
            .iter()
            .all(|v| v.iter().all(|c| c.abs() == 0.8)));
    }
}

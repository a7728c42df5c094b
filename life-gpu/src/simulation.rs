use life_core::GridDims;
use log::debug;

use crate::{
    buffers::{current_index, GridState, GridUniform},
    shaders::{specialize, SIMULATION_SHADER},
    GpuError,
};

/// Tile edge used when none is configured.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 8;

/// Number of `edge`-sized square tiles needed to cover every cell.
pub const fn dispatch_size(dims: GridDims, edge: u32) -> (u32, u32) {
    (dims.width().div_ceil(edge), dims.height().div_ceil(edge))
}

/// Checks a tile edge against the device's compute limits.
pub fn validate_workgroup_size(limits: &wgpu::Limits, size: u32) -> Result<(), GpuError> {
    let invalid = |reason: String| GpuError::InvalidWorkgroupSize { size, reason };
    if size == 0 {
        return Err(invalid("must be positive".to_string()));
    }
    if size > limits.max_compute_workgroup_size_x || size > limits.max_compute_workgroup_size_y {
        return Err(invalid(format!(
            "exceeds the per-axis limit of {}x{}",
            limits.max_compute_workgroup_size_x, limits.max_compute_workgroup_size_y
        )));
    }
    match size.checked_mul(size) {
        Some(n) if n <= limits.max_compute_invocations_per_workgroup => Ok(()),
        _ => Err(invalid(format!(
            "{size}x{size} invocations exceed the limit of {}",
            limits.max_compute_invocations_per_workgroup
        ))),
    }
}

/// Compute stage: writes the next generation into the "next" buffer.
///
/// Bind group `i` reads cell-state buffer `i` and writes buffer `1 - i`, so
/// [`SimulationStep::encode`] for step `n` reads `buffer[n & 1]` and writes
/// `buffer[(n + 1) & 1]`. The buffer being read is bound read-only.
#[derive(Debug)]
pub struct SimulationStep {
    pipeline: wgpu::ComputePipeline,
    bind_groups: [wgpu::BindGroup; 2],
    workgroup_size: u32,
    workgroup_count: (u32, u32),
}

impl SimulationStep {
    /// Builds the compute pipeline with `workgroup_size` baked into the shader,
    /// plus one bind group per ping-pong parity. Fails if the size or the
    /// resulting dispatch is outside the device limits.
    pub fn new(
        device: &wgpu::Device,
        state: &GridState,
        workgroup_size: u32,
    ) -> Result<Self, GpuError> {
        let limits = device.limits();
        validate_workgroup_size(&limits, workgroup_size)?;
        let (x, y) = dispatch_size(state.dims(), workgroup_size);
        let limit = limits.max_compute_workgroups_per_dimension;
        if x > limit || y > limit {
            return Err(GpuError::DispatchTooLarge { x, y, limit });
        }

        let source = specialize(SIMULATION_SHADER, &[("WORKGROUP_SIZE", workgroup_size)])?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Bind Group Layout"),
            entries: &[
                // Grid uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GridUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                // Current state (read-only)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Next state
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Simulation Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("compute_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let make_bind_group = |read: usize, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: state.uniform_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: state.cell_buffer(read).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: state.cell_buffer(read + 1).as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            make_bind_group(0, "Simulation Bind Group A->B"),
            make_bind_group(1, "Simulation Bind Group B->A"),
        ];

        debug!(
            "Simulation pipeline ready: workgroup {}x{}, dispatch {}x{}",
            workgroup_size, workgroup_size, x, y
        );

        Ok(Self {
            pipeline,
            bind_groups,
            workgroup_size,
            workgroup_count: (x, y),
        })
    }

    /// Records one compute pass advancing the generation read at `step`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, step: u64) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Simulation Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[current_index(step)], &[]);
        let (x, y) = self.workgroup_count;
        pass.dispatch_workgroups(x, y, 1);
    }

    pub const fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    /// Workgroups dispatched per step along x and y.
    pub const fn workgroup_count(&self) -> (u32, u32) {
        self.workgroup_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_partial_tiles() {
        let dims = GridDims::new(13, 7).unwrap();
        assert_eq!(dispatch_size(dims, 8), (2, 1));
        let dims = GridDims::new(32, 32).unwrap();
        assert_eq!(dispatch_size(dims, 8), (4, 4));
        let dims = GridDims::new(1, 1).unwrap();
        assert_eq!(dispatch_size(dims, 8), (1, 1));
    }

    #[test]
    fn workgroup_size_limits() {
        let limits = wgpu::Limits::default();
        assert!(validate_workgroup_size(&limits, 8).is_ok());
        assert!(validate_workgroup_size(&limits, 16).is_ok());
        // 32x32 = 1024 invocations, above the default of 256.
        assert!(validate_workgroup_size(&limits, 32).is_err());
        assert!(validate_workgroup_size(&limits, 0).is_err());
    }
}

use log::debug;
use std::sync::Arc;

use crate::{
    buffers::{current_index, GridState, GridUniform},
    shaders::CELL_SHADER,
};

/// Background used when none is configured (dark blue).
pub const DEFAULT_CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.4, 1.0];

/// Render stage: one instanced quad per cell, sized by the cell's state.
///
/// Bind group `i` exposes cell-state buffer `i` read-only to the vertex
/// stage. The render stage never writes cell state.
#[derive(Debug)]
pub struct GridRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_groups: [wgpu::BindGroup; 2],
    vertex_buf: Arc<wgpu::Buffer>,
    instance_count: u32,
    clear_color: wgpu::Color,
    format: wgpu::TextureFormat,
}

impl GridRenderer {
    pub fn new(
        device: &wgpu::Device,
        state: &GridState,
        format: wgpu::TextureFormat,
        clear_color: [f64; 4],
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell Shader"),
            source: wgpu::ShaderSource::Wgsl(CELL_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cell Render Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GridUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cell Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vertex_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fragment_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let make_bind_group = |index: usize, label: &str| {
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
                        resource: state.cell_buffer(index).as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            make_bind_group(0, "Cell Render Bind Group A"),
            make_bind_group(1, "Cell Render Bind Group B"),
        ];

        let [r, g, b, a] = clear_color;
        let instance_count = u32::try_from(state.dims().cell_count()).unwrap_or(u32::MAX);
        debug!("Cell renderer ready: {instance_count} instances, format {format:?}");

        Self {
            pipeline,
            bind_groups,
            vertex_buf: Arc::clone(&state.vertex_buf),
            instance_count,
            clear_color: wgpu::Color { r, g, b, a },
            format,
        }
    }

    /// Records one render pass drawing the generation stored after `step`
    /// steps into `view`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, step: u64) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        pass.set_bind_group(0, &self.bind_groups[current_index(step)], &[]);
        pass.draw(0..6, 0..self.instance_count);
    }

    pub const fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub const fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }
}

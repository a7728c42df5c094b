//! Where a frame is drawn: a window surface or an offscreen texture.

use log::{debug, warn};
use std::sync::Arc;

use crate::{sync::map_read, GpuContext, GpuError};

/// A frame ready to be rendered into.
pub struct AcquiredFrame {
    pub view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl AcquiredFrame {
    /// Presents the frame if it belongs to a surface. Offscreen frames need
    /// no presentation.
    pub fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

/// Supplies the texture each frame renders into.
pub trait FrameTarget {
    fn format(&self) -> wgpu::TextureFormat;

    /// Returns the next frame, or `None` when this frame should be skipped.
    fn acquire(&mut self) -> Result<Option<AcquiredFrame>, GpuError>;

    fn present(&mut self, frame: AcquiredFrame) {
        frame.present();
    }
}

/// Picks the surface format: the first linear (non-sRGB) format, else the
/// surface's first format. Colors are written without gamma encoding, the
/// same as the offscreen target.
fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first().copied())
}

/// A window's presentation surface, configured for vsync (Fifo).
pub struct WindowSurface {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    pub fn new(
        ctx: &GpuContext,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let caps = surface.get_capabilities(&ctx.adapter);
        let format = preferred_format(&caps.formats).ok_or(GpuError::SurfaceUnsupported)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&ctx.device, &config);
        debug!(
            "Configured surface {}x{} with format {:?}",
            config.width, config.height, format
        );

        Ok(Self {
            surface,
            device: Arc::clone(&ctx.device),
            config,
        })
    }

    /// Reconfigures the surface for a new window size. Zero sizes (minimized
    /// windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub const fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

impl FrameTarget for WindowSurface {
    fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn acquire(&mut self) -> Result<Option<AcquiredFrame>, GpuError> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some(AcquiredFrame {
                    view,
                    surface_texture: Some(texture),
                }))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface acquisition timed out, skipping frame");
                Ok(None)
            }
            Err(e @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
                warn!("Surface {e}, reconfiguring and skipping frame");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(e) => Err(GpuError::Surface(e)),
        }
    }
}

/// An RGBA8 texture that frames can be rendered into and read back from.
pub struct OffscreenTarget {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(ctx: &GpuContext, width: u32, height: u32) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Self {
            device: Arc::clone(&ctx.device),
            queue: Arc::clone(&ctx.queue),
            texture,
            width,
            height,
        }
    }

    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reads the texture back as tightly packed RGBA8 rows.
    pub async fn read_pixels(&self) -> Result<Vec<u8>, GpuError> {
        let row_bytes = self.width * 4;
        let padded_row_bytes = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Offscreen Readback"),
            size: u64::from(padded_row_bytes) * u64::from(self.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let padded = map_read(&self.device, &readback).await?;
        let pixels = padded
            .chunks(padded_row_bytes as usize)
            .flat_map(|row| &row[..row_bytes as usize])
            .copied()
            .collect();
        Ok(pixels)
    }
}

impl FrameTarget for OffscreenTarget {
    fn format(&self) -> wgpu::TextureFormat {
        Self::FORMAT
    }

    fn acquire(&mut self) -> Result<Option<AcquiredFrame>, GpuError> {
        let view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Some(AcquiredFrame {
            view,
            surface_texture: None,
        }))
    }
}

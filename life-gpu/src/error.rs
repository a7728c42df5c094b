//! Error type for GPU setup and per-frame operations.

use life_core::LifeError;
use thiserror::Error;

/// Errors raised by the GPU simulation.
///
/// Everything here is fatal for the caller that receives it. Transient
/// per-frame failures are reported as [`crate::TickOutcome::Skipped`] instead.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No adapter, or an adapter missing compute or vertex-storage support.
    #[error("GPU capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create presentation surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable texture format for this adapter.
    #[error("Presentation surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    /// Surface acquisition failed in a way that cannot be retried.
    #[error("Surface error: {0}")]
    Surface(wgpu::SurfaceError),

    #[error("Invalid workgroup size {size}: {reason}")]
    InvalidWorkgroupSize { size: u32, reason: String },

    #[error("Dispatch of {x}x{y} workgroups exceeds the device limit of {limit} per dimension")]
    DispatchTooLarge { x: u32, y: u32, limit: u32 },

    #[error("Grid of {cells} cells needs {bytes} bytes per state buffer, device allows {limit}")]
    GridTooLarge { cells: usize, bytes: u64, limit: u64 },

    #[error("Shader specialization failed: {0}")]
    ShaderSpecialization(String),

    #[error("Buffer mapping failed: {0}")]
    BufferMapping(String),

    #[error(transparent)]
    Core(#[from] LifeError),
}

impl GpuError {
    /// True for errors caused by invalid configuration rather than the
    /// platform. These are raised before the frame loop starts.
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidWorkgroupSize { .. }
                | Self::DispatchTooLarge { .. }
                | Self::GridTooLarge { .. }
                | Self::Core(_)
        )
    }
}

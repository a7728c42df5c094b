use life_core::LifeError;
use life_gpu::GpuError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invalid grid settings: {0}")]
    Core(#[from] LifeError),

    #[error("GPU Error: {0}")]
    Gpu(#[from] GpuError),

    #[error("Window Error: {0}")]
    Window(String),

    #[error("Visualization Error: {0}")]
    Visualization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// True when the configuration was rejected before any GPU work started.
    pub const fn is_precondition(&self) -> bool {
        match self {
            Self::Config(_) | Self::Core(_) => true,
            Self::Gpu(e) => e.is_precondition(),
            _ => false,
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        Self::Window(e.to_string())
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        Self::Window(e.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for AppError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        Self::Gpu(GpuError::SurfaceCreation(e))
    }
}

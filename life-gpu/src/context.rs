//! WGPU instance, adapter and device setup.
//!
//! This is the capability gate: either a context comes back with a device able
//! to run compute shaders and read storage buffers from the vertex stage, or
//! startup fails with [`GpuError::CapabilityUnavailable`].

use crate::GpuError;
use log::{debug, info};
use std::sync::Arc;

/// Shared WGPU handles for one simulation session.
#[derive(Debug, Clone)]
pub struct GpuContext {
    pub instance: Arc<wgpu::Instance>,
    pub adapter: Arc<wgpu::Adapter>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Creates an instance over every native backend.
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Context without a presentation surface, for offscreen runs and tests.
    pub async fn headless() -> Result<Self, GpuError> {
        Self::new(Self::create_instance(), None).await
    }

    /// Requests an adapter (compatible with `compatible_surface` when given)
    /// and a device with default limits.
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GpuError::CapabilityUnavailable(format!("no suitable adapter: {e}")))?;

        let info = adapter.get_info();
        info!(
            "Using GPU adapter: {} ({:?}, {:?})",
            info.name, info.backend, info.device_type
        );

        let required = wgpu::DownlevelFlags::COMPUTE_SHADERS | wgpu::DownlevelFlags::VERTEX_STORAGE;
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(required) {
            return Err(GpuError::CapabilityUnavailable(format!(
                "adapter '{}' lacks compute shaders or vertex-stage storage buffers",
                info.name
            )));
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Life Forge Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await?;
        debug!("Device limits: {:?}", device.limits());

        Ok(Self {
            instance: Arc::new(instance),
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }
}

//! Per-frame orchestration of the compute and render stages.

use life_core::{CellGrid, GridDims};
use log::{debug, trace, warn};
use std::sync::Arc;

use crate::{
    buffers::{current_index, GridState},
    renderer::{GridRenderer, DEFAULT_CLEAR_COLOR},
    simulation::{SimulationStep, DEFAULT_WORKGROUP_SIZE},
    sync::{download_state, upload_state},
    target::FrameTarget,
    GpuContext, GpuError,
};

/// Fixed per-session settings of a [`FrameDriver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    /// Edge of the square compute tile.
    pub workgroup_size: u32,
    /// RGBA background the render pass clears to.
    pub clear_color: [f64; 4],
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

/// Why a frame was skipped. The step counter is unchanged in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target had no frame to render into (timeout, outdated or lost surface).
    FrameUnavailable,
    /// The device reported an error for the submitted work.
    SubmissionFailed,
}

/// Result of one scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One generation was computed and drawn; `step` is the new counter.
    Presented { step: u64 },
    /// One generation was computed without drawing.
    Stepped { step: u64 },
    Skipped(SkipReason),
}

impl TickOutcome {
    /// The step counter after this tick, if it advanced.
    pub const fn step(&self) -> Option<u64> {
        match self {
            Self::Presented { step } | Self::Stepped { step } => Some(*step),
            Self::Skipped(_) => None,
        }
    }
}

/// Owns the grid state and both pipelines, and the step counter that
/// decides which buffer is current.
///
/// The counter only moves after a frame's work was submitted without error.
/// After `n` successful ticks the latest generation lives in buffer `n & 1`.
#[derive(Debug)]
pub struct FrameDriver {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    state: GridState,
    simulation: SimulationStep,
    renderer: GridRenderer,
    step: u64,
}

impl FrameDriver {
    /// Uploads `initial` and builds both pipelines. Invalid workgroup sizes
    /// and grids too large for the device fail here, before any frame runs.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Device and queue the driver submits to.
    /// * `initial` - Generation 0; uploaded into buffer 0.
    /// * `format` - Texture format of the frames the renderer draws into.
    /// * `config` - Workgroup size and clear color.
    ///
    /// # Returns
    ///
    /// * `Ok(FrameDriver)` - A driver at step 0.
    /// * `Err(GpuError)` - If the grid or the workgroup size exceeds the
    ///   device limits, or the workgroup size is zero.
    pub fn new(
        ctx: &GpuContext,
        initial: &CellGrid,
        format: wgpu::TextureFormat,
        config: &FrameConfig,
    ) -> Result<Self, GpuError> {
        let state = GridState::new(&ctx.device, initial)?;
        let simulation = SimulationStep::new(&ctx.device, &state, config.workgroup_size)?;
        let renderer = GridRenderer::new(&ctx.device, &state, format, config.clear_color);
        debug!(
            "Frame driver ready for {}x{} grid",
            state.dims().width(),
            state.dims().height()
        );
        Ok(Self {
            device: Arc::clone(&ctx.device),
            queue: Arc::clone(&ctx.queue),
            state,
            simulation,
            renderer,
            step: 0,
        })
    }

    /// Computes the next generation and draws it into a frame from `target`.
    ///
    /// The compute and render passes go into one submission. The render pass
    /// reads the buffer the compute pass just wrote, so the frame shows the
    /// new generation.
    ///
    /// # Arguments
    ///
    /// * `target` - Supplies the frame and presents it afterwards.
    ///
    /// # Returns
    ///
    /// * `Ok(TickOutcome::Presented)` - The counter advanced by one.
    /// * `Ok(TickOutcome::Skipped)` - No frame was available or the device
    ///   rejected the submission. The counter and the buffers are unchanged.
    /// * `Err(GpuError)` - If acquiring the frame failed unrecoverably.
    pub fn tick<T: FrameTarget + ?Sized>(&mut self, target: &mut T) -> Result<TickOutcome, GpuError> {
        let Some(frame) = target.acquire()? else {
            return Ok(TickOutcome::Skipped(SkipReason::FrameUnavailable));
        };

        let next = self.step.wrapping_add(1);
        let submitted = self.submit_scoped(|encoder| {
            self.simulation.encode(encoder, self.step);
            self.renderer.encode(encoder, &frame.view, next);
        });
        if !submitted {
            return Ok(TickOutcome::Skipped(SkipReason::SubmissionFailed));
        }

        self.step = next;
        target.present(frame);
        trace!("Presented step {}", self.step);
        Ok(TickOutcome::Presented { step: self.step })
    }

    /// Computes the next generation without drawing it.
    pub fn step_only(&mut self) -> TickOutcome {
        let submitted = self.submit_scoped(|encoder| {
            self.simulation.encode(encoder, self.step);
        });
        if !submitted {
            return TickOutcome::Skipped(SkipReason::SubmissionFailed);
        }
        self.step = self.step.wrapping_add(1);
        trace!("Computed step {}", self.step);
        TickOutcome::Stepped { step: self.step }
    }

    /// Records one batch, submits it and reports whether the device accepted
    /// it. Validation and out-of-memory errors raised while encoding or
    /// submitting are captured instead of reaching the device's error handler.
    fn submit_scoped(&self, record: impl FnOnce(&mut wgpu::CommandEncoder)) -> bool {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        record(&mut encoder);
        self.queue.submit(Some(encoder.finish()));

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        match validation.or(out_of_memory) {
            Some(e) => {
                warn!("Frame submission failed at step {}: {e}", self.step);
                false
            }
            None => true,
        }
    }

    /// Replaces the grid contents and restarts the counter at zero.
    pub fn load_state(&mut self, grid: &CellGrid) -> Result<(), GpuError> {
        upload_state(&self.queue, &self.state, 0, grid)?;
        self.step = 0;
        Ok(())
    }

    /// Reads the latest generation back from the GPU.
    pub async fn read_current_state(&self) -> Result<CellGrid, GpuError> {
        download_state(&self.device, &self.queue, &self.state, self.current_index()).await
    }

    /// Number of generations computed so far.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Index of the buffer holding the latest generation.
    pub const fn current_index(&self) -> usize {
        current_index(self.step)
    }

    pub const fn dims(&self) -> GridDims {
        self.state.dims()
    }

    pub const fn state(&self) -> &GridState {
        &self.state
    }

    pub const fn simulation(&self) -> &SimulationStep {
        &self.simulation
    }

    pub const fn renderer(&self) -> &GridRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_frame() {
        let config = FrameConfig::default();
        assert_eq!(config.workgroup_size, 8);
        assert_eq!(config.clear_color, [0.0, 0.0, 0.4, 1.0]);
    }

    #[test]
    fn skipped_ticks_report_no_step() {
        assert_eq!(TickOutcome::Presented { step: 3 }.step(), Some(3));
        assert_eq!(TickOutcome::Stepped { step: 1 }.step(), Some(1));
        assert_eq!(
            TickOutcome::Skipped(SkipReason::FrameUnavailable).step(),
            None
        );
    }
}

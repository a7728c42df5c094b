//! GPU-resident cellular automaton built on WGPU.
//!
//! Two storage buffers hold alternate generations of the grid. Each frame a
//! compute pass reads one and writes the other, then a render pass draws the
//! freshly written buffer as one instanced quad per cell.

// --- Private/Internal Modules ---
mod error;
mod shaders;

// --- Public Modules ---
pub mod buffers;
pub mod context;
pub mod driver;
pub mod renderer;
pub mod simulation;
pub mod sync;
pub mod target;

// --- Public Re-exports --- //
pub use buffers::{GridState, GridUniform, QUAD_VERTICES};
pub use context::GpuContext;
pub use driver::{FrameConfig, FrameDriver, SkipReason, TickOutcome};
pub use error::GpuError;
pub use renderer::GridRenderer;
pub use simulation::SimulationStep;
pub use target::{AcquiredFrame, FrameTarget, OffscreenTarget, WindowSurface};

// Re-export the grid model used in public signatures.
pub use life_core::{CellGrid, GridDims};

//! Fixed-length run against an offscreen target.

use life_core::{seed_random, CellGrid};
use life_gpu::{FrameDriver, FrameTarget, GpuContext, OffscreenTarget, TickOutcome};
use log::{debug, info};

use crate::config::Settings;
use crate::progress::{ConsoleProgressReporter, ProgressInfo, ProgressReporter};
use crate::visualization::{TerminalVisualizer, Visualizer};
use crate::AppError;

/// Edge of the offscreen frame, in pixels.
pub const HEADLESS_FRAME_SIZE: u32 = 512;

/// Consecutive skipped frames after which the run is abandoned.
pub const MAX_CONSECUTIVE_SKIPS: u64 = 32;

/// What a headless run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub step: u64,
    pub skipped_frames: u64,
    pub population: usize,
}

/// Seeds a grid from `settings` and runs `settings.steps` frames offscreen.
///
/// # Arguments
///
/// * `settings` - Validated settings; `steps` bounds the run.
///
/// # Returns
///
/// * `Ok(HeadlessSummary)` - The final step, skipped frames and population.
/// * `Err(AppError)` - If no GPU is available, the device rejects the grid or
///   workgroup size, or too many consecutive frames are skipped.
pub fn run_headless(settings: &Settings) -> Result<HeadlessSummary, AppError> {
    let initial = seed_random(settings.dims()?, &settings.seed_config())?;
    info!(
        "Seeded {}x{} grid with {} live cells",
        initial.width(),
        initial.height(),
        initial.population()
    );

    let ctx = pollster::block_on(GpuContext::headless())?;
    let mut target = OffscreenTarget::new(&ctx, HEADLESS_FRAME_SIZE, HEADLESS_FRAME_SIZE);
    let mut driver = FrameDriver::new(&ctx, &initial, target.format(), &settings.frame_config())?;
    let mut reporter = settings
        .progress_interval()?
        .map(ConsoleProgressReporter::new);

    let summary = match drive(&mut driver, &mut target, settings.steps, reporter.as_mut()) {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(r) = reporter.as_mut() {
                r.fail(&e)?;
            }
            return Err(e);
        }
    };

    let final_state: CellGrid = pollster::block_on(driver.read_current_state())?;
    info!(
        "Headless run finished at step {} with {} live cells",
        summary.step,
        final_state.population()
    );
    if settings.visualize {
        show_state(&mut TerminalVisualizer::stdout(), summary.step, &final_state)?;
    }

    Ok(HeadlessSummary {
        population: final_state.population(),
        ..summary
    })
}

fn show_state(
    visualizer: &mut impl Visualizer,
    step: u64,
    grid: &CellGrid,
) -> Result<(), AppError> {
    visualizer
        .display_state(step, grid)
        .map_err(|e| AppError::Visualization(e.to_string()))
}

/// Ticks `driver` against `target` until it reaches `steps`. Gives up after
/// [`MAX_CONSECUTIVE_SKIPS`] skipped frames in a row.
fn drive<T: FrameTarget + ?Sized>(
    driver: &mut FrameDriver,
    target: &mut T,
    steps: u64,
    mut reporter: Option<&mut ConsoleProgressReporter>,
) -> Result<HeadlessSummary, AppError> {
    let mut info = ProgressInfo {
        step: driver.step(),
        skipped_frames: 0,
        target_steps: Some(steps),
    };
    let mut consecutive_skips = 0;
    while info.step < steps {
        match driver.tick(target)? {
            TickOutcome::Skipped(reason) => {
                debug!("Frame skipped: {reason:?}");
                info.skipped_frames += 1;
                consecutive_skips += 1;
                if consecutive_skips >= MAX_CONSECUTIVE_SKIPS {
                    return Err(anyhow::anyhow!(
                        "{consecutive_skips} consecutive frames skipped at step {}, last reason {reason:?}",
                        info.step
                    )
                    .into());
                }
            }
            outcome => {
                info.step = outcome.step().unwrap_or(info.step);
                consecutive_skips = 0;
            }
        }
        if let Some(r) = reporter.as_deref_mut() {
            r.report(&info)?;
        }
    }
    if let Some(r) = reporter {
        r.finish(&info)?;
    }
    Ok(HeadlessSummary {
        step: info.step,
        skipped_frames: info.skipped_frames,
        population: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{GridDims, Pattern};
    use life_gpu::{AcquiredFrame, FrameConfig, GpuError};
    use std::io::{self, Write};

    fn setup_context() -> Option<GpuContext> {
        let _ = env_logger::builder().is_test(true).try_init();
        match pollster::block_on(GpuContext::headless()) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                eprintln!("Skipping GPU test: Failed to initialize wgpu: {}", e);
                None
            }
        }
    }

    fn blinker_driver(ctx: &GpuContext) -> FrameDriver {
        let dims = GridDims::new(8, 8).unwrap();
        let initial = Pattern::Blinker.on_grid(dims, 3, 3).unwrap();
        FrameDriver::new(
            ctx,
            &initial,
            OffscreenTarget::FORMAT,
            &FrameConfig::default(),
        )
        .unwrap()
    }

    /// Never has a frame to hand out.
    #[derive(Default)]
    struct UnavailableTarget {
        attempts: u64,
    }

    impl FrameTarget for UnavailableTarget {
        fn format(&self) -> wgpu::TextureFormat {
            OffscreenTarget::FORMAT
        }

        fn acquire(&mut self) -> Result<Option<AcquiredFrame>, GpuError> {
            self.attempts += 1;
            Ok(None)
        }
    }

    /// Hands out a frame on every other call.
    struct FlakyTarget {
        inner: OffscreenTarget,
        calls: u64,
    }

    impl FrameTarget for FlakyTarget {
        fn format(&self) -> wgpu::TextureFormat {
            self.inner.format()
        }

        fn acquire(&mut self) -> Result<Option<AcquiredFrame>, GpuError> {
            self.calls += 1;
            if self.calls % 2 == 1 {
                return Ok(None);
            }
            self.inner.acquire()
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_visualizer_failure_is_visualization_error() {
        let dims = GridDims::new(2, 2).unwrap();
        let grid = Pattern::Block.on_grid(dims, 0, 0).unwrap();
        let err = show_state(&mut TerminalVisualizer::new(ClosedPipe), 1, &grid).unwrap_err();
        assert!(matches!(&err, AppError::Visualization(msg) if msg.contains("stdout closed")));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_drive_aborts_after_consecutive_skips() {
        let Some(ctx) = setup_context() else {
            return;
        };
        let mut driver = blinker_driver(&ctx);
        let mut target = UnavailableTarget::default();

        let err = drive(&mut driver, &mut target, 5, None).unwrap_err();
        assert!(
            err.to_string()
                .contains("32 consecutive frames skipped at step 0"),
            "unexpected error: {err}"
        );
        assert_eq!(target.attempts, MAX_CONSECUTIVE_SKIPS);
        assert_eq!(driver.step(), 0);
    }

    #[test]
    fn test_drive_counts_skips_and_still_reaches_target() {
        let Some(ctx) = setup_context() else {
            return;
        };
        let mut driver = blinker_driver(&ctx);
        let mut target = FlakyTarget {
            inner: OffscreenTarget::new(&ctx, 16, 16),
            calls: 0,
        };

        let summary = drive(&mut driver, &mut target, 3, None).unwrap();
        assert_eq!(summary.step, 3);
        assert_eq!(summary.skipped_frames, 3);
        assert_eq!(driver.step(), 3);

        // Skipped frames left the parity alone: after three generations the
        // blinker is in its vertical phase.
        let state = pollster::block_on(driver.read_current_state()).unwrap();
        let vertical =
            CellGrid::from_live_cells(state.dims(), &[(4, 2), (4, 3), (4, 4)]).unwrap();
        assert_eq!(state, vertical);
    }

    #[test]
    fn test_drive_with_reporter_finishes() {
        let Some(ctx) = setup_context() else {
            return;
        };
        let mut driver = blinker_driver(&ctx);
        let mut target = OffscreenTarget::new(&ctx, 16, 16);
        let mut reporter = ConsoleProgressReporter::new(std::time::Duration::ZERO);

        let summary = drive(&mut driver, &mut target, 4, Some(&mut reporter)).unwrap();
        assert_eq!(summary.step, 4);
        assert_eq!(summary.skipped_frames, 0);
        assert!(reporter.reports() >= 1);
    }
}

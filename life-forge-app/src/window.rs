//! Windowed run: one simulation tick per redraw, paced by vsync.

use life_core::seed_random;
use life_gpu::{FrameDriver, FrameTarget, GpuContext, TickOutcome, WindowSurface};
use log::{debug, error, info};
use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use crate::config::Settings;
use crate::progress::{ConsoleProgressReporter, ProgressInfo, ProgressReporter};
use crate::AppError;

/// Initial inner size of the window, in logical pixels.
pub const WINDOW_SIZE: f64 = 512.0;

/// Opens a window and runs the simulation until it is closed.
///
/// Closing the window or pressing Escape ends the run. A fatal tick error
/// also ends it and is returned.
pub fn run_windowed(settings: &Settings) -> Result<(), AppError> {
    let initial = seed_random(settings.dims()?, &settings.seed_config())?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!(
                "Life Forge {}x{}",
                initial.width(),
                initial.height()
            ))
            .with_inner_size(LogicalSize::new(WINDOW_SIZE, WINDOW_SIZE))
            .build(&event_loop)?,
    );

    let instance = GpuContext::create_instance();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let ctx = pollster::block_on(GpuContext::new(instance, Some(&surface)))?;
    let size = window.inner_size();
    let mut surface = WindowSurface::new(&ctx, surface, size.width, size.height)?;
    let mut driver = FrameDriver::new(&ctx, &initial, surface.format(), &settings.frame_config())?;
    let mut reporter = settings
        .progress_interval()?
        .map(ConsoleProgressReporter::new);
    let mut info = ProgressInfo {
        step: 0,
        skipped_frames: 0,
        target_steps: None,
    };
    let mut failure: Option<AppError> = None;

    info!("Window open, running until closed");
    window.request_redraw();

    event_loop.run(|event, elwt| {
        let Event::WindowEvent { window_id, event } = event else {
            return;
        };
        if window_id != window.id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => elwt.exit(),
            WindowEvent::Resized(size) => {
                surface.resize(size.width, size.height);
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                match driver.tick(&mut surface) {
                    Ok(TickOutcome::Skipped(reason)) => {
                        debug!("Frame skipped: {reason:?}");
                        info.skipped_frames += 1;
                    }
                    Ok(outcome) => info.step = outcome.step().unwrap_or(info.step),
                    Err(e) => {
                        error!("Stopping simulation: {e}");
                        failure = Some(e.into());
                        elwt.exit();
                        return;
                    }
                }
                if let Some(r) = reporter.as_mut() {
                    if let Err(e) = r.report(&info) {
                        failure = Some(e.into());
                        elwt.exit();
                        return;
                    }
                }
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    if let Some(r) = reporter.as_mut() {
        match &failure {
            Some(e) => r.fail(e)?,
            None => r.finish(&info)?,
        }
    }
    failure.map_or(Ok(()), Err)
}

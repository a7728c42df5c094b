//! Life Forge Application Library
//!
//! Configuration, logging and the two run modes (windowed and headless) of
//! the Life Forge simulator.

pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod progress;
pub mod visualization;
pub mod window;

pub use config::{AppConfig, Settings};
pub use error::AppError;

use clap::Parser;
use log::{debug, error, info};

/// Parses the command line and runs the configured mode.
///
/// Settings are validated before the logger, the window or the GPU are set
/// up, so invalid input fails fast with only the error message.
pub fn run() -> anyhow::Result<()> {
    let cli = AppConfig::parse();
    let settings = cli.resolve()?;

    logging::init_logger(settings.log_level);
    info!("Life Forge starting");
    debug!("Resolved settings: {:?}", settings);

    let result = if settings.headless {
        headless::run_headless(&settings).map(|summary| {
            info!(
                "Completed {} steps ({} skipped frames), final population {}",
                summary.step, summary.skipped_frames, summary.population
            );
        })
    } else {
        window::run_windowed(&settings)
    };

    match &result {
        Err(e) if e.is_precondition() => error!("Rejected by the device limits: {e}"),
        Err(e) => error!("{e}"),
        Ok(()) => {}
    }
    Ok(result?)
}

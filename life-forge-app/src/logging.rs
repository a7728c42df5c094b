//! Logging setup for the application.

use crate::config::LogLevel;
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `level` is the configured verbosity. A `RUST_LOG` variable, when set,
/// overrides it. The graphics stack is capped at `warn` so that a `debug`
/// run shows the simulation's own messages rather than per-call driver noise.
pub fn init_logger(level: LogLevel) {
    let mut builder = Builder::new();
    builder.filter_level(level.to_level_filter());
    for noisy in ["wgpu_core", "wgpu_hal", "naga"] {
        builder.filter_module(noisy, level.to_level_filter().min(LevelFilter::Warn));
    }

    // RUST_LOG directives are parsed last so they win over the defaults above.
    builder.parse_env(Env::default());

    if builder.try_init().is_err() {
        log::warn!("Logger already initialized, keeping the existing one");
        return;
    }

    log::debug!("Logger initialized with global log level: {:?}", level);
}

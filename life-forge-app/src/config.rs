use clap::{Parser, ValueEnum};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use life_core::{GridDims, SeedConfig};
use life_gpu::FrameConfig;
use log::LevelFilter;
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

use crate::AppError;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "LIFE_FORGE_";

/// Verbosity of the global logger.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Command-line arguments of Life Forge.
///
/// Simulation settings left unset here fall through to the environment
/// (`LIFE_FORGE_*`), then the `--config` TOML file, then the defaults.
#[derive(Parser, Serialize, Debug, Default)]
#[command(author, version, about = "GPU Game of Life on a toroidal grid", long_about = None)]
pub struct AppConfig {
    /// Path to a TOML file with simulation settings.
    #[arg(short, long, value_name = "FILE", env = "LIFE_FORGE_CONFIG")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Number of cell columns.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Number of cell rows.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Chance that each cell starts alive, in [0, 1].
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Edge of the square compute tile.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_size: Option<u32>,

    /// Background color as four comma-separated components in [0, 1].
    #[arg(long, value_name = "R,G,B,A", value_delimiter = ',')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_color: Option<Vec<f64>>,

    /// Render offscreen instead of opening a window.
    #[arg(long, default_value_t = false)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub headless: bool,

    /// Number of frames to run in headless mode.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u64>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration"
    )]
    pub report_progress_interval: Option<Duration>,

    /// Print the final grid to the terminal after a headless run.
    #[arg(long, default_value_t = false)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub visualize: bool,

    /// Global log level. RUST_LOG takes precedence when set.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

fn serialize_duration<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_str(&humantime::format_duration(*d).to_string()),
        None => s.serialize_none(),
    }
}

impl AppConfig {
    /// The layered configuration sources, lowest precedence first.
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = &self.config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
            .merge(Serialized::defaults(self))
    }

    /// Merges all sources and validates the result.
    pub fn resolve(&self) -> Result<Settings, AppError> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
        }
        let settings: Settings = self
            .figment()
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Fully resolved simulation settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub workgroup_size: u32,
    pub clear_color: [f64; 4],
    pub headless: bool,
    pub steps: u64,
    /// Human-readable duration such as "2s".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_progress_interval: Option<String>,
    pub visualize: bool,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        let frame = FrameConfig::default();
        let seed = SeedConfig::default();
        Self {
            width: 32,
            height: 32,
            probability: seed.probability,
            seed: seed.seed,
            workgroup_size: frame.workgroup_size,
            clear_color: frame.clear_color,
            headless: false,
            steps: 64,
            report_progress_interval: None,
            visualize: false,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Rejects settings that could never produce a valid simulation. Runs
    /// before any window or GPU device is created.
    pub fn validate(&self) -> Result<(), AppError> {
        self.dims()?;
        self.seed_config().validate()?;
        if self.workgroup_size == 0 {
            return Err(AppError::Config(
                "workgroup_size must be positive".to_string(),
            ));
        }
        if let Some(c) = self.clear_color.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(AppError::Config(format!(
                "clear_color component {c} is outside [0, 1]"
            )));
        }
        self.progress_interval()?;
        Ok(())
    }

    pub fn dims(&self) -> Result<GridDims, AppError> {
        Ok(GridDims::new(self.width, self.height)?)
    }

    pub const fn seed_config(&self) -> SeedConfig {
        SeedConfig {
            probability: self.probability,
            seed: self.seed,
        }
    }

    pub const fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            workgroup_size: self.workgroup_size,
            clear_color: self.clear_color,
        }
    }

    pub fn progress_interval(&self) -> Result<Option<Duration>, AppError> {
        self.report_progress_interval
            .as_deref()
            .map(|s| {
                humantime::parse_duration(s).map_err(|e| {
                    AppError::Config(format!("invalid report_progress_interval '{s}': {e}"))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn parse(args: &[&str]) -> AppConfig {
        let mut full = vec!["life-forge"];
        full.extend_from_slice(args);
        AppConfig::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_| {
            let settings = parse(&[]).resolve().unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!((settings.width, settings.height), (32, 32));
            assert_eq!(settings.probability, 0.4);
            assert_eq!(settings.workgroup_size, 8);
            assert_eq!(settings.clear_color, [0.0, 0.0, 0.4, 1.0]);
            assert!(!settings.headless);
            assert_eq!(settings.progress_interval().unwrap(), None);
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides() {
        Jail::expect_with(|_| {
            let settings = parse(&[
                "--width",
                "13",
                "--height",
                "7",
                "--seed",
                "99",
                "--clear-color",
                "1,1,1,1",
                "--headless",
                "--report-progress-interval",
                "2s",
                "--log-level",
                "debug",
            ])
            .resolve()
            .unwrap();
            assert_eq!((settings.width, settings.height), (13, 7));
            assert_eq!(settings.seed, Some(99));
            assert_eq!(settings.clear_color, [1.0; 4]);
            assert!(settings.headless);
            assert_eq!(
                settings.progress_interval().unwrap(),
                Some(Duration::from_secs(2))
            );
            assert_eq!(settings.log_level, LogLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn test_layering_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "life.toml",
                r#"
                    width = 20
                    height = 10
                    probability = 0.25
                    steps = 5
                "#,
            )?;
            jail.set_env("LIFE_FORGE_HEIGHT", "12");
            jail.set_env("LIFE_FORGE_STEPS", "6");

            let settings = parse(&["--config", "life.toml", "--steps", "7"])
                .resolve()
                .map_err(|e| e.to_string())?;
            assert_eq!(settings.width, 20); // file
            assert_eq!(settings.height, 12); // env over file
            assert_eq!(settings.probability, 0.25); // file
            assert_eq!(settings.steps, 7); // cli over env
            assert_eq!(settings.workgroup_size, 8); // default
            Ok(())
        });
    }

    #[test]
    fn test_config_path_from_env() {
        Jail::expect_with(|jail| {
            jail.create_file("env.toml", "workgroup_size = 4")?;
            jail.set_env("LIFE_FORGE_CONFIG", "env.toml");
            let settings = parse(&[]).resolve().map_err(|e| e.to_string())?;
            assert_eq!(settings.workgroup_size, 4);
            Ok(())
        });
    }

    #[test]
    fn test_rejects_invalid_settings() {
        Jail::expect_with(|_| {
            let zero = parse(&["--width", "0"]).resolve().unwrap_err();
            assert!(matches!(zero, AppError::Core(_)));
            assert!(zero.is_precondition());

            let prob = parse(&["--probability", "1.5"]).resolve().unwrap_err();
            assert!(prob.to_string().contains("probability"));

            let wg = parse(&["--workgroup-size", "0"]).resolve().unwrap_err();
            assert!(matches!(wg, AppError::Config(_)));

            let color = parse(&["--clear-color", "0,0,2,1"]).resolve().unwrap_err();
            assert!(color.to_string().contains("clear_color"));

            let short = parse(&["--clear-color", "0,0,1"]).resolve().unwrap_err();
            assert!(matches!(short, AppError::Config(_)));

            let missing = parse(&["--config", "nope.toml"]).resolve().unwrap_err();
            assert!(missing.to_string().contains("not found"));
            Ok(())
        });
    }

    #[test]
    fn test_bad_env_interval() {
        Jail::expect_with(|jail| {
            jail.set_env("LIFE_FORGE_REPORT_PROGRESS_INTERVAL", "soon");
            let err = parse(&[]).resolve().unwrap_err();
            assert!(err.to_string().contains("report_progress_interval"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_log_level_rejected_by_cli() {
        assert!(AppConfig::try_parse_from(["life-forge", "--log-level", "loud"]).is_err());
    }
}

use anyhow::Result;
use std::time::{Duration, Instant};

/// Snapshot of a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Generations computed so far.
    pub step: u64,
    /// Frames skipped because no frame or device submission was available.
    pub skipped_frames: u64,
    /// Total generations the run will compute, when bounded.
    pub target_steps: Option<u64>,
}

/// Trait for reporting the progress of a simulation run.
pub trait ProgressReporter {
    /// Called once per frame with updated progress information.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the run ends normally.
    fn finish(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the run stops on an error.
    fn fail(&mut self, error: &dyn std::error::Error) -> Result<()>;
}

/// A `ProgressReporter` that logs status updates at most once per interval.
pub struct ConsoleProgressReporter {
    start_time: Instant,
    last_report_time: Instant,
    report_interval: Duration,
    reports: u64,
}

impl ConsoleProgressReporter {
    pub fn new(report_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_report_time: now,
            report_interval,
            reports: 0,
        }
    }

    /// Number of progress lines emitted so far.
    pub const fn reports(&self) -> u64 {
        self.reports
    }

    fn steps_per_second(step: u64, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            step as f64 / secs
        } else {
            0.0
        }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let now = Instant::now();
        if now.duration_since(self.last_report_time) < self.report_interval {
            return Ok(());
        }
        let elapsed = self.start_time.elapsed();
        let target = info
            .target_steps
            .map_or_else(String::new, |t| format!("/{t}"));
        log::info!(
            "Progress: step {}{} | skipped frames: {} | {:.1} steps/s | elapsed: {}",
            info.step,
            target,
            info.skipped_frames,
            Self::steps_per_second(info.step, elapsed),
            humantime::format_duration(Duration::from_millis(elapsed.as_millis() as u64))
        );
        self.last_report_time = now;
        self.reports += 1;
        Ok(())
    }

    fn finish(&mut self, info: &ProgressInfo) -> Result<()> {
        let elapsed = self.start_time.elapsed();
        log::info!(
            "Simulation finished at step {} ({} skipped frames, {:.1} steps/s)",
            info.step,
            info.skipped_frames,
            Self::steps_per_second(info.step, elapsed)
        );
        Ok(())
    }

    fn fail(&mut self, error: &dyn std::error::Error) -> Result<()> {
        log::error!(
            "Simulation failed after {}: {}",
            humantime::format_duration(Duration::from_millis(
                self.start_time.elapsed().as_millis() as u64
            )),
            error
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn info(step: u64) -> ProgressInfo {
        ProgressInfo {
            step,
            skipped_frames: 0,
            target_steps: Some(100),
        }
    }

    #[test]
    fn test_reports_are_rate_limited() {
        let mut reporter = ConsoleProgressReporter::new(Duration::from_millis(50));
        reporter.report(&info(1)).unwrap();
        reporter.report(&info(2)).unwrap();
        assert_eq!(reporter.reports(), 0);

        thread::sleep(Duration::from_millis(60));
        reporter.report(&info(3)).unwrap();
        assert_eq!(reporter.reports(), 1);
        reporter.report(&info(4)).unwrap();
        assert_eq!(reporter.reports(), 1);

        reporter.finish(&info(4)).unwrap();
    }

    #[test]
    fn test_zero_interval_reports_every_frame() {
        let mut reporter = ConsoleProgressReporter::new(Duration::ZERO);
        for step in 1..=3 {
            reporter.report(&info(step)).unwrap();
        }
        assert_eq!(reporter.reports(), 3);
    }

    #[test]
    fn test_steps_per_second() {
        let rate = ConsoleProgressReporter::steps_per_second(120, Duration::from_secs(2));
        assert!((rate - 60.0).abs() < f64::EPSILON);
        assert_eq!(
            ConsoleProgressReporter::steps_per_second(5, Duration::ZERO),
            0.0
        );
    }
}

use chrono::{DateTime, FixedOffset, Local};

/// Extension of the observation results file.
pub const RESULTS_EXTENSION: &str = "pber";
/// Extension of the serialized composite state file.
pub const STATE_EXTENSION: &str = "pbg";

/// Source of the wall-clock instant that names a run's output files.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The local system clock, including its UTC offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// The instant a run's outputs are materialized, and the file names derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp {
    instant: DateTime<FixedOffset>,
}

impl RunStamp {
    pub fn capture(clock: &dyn Clock) -> Self {
        Self {
            instant: clock.now(),
        }
    }

    fn date(&self) -> String {
        self.instant.format("%Y-%m-%d").to_string()
    }

    fn timezone(&self) -> String {
        self.instant.format("%z").to_string()
    }

    // Colons are not portable in file names.
    fn time(&self) -> String {
        self.instant.format("%H-%M-%S%.6f").to_string()
    }

    /// `results_<date>[<tz>#<time>].pber`
    pub fn results_file_name(&self) -> String {
        format!(
            "results_{}[{}#{}].{}",
            self.date(),
            self.timezone(),
            self.time(),
            RESULTS_EXTENSION
        )
    }

    /// `state_<date>#<time>.pbg`
    pub fn state_file_name(&self) -> String {
        format!("state_{}#{}.{}", self.date(), self.time(), STATE_EXTENSION)
    }
}

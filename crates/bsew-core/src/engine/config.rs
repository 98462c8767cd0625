use crate::core::schema::InputFormats;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Interval must be a positive, finite number of time units, got {0}")]
    InvalidInterval(f64),
}

/// Everything a single experiment run needs. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub interval: f64,
    pub formats: InputFormats,
}

#[derive(Default)]
pub struct ExperimentConfigBuilder {
    input_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    interval: Option<f64>,
    formats: Option<InputFormats>,
}

impl ExperimentConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: PathBuf) -> Self {
        self.input_file = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }
    pub fn formats(mut self, formats: InputFormats) -> Self {
        self.formats = Some(formats);
        self
    }

    pub fn build(self) -> Result<ExperimentConfig, ConfigError> {
        let interval = self
            .interval
            .ok_or(ConfigError::MissingParameter("interval"))?;
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::InvalidInterval(interval));
        }
        Ok(ExperimentConfig {
            input_file: self
                .input_file
                .ok_or(ConfigError::MissingParameter("input_file"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            interval,
            formats: self.formats.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::new()
            .input_file(PathBuf::from("/data/exp.pbif"))
            .output_dir(PathBuf::from("/data/out"))
            .interval(2.5)
    }

    #[test]
    fn builds_with_default_formats() {
        let config = complete().build().unwrap();
        assert_eq!(config.interval, 2.5);
        assert_eq!(config.formats, InputFormats::default());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let err = ExperimentConfigBuilder::new()
            .interval(1.0)
            .output_dir(PathBuf::from("/out"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("input_file"));

        let err = ExperimentConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("interval"));
    }

    #[test]
    fn non_positive_or_non_finite_intervals_are_rejected() {
        for bad in [0.0, -1.0, f64::INFINITY] {
            let err = complete().interval(bad).build().unwrap_err();
            assert_eq!(err, ConfigError::InvalidInterval(bad));
        }
        assert!(matches!(
            complete().interval(f64::NAN).build(),
            Err(ConfigError::InvalidInterval(_))
        ));
    }
}

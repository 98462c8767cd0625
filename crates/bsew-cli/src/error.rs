use bsew::workflows::run::ExperimentError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

pub const INPUT_USAGE_MESSAGE: &str =
    "error: `input_file_path` must be a JSON/PBIF file (or an archive containing one) that exists!";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Experiment(#[from] ExperimentError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 11,
            Self::Experiment(ExperimentError::Schema(_)) => 12,
            Self::Experiment(ExperimentError::Engine(_)) => 13,
            _ => 1,
        }
    }

    /// Renders the error for standard error, followed by any causes not already
    /// part of the message.
    pub fn report(&self) -> String {
        if let Self::Usage(message) = self {
            return message.clone();
        }

        let mut report = format!("❌ Error: {self}");
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !report.contains(&cause_text) {
                report.push_str(&format!("\n  caused by: {cause_text}"));
            }
            source = cause.source();
        }
        report
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a [`Process`](super::process::Process) implementation.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing input on port '{0}'")]
    MissingInput(String),

    #[error("Invalid value on port '{port}': {reason}")]
    InvalidInput { port: String, reason: String },

    #[error("File I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Failed(String),
}

/// Failure raised while building or running a composite.
///
/// Variants are split into schema-reference errors, which mean the experiment
/// description itself is wrong, and runtime errors raised while simulating. Use
/// [`EngineError::is_schema_error`] to tell them apart.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unknown process address '{address}' at '{path}'")]
    UnknownAddress { address: String, path: String },

    #[error("Unsupported protocol '{protocol}' in address '{address}' at '{path}'")]
    UnsupportedProtocol {
        protocol: String,
        address: String,
        path: String,
    },

    #[error("Failed to configure process at '{path}': {source}")]
    ProcessConfig {
        path: String,
        #[source]
        source: ProcessError,
    },

    #[error("Invalid wiring for process at '{path}': {reason}")]
    Wiring { path: String, reason: String },

    #[error("Process at '{path}' failed at t={time}: {source}")]
    StepFailed {
        path: String,
        time: f64,
        #[source]
        source: ProcessError,
    },

    #[error("Run duration must be a finite, non-negative number, got {0}")]
    InvalidDuration(f64),

    #[error("Failed to save composite state to '{}': {source}", .path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize composite state: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSchema(_)
                | Self::UnknownAddress { .. }
                | Self::UnsupportedProtocol { .. }
                | Self::ProcessConfig { .. }
                | Self::Wiring { .. }
        )
    }
}

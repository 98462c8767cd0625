//! The experiment schema and the rules for recognizing schema and archive inputs.

pub mod locator;

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A composite process experiment, as a JSON object.
///
/// The contents are opaque at this layer; the engine validates them when a
/// [`Composite`](crate::engine::composite::Composite) is built from the schema.
/// A schema read from disk remembers its directory so that relative paths in
/// process configs point at files shipped alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    document: Map<String, Value>,
    base_dir: Option<PathBuf>,
}

impl Schema {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(document) => Some(Self {
                document,
                base_dir: None,
            }),
            _ => None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.document)
    }
}

/// File extensions (without the leading dot, compared case-insensitively) that
/// identify archive bundles and schema documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFormats {
    pub archive_extensions: Vec<String>,
    pub schema_extensions: Vec<String>,
}

impl Default for InputFormats {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["omex".to_string(), "zip".to_string()],
            schema_extensions: vec!["pbif".to_string(), "json".to_string()],
        }
    }
}

impl InputFormats {
    pub fn is_archive(&self, path: &Path) -> bool {
        has_extension(path, &self.archive_extensions)
    }

    pub fn is_schema(&self, path: &Path) -> bool {
        has_extension(path, &self.schema_extensions)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Could not find any PBIF or JSON file in or at `{}`.", .input.display())]
    NotFound { input: PathBuf },

    #[error("File I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to extract archive '{}': {source}", .path.display())]
    Archive {
        path: PathBuf,
        source: crate::core::io::archive::ArchiveError,
    },

    #[error("JSON parsing error for '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Schema in '{}' is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
}

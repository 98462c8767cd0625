use super::error::ProcessError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Values on a process's ports, keyed by port name.
pub type Ports = Map<String, Value>;

/// How a process node is scheduled by the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// Fires on its own interval; its outputs are applied as deltas.
    Process,
    /// Fires after every round of processes; its outputs replace stored values.
    Step,
}

impl ProcessKind {
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "process" => Some(Self::Process),
            "step" => Some(Self::Step),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Step => "step",
        }
    }
}

/// A named, pluggable simulation component.
///
/// Implementations are constructed by a factory registered in the
/// [`ProcessRegistry`](super::registry::ProcessRegistry) and are driven by a
/// [`Composite`](super::composite::Composite).
pub trait Process {
    /// Computes this process's outputs for one firing.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The current values wired to each input port.
    /// * `interval` - Simulated time elapsed since the previous firing (zero for a
    ///   step's first firing).
    /// * `time` - The composite's global time at this firing.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] when the inputs are unusable or the simulation fails.
    fn update(&mut self, inputs: &Ports, interval: f64, time: f64) -> Result<Ports, ProcessError>;

    /// Observation records accumulated by emitter processes.
    fn emitted(&self) -> Option<&[Value]> {
        None
    }
}

/// Construction-time facts a factory may need beyond the node's `config`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessContext {
    base_dir: Option<PathBuf>,
}

impl ProcessContext {
    /// A context whose relative paths resolve against `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Joins a relative `path` onto the base directory. Absolute paths, and every
    /// path when there is no base directory, are returned as given.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

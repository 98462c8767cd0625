use super::error::{EngineError, ProcessError};
use super::process::{Process, ProcessContext};
use super::processes;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// The only address protocol this registry resolves.
pub const LOCAL_PROTOCOL: &str = "local";

pub type ProcessFactory = Box<
    dyn Fn(&Map<String, Value>, &ProcessContext) -> Result<Box<dyn Process>, ProcessError>
        + Send
        + Sync,
>;

/// Named process implementations available to composites (the engine "core").
///
/// A registry is built once per program run and handed to every composite that
/// needs it.
#[derive(Default)]
pub struct ProcessRegistry {
    factories: HashMap<String, ProcessFactory>,
}

impl fmt::Debug for ProcessRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in processes.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        processes::register_builtins(&mut registry);
        debug!("Process registry loaded with {:?}", registry.names());
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>, &ProcessContext) -> Result<Box<dyn Process>, ProcessError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves `address` (`protocol:name`) and instantiates the process with `config`.
    ///
    /// `path` is the location of the process node in the state tree, used for error
    /// reporting only.
    pub fn instantiate(
        &self,
        address: &str,
        config: &Map<String, Value>,
        context: &ProcessContext,
        path: &str,
    ) -> Result<Box<dyn Process>, EngineError> {
        let (protocol, name) = address.split_once(':').unwrap_or((LOCAL_PROTOCOL, address));
        if protocol != LOCAL_PROTOCOL {
            return Err(EngineError::UnsupportedProtocol {
                protocol: protocol.to_string(),
                address: address.to_string(),
                path: path.to_string(),
            });
        }

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::UnknownAddress {
                address: address.to_string(),
                path: path.to_string(),
            })?;

        factory(config, context).map_err(|source| EngineError::ProcessConfig {
            path: path.to_string(),
            source,
        })
    }
}

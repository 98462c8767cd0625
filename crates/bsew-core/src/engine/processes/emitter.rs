use crate::engine::composite::GLOBAL_TIME_KEY;
use crate::engine::error::ProcessError;
use crate::engine::process::{Ports, Process};
use serde_json::{Map, Value};

pub const NAME: &str = "ram-emitter";

/// Keeps an in-memory history of its wired inputs.
///
/// Each firing appends one record holding every wired input (or only the ports
/// listed in `config.emit`, when given) plus the global time.
#[derive(Debug, Default)]
pub struct RamEmitter {
    emit: Option<Vec<String>>,
    history: Vec<Value>,
}

impl RamEmitter {
    pub fn from_config(config: &Map<String, Value>) -> Result<Box<dyn Process>, ProcessError> {
        let emit = match config.get("emit") {
            None | Some(Value::Null) => None,
            Some(Value::Object(ports)) => Some(ports.keys().cloned().collect()),
            Some(Value::Array(ports)) => Some(
                ports
                    .iter()
                    .map(|p| {
                        p.as_str().map(str::to_string).ok_or_else(|| {
                            ProcessError::InvalidConfig(format!("`emit` entry {p} is not a string"))
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Some(other) => {
                return Err(ProcessError::InvalidConfig(format!(
                    "`emit` must be an object or a list of port names, got {other}"
                )));
            }
        };
        Ok(Box::new(Self {
            emit,
            history: Vec::new(),
        }))
    }
}

impl Process for RamEmitter {
    fn update(&mut self, inputs: &Ports, _interval: f64, time: f64) -> Result<Ports, ProcessError> {
        let mut record: Map<String, Value> = match &self.emit {
            Some(ports) => inputs
                .iter()
                .filter(|(port, _)| ports.contains(*port))
                .map(|(port, value)| (port.clone(), value.clone()))
                .collect(),
            None => inputs.clone(),
        };
        record
            .entry(GLOBAL_TIME_KEY)
            .or_insert_with(|| Value::from(time));
        self.history.push(Value::Object(record));
        Ok(Ports::new())
    }

    fn emitted(&self) -> Option<&[Value]> {
        Some(self.history.as_slice())
    }
}

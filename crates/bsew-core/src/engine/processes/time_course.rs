use super::decay::parse_rates;
use crate::engine::error::ProcessError;
use crate::engine::process::{Ports, Process, ProcessContext};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const NAME: &str = "uniform-time-course";

/// Name of the report written into `config.output_dir`.
pub const REPORT_FILE_NAME: &str = "results.csv";

const RESULTS_PORT: &str = "results";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DecayModel {
    pub species: BTreeMap<String, f64>,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl DecayModel {
    pub fn load(path: &Path) -> Result<Self, ProcessError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProcessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ProcessError::InvalidConfig(format!("model '{}' is invalid: {e}", path.display()))
        })
    }

    fn amount_at(&self, species: &str, time: f64) -> f64 {
        let initial = self.species[species];
        let rate = self.rates.get(species).copied().unwrap_or(0.0);
        initial * (-rate * time).exp()
    }
}

/// Simulates a first-order decay model over `[0, time]` at `n_points` evenly spaced
/// points, in closed form.
///
/// The model comes from `config.model_source` (a JSON file) or an inline
/// `config.model`. When `config.output_dir` is set the time course is also written to
/// `results.csv` there. Relative paths are taken from the schema's directory, so a
/// bundle can ship its model next to the schema. The step runs once; later firings
/// produce no output.
#[derive(Debug)]
pub struct UniformTimeCourse {
    model: DecayModel,
    time: f64,
    n_points: usize,
    output_dir: Option<PathBuf>,
    completed: bool,
}

impl UniformTimeCourse {
    pub fn from_config(
        config: &Map<String, Value>,
        context: &ProcessContext,
    ) -> Result<Box<dyn Process>, ProcessError> {
        let model = match (config.get("model_source"), config.get("model")) {
            (Some(Value::String(source)), _) => {
                DecayModel::load(&context.resolve(Path::new(source)))?
            }
            (None, Some(inline @ Value::Object(_))) => serde_json::from_value(inline.clone())
                .map_err(|e| ProcessError::InvalidConfig(format!("inline model is invalid: {e}")))?,
            _ => {
                return Err(ProcessError::InvalidConfig(
                    "either `model_source` (a path) or `model` (an object) is required".to_string(),
                ));
            }
        };
        validate_model(&model)?;

        let time = config
            .get("time")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t > 0.0)
            .ok_or_else(|| ProcessError::InvalidConfig("`time` must be a positive number".to_string()))?;
        let n_points = config
            .get("n_points")
            .and_then(Value::as_u64)
            .filter(|n| *n >= 2)
            .ok_or_else(|| {
                ProcessError::InvalidConfig("`n_points` must be an integer of at least 2".to_string())
            })? as usize;
        let output_dir = match config.get("output_dir") {
            None | Some(Value::Null) => None,
            Some(Value::String(dir)) => Some(context.resolve(Path::new(dir))),
            Some(other) => {
                return Err(ProcessError::InvalidConfig(format!(
                    "`output_dir` must be a path, got {other}"
                )));
            }
        };

        Ok(Box::new(Self {
            model,
            time,
            n_points,
            output_dir,
            completed: false,
        }))
    }

    fn sample_times(&self) -> Vec<f64> {
        let last = (self.n_points - 1) as f64;
        (0..self.n_points)
            .map(|i| self.time * i as f64 / last)
            .collect()
    }

    fn write_report(
        &self,
        dir: &Path,
        times: &[f64],
        columns: &[(String, Vec<f64>)],
    ) -> Result<(), ProcessError> {
        std::fs::create_dir_all(dir).map_err(|source| ProcessError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(REPORT_FILE_NAME);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["time".to_string()];
        header.extend(columns.iter().map(|(name, _)| name.clone()));
        writer.write_record(&header)?;

        for (row, time) in times.iter().enumerate() {
            let mut record = vec![time.to_string()];
            record.extend(columns.iter().map(|(_, values)| values[row].to_string()));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|source| ProcessError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Time course report written to {:?}", path);
        Ok(())
    }
}

fn validate_model(model: &DecayModel) -> Result<(), ProcessError> {
    if model.species.is_empty() {
        return Err(ProcessError::InvalidConfig(
            "model declares no species".to_string(),
        ));
    }
    if let Some(unknown) = model.rates.keys().find(|k| !model.species.contains_key(*k)) {
        return Err(ProcessError::InvalidConfig(format!(
            "rate given for undeclared species '{unknown}'"
        )));
    }
    let rates = Value::Object(
        model
            .rates
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(*v)))
            .collect(),
    );
    parse_rates(Some(&rates)).map(|_| ())
}

impl Process for UniformTimeCourse {
    fn update(&mut self, _inputs: &Ports, _interval: f64, _time: f64) -> Result<Ports, ProcessError> {
        if self.completed {
            return Ok(Ports::new());
        }

        let times = self.sample_times();
        let columns: Vec<(String, Vec<f64>)> = self
            .model
            .species
            .keys()
            .map(|name| {
                let values = times.iter().map(|t| self.model.amount_at(name, *t)).collect();
                (name.clone(), values)
            })
            .collect();

        if let Some(dir) = &self.output_dir {
            self.write_report(dir, &times, &columns)?;
        }
        self.completed = true;

        let mut results = Map::new();
        results.insert("time".to_string(), Value::from(times));
        for (name, values) in columns {
            results.insert(name, Value::from(values));
        }
        let mut out = Ports::new();
        out.insert(RESULTS_PORT.to_string(), Value::Object(results));
        Ok(out)
    }
}

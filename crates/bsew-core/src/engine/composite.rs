use super::error::EngineError;
use super::process::{Ports, Process, ProcessContext, ProcessKind};
use super::progress::{Progress, ProgressReporter};
use super::registry::ProcessRegistry;
use super::state::{self, StatePath};
use crate::core::schema::Schema;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Key under which the composite keeps simulated time at the root of the state tree.
pub const GLOBAL_TIME_KEY: &str = "global_time";

const DEFAULT_INTERVAL: f64 = 1.0;
const TIME_EPSILON: f64 = 1e-9;
/// Progress of a run is reported in this many equal slices of its duration.
const PROGRESS_TICKS: u64 = 100;

/// Emitter records collected after a run, keyed by the emitter's path in the state tree.
pub type ObservationSet = BTreeMap<String, Vec<Value>>;

type Wires = Vec<(String, StatePath)>;

struct ProcessNode {
    path: StatePath,
    address: String,
    kind: ProcessKind,
    interval: f64,
    origin: f64,
    firings: u64,
    last_fired: Option<f64>,
    inputs: Wires,
    outputs: Wires,
    instance: Box<dyn Process>,
}

impl ProcessNode {
    fn next_update(&self) -> f64 {
        self.origin + (self.firings + 1) as f64 * self.interval
    }

    fn label(&self) -> String {
        state::path_label(&self.path)
    }
}

/// A process graph bound to its state tree.
///
/// Built from a [`Schema`] whose `state` object holds both plain values and process
/// nodes (objects whose `_type` is `"process"` or `"step"`). Processes fire on their
/// own interval and contribute deltas; steps fire after every round of processes and
/// overwrite the values they are wired to.
pub struct Composite {
    state: Value,
    nodes: Vec<ProcessNode>,
    global_time: f64,
    steps_initialized: bool,
}

impl Composite {
    /// Binds `schema` to process implementations from `registry`.
    ///
    /// # Errors
    ///
    /// Returns a schema-reference [`EngineError`] when the schema has no `state`
    /// object, a process node is malformed, its address cannot be resolved, its
    /// configuration is rejected, or its wiring is invalid.
    pub fn new(registry: &ProcessRegistry, schema: &Schema) -> Result<Self, EngineError> {
        let mut state = match schema.get("state") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(_) => {
                return Err(EngineError::InvalidSchema(
                    "`state` must be a JSON object".to_string(),
                ));
            }
            None => {
                return Err(EngineError::InvalidSchema(
                    "schema has no `state` object".to_string(),
                ));
            }
        };

        let global_time = state
            .get(GLOBAL_TIME_KEY)
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        state::set_path(&mut state, &[GLOBAL_TIME_KEY.to_string()], json!(global_time));

        let mut declarations = Vec::new();
        collect_declarations(&state, &mut Vec::new(), &mut declarations);

        let context = match schema.base_dir() {
            Some(dir) => ProcessContext::in_dir(dir),
            None => ProcessContext::default(),
        };
        let nodes = declarations
            .into_iter()
            .map(|(path, kind, declaration)| {
                build_node(registry, &context, path, kind, declaration, global_time)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Composite built with {} process(es) and {} step(s).",
            nodes.iter().filter(|n| n.kind == ProcessKind::Process).count(),
            nodes.iter().filter(|n| n.kind == ProcessKind::Step).count()
        );

        Ok(Self {
            state,
            nodes,
            global_time,
            steps_initialized: false,
        })
    }

    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Paths of every process and step, in scheduling order.
    pub fn process_paths(&self) -> Vec<String> {
        self.nodes.iter().map(ProcessNode::label).collect()
    }

    /// Advances the composite by `duration` units of simulated time.
    ///
    /// Steps fire once before the first run. Afterwards each round runs every process
    /// due at the earliest pending update time, applies their outputs, then fires all
    /// steps.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDuration`] for negative or non-finite durations and
    /// [`EngineError::StepFailed`] when a process or step fails; the composite is left
    /// at the time of the failure.
    pub fn run(&mut self, duration: f64, reporter: &ProgressReporter) -> Result<(), EngineError> {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(EngineError::InvalidDuration(duration));
        }
        let end = self.global_time + duration;
        info!("Running composite from t={} to t={}", self.global_time, end);

        reporter.report(Progress::PhaseStart {
            name: "Running composite",
        });

        if !self.steps_initialized {
            self.run_steps()?;
            self.steps_initialized = true;
        }

        let start = self.global_time;
        let tracked = duration > 0.0 && self.next_round_time(end).is_some();
        let mut ticks = 0;
        if tracked {
            reporter.report(Progress::TaskStart {
                total_steps: PROGRESS_TICKS,
            });
        }

        while let Some(time) = self.next_round_time(end) {
            self.set_time(time);
            self.run_processes(time)?;
            self.run_steps()?;
            reporter.status(format!("t = {time}"));
            if tracked {
                let reached = ticks_reached(time - start, duration);
                for _ in ticks..reached {
                    reporter.report(Progress::TaskIncrement);
                }
                ticks = ticks.max(reached);
            }
        }
        self.set_time(end);

        if tracked {
            for _ in ticks..PROGRESS_TICKS {
                reporter.report(Progress::TaskIncrement);
            }
            reporter.report(Progress::TaskFinish);
        }
        reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    /// Writes the full composite state as JSON to `outdir/filename`.
    ///
    /// # Return
    ///
    /// Returns the path of the written file.
    pub fn save(&self, filename: &str, outdir: &Path) -> Result<PathBuf, EngineError> {
        let path = outdir.join(filename);
        let document = json!({
            GLOBAL_TIME_KEY: self.global_time,
            "state": self.state,
        });

        let file = File::create(&path).map_err(|source| EngineError::Save {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush().map_err(|source| EngineError::Save {
            path: path.clone(),
            source,
        })?;

        debug!("Composite state saved to {:?}", path);
        Ok(path)
    }

    fn set_time(&mut self, time: f64) {
        self.global_time = time;
        state::set_path(&mut self.state, &[GLOBAL_TIME_KEY.to_string()], json!(time));
    }

    fn next_round_time(&self, end: f64) -> Option<f64> {
        self.nodes
            .iter()
            .filter(|n| n.kind == ProcessKind::Process)
            .map(ProcessNode::next_update)
            .filter(|t| *t <= end + TIME_EPSILON)
            .min_by(f64::total_cmp)
    }

    fn run_processes(&mut self, time: f64) -> Result<(), EngineError> {
        let mut updates = Vec::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.kind != ProcessKind::Process || node.next_update() > time + TIME_EPSILON {
                continue;
            }
            let inputs = gather_inputs(&self.state, &node.inputs);
            trace!("Updating process '{}' at t={}", node.label(), time);
            let outputs = node
                .instance
                .update(&inputs, node.interval, time)
                .map_err(|source| EngineError::StepFailed {
                    path: node.label(),
                    time,
                    source,
                })?;
            node.firings += 1;
            node.last_fired = Some(time);
            updates.push((index, outputs));
        }

        for (index, outputs) in updates {
            apply_outputs(&mut self.state, &self.nodes[index], outputs);
        }
        Ok(())
    }

    fn run_steps(&mut self) -> Result<(), EngineError> {
        let time = self.global_time;
        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            if node.kind != ProcessKind::Step {
                continue;
            }
            let inputs = gather_inputs(&self.state, &node.inputs);
            let elapsed = node.last_fired.map_or(0.0, |last| time - last);
            trace!("Firing step '{}' at t={}", node.label(), time);
            let outputs = node
                .instance
                .update(&inputs, elapsed, time)
                .map_err(|source| EngineError::StepFailed {
                    path: node.label(),
                    time,
                    source,
                })?;
            node.last_fired = Some(time);
            apply_outputs(&mut self.state, &self.nodes[index], outputs);
        }
        Ok(())
    }
}

fn ticks_reached(elapsed: f64, duration: f64) -> u64 {
    let fraction = (elapsed / duration).clamp(0.0, 1.0);
    ((fraction * PROGRESS_TICKS as f64) + TIME_EPSILON).floor() as u64
}

/// Collects the records of every emitter in `composite`.
pub fn gather_emitter_results(composite: &Composite) -> ObservationSet {
    composite
        .nodes
        .iter()
        .filter_map(|node| {
            node.instance
                .emitted()
                .map(|records| (node.label(), records.to_vec()))
        })
        .collect()
}

fn collect_declarations<'a>(
    node: &'a Value,
    path: &mut StatePath,
    found: &mut Vec<(StatePath, ProcessKind, &'a Map<String, Value>)>,
) {
    let Value::Object(map) = node else {
        return;
    };
    for (key, child) in map {
        let Value::Object(child_map) = child else {
            continue;
        };
        path.push(key.clone());
        let kind = child_map
            .get("_type")
            .and_then(Value::as_str)
            .and_then(ProcessKind::from_type_tag);
        match kind {
            Some(kind) => found.push((path.clone(), kind, child_map)),
            None => collect_declarations(child, path, found),
        }
        path.pop();
    }
}

fn build_node(
    registry: &ProcessRegistry,
    context: &ProcessContext,
    path: StatePath,
    kind: ProcessKind,
    declaration: &Map<String, Value>,
    origin: f64,
) -> Result<ProcessNode, EngineError> {
    let label = state::path_label(&path);
    let invalid = |what: &str| EngineError::InvalidSchema(format!("{} at '{label}' {what}", kind.as_str()));

    let address = declaration
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("has no string `address`"))?
        .to_string();

    let empty = Map::new();
    let config = match declaration.get("config") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(config)) => config,
        Some(_) => return Err(invalid("has a non-object `config`")),
    };

    let interval = match declaration.get("interval") {
        None | Some(Value::Null) => DEFAULT_INTERVAL,
        Some(value) => value
            .as_f64()
            .filter(|i| i.is_finite() && *i > 0.0)
            .ok_or_else(|| invalid("has an `interval` that is not a positive number"))?,
    };

    let parent = &path[..path.len() - 1];
    let inputs = parse_wires(declaration.get("inputs"), parent, &label)?;
    let outputs = parse_wires(declaration.get("outputs"), parent, &label)?;

    let instance = registry.instantiate(&address, config, context, &label)?;
    debug!(
        "Instantiated {} '{}' from '{}' (interval {})",
        kind.as_str(),
        label,
        address,
        interval
    );

    Ok(ProcessNode {
        path,
        address,
        kind,
        interval,
        origin,
        firings: 0,
        last_fired: None,
        inputs,
        outputs,
        instance,
    })
}

fn parse_wires(
    wiring: Option<&Value>,
    parent: &[String],
    label: &str,
) -> Result<Wires, EngineError> {
    let map = match wiring {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(EngineError::Wiring {
                path: label.to_string(),
                reason: "ports must be declared as an object".to_string(),
            });
        }
    };

    map.iter()
        .map(|(port, wire)| {
            state::resolve_wire(parent, wire)
                .map(|target| (port.clone(), target))
                .map_err(|reason| EngineError::Wiring {
                    path: label.to_string(),
                    reason: format!("port '{port}': {reason}"),
                })
        })
        .collect()
}

fn gather_inputs(state_tree: &Value, wires: &Wires) -> Ports {
    wires
        .iter()
        .filter_map(|(port, path)| {
            state::get_path(state_tree, path).map(|value| (port.clone(), value.clone()))
        })
        .collect()
}

fn apply_outputs(state_tree: &mut Value, node: &ProcessNode, outputs: Ports) {
    for (port, value) in outputs {
        let Some((_, target)) = node.outputs.iter().find(|(p, _)| *p == port) else {
            trace!(
                "Output port '{}' of '{}' ({}) is not wired; dropping value.",
                port,
                node.label(),
                node.address
            );
            continue;
        };
        match node.kind {
            ProcessKind::Process => state::apply_delta(state_tree, target, value),
            ProcessKind::Step => state::set_path(state_tree, target, value),
        }
    }
}

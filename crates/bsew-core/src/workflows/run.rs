use crate::core::clock::{Clock, RunStamp};
use crate::core::io::output::{self, OutputError};
use crate::core::schema::SchemaError;
use crate::core::schema::locator::locate_schema;
use crate::engine::composite::{Composite, ObservationSet, gather_emitter_results};
use crate::engine::config::ExperimentConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::ProcessRegistry;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

const SCRATCH_PREFIX: &str = "bsew-";

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// What a successful run left in the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub results_file: Option<PathBuf>,
    pub state_file: PathBuf,
    pub copied_files: usize,
    pub final_time: f64,
}

/// Runs the experiment described by `config` end to end.
///
/// The schema is located inside a fresh scratch directory, executed on a composite
/// built from `registry` for `config.interval` units of simulated time, and its
/// results and final state are written next to the staged inputs. The scratch
/// directory is then merged into `config.output_dir` and removed.
///
/// # Errors
///
/// Any failure aborts the run. The output directory is only written after the
/// composite has finished and both result files exist.
#[instrument(skip_all, name = "experiment_workflow")]
pub fn run(
    config: &ExperimentConfig,
    registry: &ProcessRegistry,
    clock: &dyn Clock,
    reporter: &ProgressReporter,
) -> Result<RunOutcome, ExperimentError> {
    // === Phase 1: Stage inputs and locate the schema ===
    reporter.report(Progress::PhaseStart {
        name: "Loading experiment",
    });
    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()
        .map_err(ExperimentError::Scratch)?;
    info!(
        "Staging {:?} in scratch directory {:?}",
        config.input_file,
        scratch.path()
    );
    let schema = locate_schema(&config.input_file, scratch.path(), &config.formats)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Execute ===
    let mut composite = Composite::new(registry, &schema)?;
    composite.run(config.interval, reporter)?;
    let observations = gather_emitter_results(&composite);
    info!(
        "Run finished at t={} with {} emitter(s).",
        composite.global_time(),
        observations.len()
    );

    // === Phase 3: Materialize ===
    reporter.report(Progress::PhaseStart {
        name: "Writing results",
    });
    let outcome = materialize_results(
        &composite,
        &observations,
        scratch.path(),
        &config.output_dir,
        clock,
    )?;
    reporter.report(Progress::PhaseFinish);

    Ok(outcome)
}

/// Writes the results file (only when `observations` is non-empty) and the state
/// snapshot into `scratch_dir`, then merges `scratch_dir` into `output_dir`.
pub fn materialize_results(
    composite: &Composite,
    observations: &ObservationSet,
    scratch_dir: &Path,
    output_dir: &Path,
    clock: &dyn Clock,
) -> Result<RunOutcome, ExperimentError> {
    let stamp = RunStamp::capture(clock);

    let results_name = if observations.is_empty() {
        info!("No emitter results were produced; skipping results file.");
        None
    } else {
        let name = stamp.results_file_name();
        output::write_json(observations, &scratch_dir.join(&name))?;
        Some(name)
    };

    let state_name = stamp.state_file_name();
    composite.save(&state_name, scratch_dir)?;

    let copied_files = output::merge_directory(scratch_dir, output_dir)?;
    info!("Copied {} file(s) into {:?}", copied_files, output_dir);

    Ok(RunOutcome {
        results_file: results_name.map(|name| output_dir.join(name)),
        state_file: output_dir.join(state_name),
        copied_files,
        final_time: composite.global_time(),
    })
}

use crate::config::ProgramConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use bsew::core::clock::SystemClock;
use bsew::engine::progress::ProgressReporter;
use bsew::engine::registry::ProcessRegistry;
use bsew::workflows;
use tracing::info;

pub fn run(config: &ProgramConfig, registry: &ProcessRegistry, quiet: bool) -> Result<()> {
    let experiment = &config.experiment;

    let progress_handler = CliProgressHandler::new();
    let reporter = if quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::with_callback(progress_handler.get_callback())
    };

    if !quiet {
        println!(
            "Running {} for {} time unit(s)...",
            experiment.input_file.display(),
            experiment.interval
        );
    }
    info!("Invoking the experiment workflow...");

    let outcome = workflows::run::run(experiment, registry, &SystemClock, &reporter)?;

    info!(
        "Workflow finished at t={}; {} file(s) written to {:?}",
        outcome.final_time, outcome.copied_files, experiment.output_dir
    );

    if !quiet {
        match &outcome.results_file {
            Some(path) => println!("✓ Results written to: {}", path.display()),
            None => println!("No emitters in the experiment; no results file was written."),
        }
        println!("✓ Final state written to: {}", outcome.state_file.display());
        if config.verbose {
            println!(
                "  {} file(s) copied into {}",
                outcome.copied_files,
                experiment.output_dir.display()
            );
        }
    }

    Ok(())
}

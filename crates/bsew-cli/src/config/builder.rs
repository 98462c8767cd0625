use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileInputConfig};
use super::models::ProgramConfig;
use crate::cli::Cli;
use crate::error::{CliError, INPUT_USAGE_MESSAGE, Result};
use crate::utils::paths::resolve_path;
use bsew::core::schema::InputFormats;
use bsew::engine::config::{ConfigError, ExperimentConfigBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves the CLI arguments against the config file and built-in defaults.
///
/// Precedence, highest first: explicit flags, `--set` values, the config file, then
/// defaults.
pub fn build_config(cli: &Cli) -> Result<ProgramConfig> {
    let file_config = FileConfig::load(cli.config.as_deref())?;
    resolve(cli, file_config)
}

/// Resolves `input_file_path` to an absolute path and checks that it names a file.
///
/// Nothing else about the invocation is looked at, so a missing input is reported as
/// a usage error before any other flag can fail.
pub fn validate_input(input_file_path: &Path) -> Result<PathBuf> {
    let input_file = resolve_path(input_file_path)?;
    if !input_file.is_file() {
        return Err(CliError::Usage(INPUT_USAGE_MESSAGE.to_string()));
    }
    Ok(input_file)
}

fn resolve(cli: &Cli, file_config: FileConfig) -> Result<ProgramConfig> {
    let input_file = validate_input(&cli.input_file_path)?;

    let defaults = DefaultsConfig::default();
    let mut file_config = apply_set_values(file_config, &cli.set_values)?;

    let output_file = file_config.output.take().unwrap_or_default();
    let output_dir = match cli.output_directory.as_ref().or(output_file.directory.as_ref()) {
        Some(dir) => resolve_path(dir)?,
        None => input_file.parent().map(PathBuf::from).ok_or_else(|| {
            CliError::Argument(format!(
                "'{}' has no parent directory to write outputs to.",
                input_file.display()
            ))
        })?,
    };

    let run_file = file_config.run.take().unwrap_or_default();
    let interval = cli
        .interval
        .or(run_file.interval)
        .unwrap_or(defaults.interval);

    let formats = merge_formats(file_config.input.take().unwrap_or_default(), defaults.formats);

    debug!(
        "Resolved input {:?}, output {:?}, interval {}",
        input_file, output_dir, interval
    );

    let experiment = ExperimentConfigBuilder::new()
        .input_file(input_file)
        .output_dir(output_dir)
        .interval(interval)
        .formats(formats)
        .build()
        .map_err(|e| match e {
            ConfigError::InvalidInterval(value) => CliError::Usage(format!(
                "error: `interval` must be a positive number, got {}",
                value
            )),
            other => CliError::Config(other.to_string()),
        })?;

    Ok(ProgramConfig {
        verbose: cli.verbose > 0,
        experiment,
    })
}

fn merge_formats(file_val: FileInputConfig, defaults: InputFormats) -> InputFormats {
    InputFormats {
        archive_extensions: file_val
            .archive_extensions
            .unwrap_or(defaults.archive_extensions),
        schema_extensions: file_val
            .schema_extensions
            .unwrap_or(defaults.schema_extensions),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "run.interval" => {
                config.run.get_or_insert_with(Default::default).interval =
                    Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
            }
            "output.directory" => {
                config
                    .output
                    .get_or_insert_with(Default::default)
                    .directory = Some(PathBuf::from(value_str));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn input_fixture() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let input = dir.path().join("exp.pbif");
        fs::write(&input, r#"{"state": {}}"#).unwrap();
        (dir, input)
    }

    fn base_cli(input: &Path) -> Cli {
        Cli {
            input_file_path: input.to_path_buf(),
            output_directory: None,
            interval: None,
            verbose: 0,
            quiet: false,
            log_file: None,
            config: None,
            set_values: vec![],
        }
    }

    fn file_config(toml: &str) -> FileConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn defaults_fill_everything_else() {
        let (dir, input) = input_fixture();
        let config = resolve(&base_cli(&input), FileConfig::default()).unwrap();

        assert_eq!(config.experiment.input_file, input);
        assert_eq!(config.experiment.output_dir, dir.path());
        assert_eq!(config.experiment.interval, DefaultsConfig::default().interval);
        assert_eq!(config.experiment.formats, InputFormats::default());
        assert!(!config.verbose);
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        let dir = tempdir().unwrap();
        let cli = base_cli(&dir.path().join("absent.omex"));

        let err = resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(ref msg) if msg == INPUT_USAGE_MESSAGE));
    }

    #[test]
    fn missing_input_wins_over_malformed_set_values() {
        let dir = tempdir().unwrap();
        let mut cli = base_cli(&dir.path().join("absent.omex"));
        cli.set_values = vec!["run.interval=fast".to_string()];

        let err = resolve(&cli, FileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn validated_inputs_are_absolute_and_normalized() {
        let (dir, input) = input_fixture();
        let roundabout = dir.path().join("nested").join("..").join("exp.pbif");

        assert_eq!(validate_input(&roundabout).unwrap(), input);
        assert!(validate_input(&dir.path().join("nested")).is_err());
    }

    #[test]
    fn directories_are_not_inputs() {
        let dir = tempdir().unwrap();
        let err = resolve(&base_cli(dir.path()), FileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn non_positive_intervals_are_usage_errors() {
        let (_dir, input) = input_fixture();
        for bad in [0.0, -2.0, f64::NAN] {
            let mut cli = base_cli(&input);
            cli.interval = Some(bad);
            let err = resolve(&cli, FileConfig::default()).unwrap_err();
            assert_eq!(err.exit_code(), 11, "interval {bad} was accepted");
        }
    }

    #[test]
    fn file_values_override_defaults() {
        let (_dir, input) = input_fixture();
        let out = tempdir().unwrap();
        let file = file_config(&format!(
            "[run]\ninterval = 4.0\n[output]\ndirectory = {:?}\n[input]\nschema-extensions = [\"pbif\"]\n",
            out.path().to_str().unwrap()
        ));

        let config = resolve(&base_cli(&input), file).unwrap();
        assert_eq!(config.experiment.interval, 4.0);
        assert_eq!(config.experiment.output_dir, out.path());
        assert_eq!(config.experiment.formats.schema_extensions, vec!["pbif"]);
        assert_eq!(
            config.experiment.formats.archive_extensions,
            InputFormats::default().archive_extensions
        );
    }

    #[test]
    fn set_values_override_file_and_flags_override_both() {
        let (_dir, input) = input_fixture();
        let file = file_config("[run]\ninterval = 4.0\n");

        let mut cli = base_cli(&input);
        cli.set_values = vec!["run.interval=6".to_string()];
        let config = resolve(&cli, file.clone()).unwrap();
        assert_eq!(config.experiment.interval, 6.0);

        cli.interval = Some(8.0);
        cli.verbose = 1;
        let config = resolve(&cli, file).unwrap();
        assert_eq!(config.experiment.interval, 8.0);
        assert!(config.verbose);
    }

    #[test]
    fn output_directory_flag_is_made_absolute() {
        let (_dir, input) = input_fixture();
        let mut cli = base_cli(&input);
        cli.output_directory = Some(PathBuf::from("relative/out"));
        cli.set_values = vec!["output.directory=/ignored".to_string()];

        let config = resolve(&cli, FileConfig::default()).unwrap();
        assert!(config.experiment.output_dir.is_absolute());
        assert!(config.experiment.output_dir.ends_with("relative/out"));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let (_dir, input) = input_fixture();
        for bad in ["run.interval", "run.interval=fast", "run.speed=2"] {
            let mut cli = base_cli(&input);
            cli.set_values = vec![bad.to_string()];
            assert!(
                matches!(resolve(&cli, FileConfig::default()), Err(CliError::Config(_))),
                "accepted {bad}"
            );
        }
    }
}

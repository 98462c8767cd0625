use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "bsew",
    author = "BioSimulators Team",
    version,
    about = "BSew - Runs a composite process experiment (a PBIF/JSON schema, or an OMEX/ZIP archive containing one) and writes its results and final state.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Path to the experiment schema (.pbif/.json) or to an archive (.omex/.zip) containing one.
    #[arg(value_name = "INPUT_FILE_PATH")]
    pub input_file_path: PathBuf,

    /// Directory that receives the results, the final state, and the staged inputs.
    /// Defaults to the directory of the input file.
    #[arg(short = 'o', long = "output-directory", value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Simulated time to run the composite for (default: 1.0).
    #[arg(short = 'n', long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub interval: Option<f64>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output and progress display
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the platform configuration directory, when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S run.interval=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "bsew",
            "exp.omex",
            "-o",
            "out",
            "-n",
            "2.5",
            "-vv",
            "--log-file",
            "run.log",
            "-c",
            "bsew.toml",
            "-S",
            "run.interval=3",
            "--set",
            "output.directory=/tmp/x",
        ])
        .unwrap();

        assert_eq!(cli.input_file_path, PathBuf::from("exp.omex"));
        assert_eq!(cli.output_directory, Some(PathBuf::from("out")));
        assert_eq!(cli.interval, Some(2.5));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(cli.config, Some(PathBuf::from("bsew.toml")));
        assert_eq!(cli.set_values, vec!["run.interval=3", "output.directory=/tmp/x"]);
    }

    #[test]
    fn negative_intervals_reach_validation() {
        let cli = Cli::try_parse_from(["bsew", "exp.pbif", "-n", "-1"]).unwrap();
        assert_eq!(cli.interval, Some(-1.0));
    }

    #[test]
    fn input_path_is_required() {
        assert!(Cli::try_parse_from(["bsew"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["bsew", "exp.pbif", "-q", "-v"]).is_err());
    }
}

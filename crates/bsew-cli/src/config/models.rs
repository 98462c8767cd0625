use bsew::engine::config::ExperimentConfig;

/// The fully resolved settings of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    pub verbose: bool,
    pub experiment: ExperimentConfig,
}

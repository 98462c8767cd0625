//! Layered program configuration: built-in defaults, an optional TOML file,
//! `--set KEY=VALUE` overrides, and explicit command-line flags.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_config, validate_input};
pub use models::ProgramConfig;

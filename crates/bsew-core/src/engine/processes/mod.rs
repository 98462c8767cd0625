//! Built-in process implementations.
//!
//! - [`emitter`] - `ram-emitter`, which records wired values every time it fires
//! - [`decay`] - `decay`, first-order decay of species amounts
//! - [`time_course`] - `uniform-time-course`, a closed-form decay time course written to CSV

pub mod decay;
pub mod emitter;
pub mod time_course;

use super::registry::ProcessRegistry;

pub(crate) fn register_builtins(registry: &mut ProcessRegistry) {
    registry.register(emitter::NAME, |config, _| emitter::RamEmitter::from_config(config));
    registry.register(decay::NAME, |config, _| decay::Decay::from_config(config));
    registry.register(time_course::NAME, time_course::UniformTimeCourse::from_config);
}

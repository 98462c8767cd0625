//! # Workflows Module
//!
//! High-level entry points that run a complete experiment.
//!
//! ## Overview
//!
//! A workflow owns everything that lives only for one run: the scratch directory, the
//! located schema, and the composite built from it. It reports progress phase by
//! phase and leaves the output directory untouched unless the run succeeds.
//!
//! - **Experiment Run** ([`run`]) - Schema location, composite execution, and result
//!   materialization into the output directory.

pub mod run;

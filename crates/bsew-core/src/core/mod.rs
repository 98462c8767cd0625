//! # Core Module
//!
//! Input resolution and output materialization primitives used by the workflows.
//!
//! ## Architecture
//!
//! - **Schemas** ([`schema`]) - The experiment schema model and the locator that finds it
//!   inside a bare file or an extracted archive
//! - **File I/O** ([`io`]) - Archive extraction, result writing, and scratch-to-output merging
//! - **Time** ([`clock`]) - Wall-clock abstraction and the timestamped file names derived from it

pub mod clock;
pub mod io;
pub mod schema;

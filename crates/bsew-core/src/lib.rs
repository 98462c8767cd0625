//! # BSew Core Library
//!
//! Loads composite process experiments, runs them through a composite engine, and
//! materializes their observations and final state on disk.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless input resolution and output handling: the
//!   [`Schema`](core::schema::Schema) model and its locator, archive extraction,
//!   result/state file naming, and the injectable [`Clock`](core::clock::Clock).
//!
//! - **[`engine`]: The Composite Engine.** The registry of named process
//!   implementations, the [`Process`](engine::process::Process) trait they implement,
//!   and the [`Composite`](engine::composite::Composite) that wires them to a state
//!   tree and drives them through simulated time.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into a complete
//!   experiment run: scratch directory, schema location, execution, and materialization.

pub mod core;
pub mod engine;
pub mod workflows;

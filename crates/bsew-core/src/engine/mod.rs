//! # Engine Module
//!
//! This module implements the composite engine that executes an experiment schema:
//! it binds process nodes declared in the schema's state tree to named
//! implementations, wires their ports to locations in that tree, and advances the
//! whole graph through simulated time.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - The validated parameters of a single experiment run
//! - **Processes** ([`process`], [`processes`]) - The `Process` trait and the built-in implementations
//! - **Registry** ([`registry`]) - Named process factories, built once and passed explicitly
//! - **Composite** ([`composite`]) - Process graph construction, scheduling, emitters, and state snapshots
//! - **State Tree** ([`state`]) - Wire resolution and update rules for the JSON state
//! - **Progress Monitoring** ([`progress`]) - Progress reporting to front ends
//! - **Error Handling** ([`error`]) - Schema-reference versus runtime failures
//!
//! ## Scheduling Model
//!
//! Nodes typed `"process"` fire on their own interval and contribute deltas; nodes
//! typed `"step"` fire once when the composite first runs and again after every round
//! of processes, replacing the values they are wired to.

pub mod composite;
pub mod config;
pub mod error;
pub mod process;
pub mod processes;
pub mod progress;
pub mod registry;
pub mod state;

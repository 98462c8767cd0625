//! Provides file input/output for experiment bundles and run artifacts.
//!
//! This module contains the ZIP/OMEX extraction used to unpack experiment bundles
//! into a scratch directory, and the writers that place observation records into
//! timestamped result files and merge a finished scratch directory into the
//! permanent output location.

pub mod archive;
pub mod output;

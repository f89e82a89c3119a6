//! Command-line entry point for the Curve adapter harness.
//!
//! # Components
//!
//! - `cli`: argument parsing
//! - `service`: loads static data, spawns the fork, deploys and runs the scenarios

pub mod cli;
pub mod service;

//! CLI Adapter
//!
//! Command-line interface for the pairs-arb binary.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, RunCmd, ReplayCmd};

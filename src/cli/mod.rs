//! Command-line interface for answer-forge.
//!
//! Provides `logs` commands for access-log questions and `sales` commands
//! for city-clustered sales totals.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};

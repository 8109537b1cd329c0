//! Command-line interface for charter
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point and command dispatch
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;

pub use args::{CacheCommands, Cli, Commands};
pub use run::run;

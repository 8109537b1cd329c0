//! Configuration management for charter
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The file is `.charter/config.toml` with `[files]`,
//! `[compile]`, `[validate]` and `[classifier]` sections.
//!
//! Every path in a [`Config`] is resolved against an explicit project root.
//! Nothing here reads ambient process state after discovery, so tests and
//! concurrent invocations never share defaults.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;

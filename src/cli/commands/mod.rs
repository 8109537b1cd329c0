//! CLI command implementations.
//!
//! Each handler returns the exit code for a completed run; errors that stop
//! a command early are returned as `anyhow::Error` wrapping a `CharterError`.

mod cache;
mod common;
mod compile;
mod doctor;
mod validate;

pub use cache::execute_cache_command;
pub use compile::execute_compile_command;
pub use doctor::execute_doctor_command;
pub use validate::{ValidateRequest, execute_validate_command};

//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, builds the tokio
//! runtime and dispatches. It owns all error output.

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;
use crate::{CharterError, CliArgs, Config, ExitCode};

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` for any non-zero exit after printing whatever the
/// user needs to see; main.rs only maps the code to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    // A subscriber may already be installed when embedded; keep it.
    let _ = charter_utils::logging::init_tracing(cli.verbose);

    let fail_fast = match &cli.command {
        Commands::Validate { fail_fast: true, .. } => Some(true),
        _ => None,
    };
    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        root: cli.root.clone(),
        verbose: Some(cli.verbose),
        output_dir: cli.output_dir.clone(),
        cache_dir: cli.cache_dir.clone(),
        fail_fast,
        legacy_immutable_all: cli.legacy_immutable_all.then_some(true),
        classifier_command: cli.classifier_command.clone(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err)),
    };
    tracing::debug!(root = %config.root(), config_path = ?config.config_path, "Configuration loaded");

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Compile { file } => commands::execute_compile_command(&config, file.as_deref()),
            Commands::Validate {
                file,
                all: _,
                domain,
                ci,
                fail_fast: _,
                force,
                status,
                json,
            } => {
                let request = commands::ValidateRequest {
                    file,
                    domain,
                    strict: ci,
                    force,
                    status,
                    json,
                };
                commands::execute_validate_command(&config, request).await
            }
            Commands::Cache(cmd) => commands::execute_cache_command(&config, cmd),
            Commands::Doctor { file } => commands::execute_doctor_command(&config, file.as_deref()),
        }
    });

    match result {
        Ok(code) if code.is_success() => Ok(()),
        Ok(code) => Err(code),
        Err(err) => Err(report_error(&err)),
    }
}

/// Print an error for the terminal and pick its exit code
fn report_error(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CharterError>() {
        Some(charter_err) => {
            eprintln!("{}", charter_err.display_for_user());
            charter_err.to_exit_code()
        }
        None => {
            eprintln!("error: {err:#}");
            ExitCode::INTERNAL
        }
    }
}

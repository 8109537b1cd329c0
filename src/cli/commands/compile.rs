//! `charter compile`

use anyhow::Result;
use std::path::Path;

use super::common::resolve_user_path;
use crate::{CharterError, CompileOutcome, CompileReport, Compiler, Config, ExitCode};

pub fn execute_compile_command(config: &Config, file: Option<&Path>) -> Result<ExitCode> {
    let compiler = Compiler::new(config);

    let Some(file) = file else {
        let report = compiler.compile_all().map_err(CharterError::from)?;
        print_report(&report);
        return Ok(ExitCode::SUCCESS);
    };

    let path = resolve_user_path(config, file)?;
    match compiler.compile_file(&path).map_err(CharterError::from)? {
        CompileOutcome::Compiled {
            document,
            output,
            plugin_outputs,
            plugin_failures,
        } => {
            println!("✓ {} → {output}", document.source);
            for out in plugin_outputs {
                println!("  {} → {}", out.plugin, out.path);
            }
            for failure in plugin_failures {
                println!("  ⚠ {}: {}", failure.plugin, failure.error);
            }
        }
        CompileOutcome::Skipped { path, reason } => {
            println!("⊘ {path}: skipped ({reason})");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &CompileReport) {
    for entry in &report.compiled {
        println!("✓ {} → {}", entry.source, entry.output);
    }
    for entry in &report.skipped {
        println!("⊘ {}: skipped ({})", entry.path, entry.reason);
    }
    for failure in &report.plugin_failures {
        println!("⚠ {} [{}]: {}", failure.source, failure.plugin, failure.error);
    }
    println!();
    println!(
        "Compiled {} document(s), skipped {}",
        report.compiled.len(),
        report.skipped.len()
    );
}

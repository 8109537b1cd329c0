//! `charter doctor`
//!
//! Reports manifest reference problems the compiler silently tolerates, and
//! whether the classifier command can be found.

use anyhow::Result;
use std::path::Path;

use super::common::resolve_user_path;
use crate::{CharterError, CommandClassifier, Compiler, Config, ExitCode};

pub fn execute_doctor_command(config: &Config, file: Option<&Path>) -> Result<ExitCode> {
    let compiler = Compiler::new(config);
    let findings = match file {
        Some(file) => {
            let path = resolve_user_path(config, file)?;
            compiler.check_references(&path)
        }
        None => compiler.check_all(),
    }
    .map_err(CharterError::from)?;

    for finding in &findings {
        println!("✗ {finding}");
    }
    if findings.is_empty() {
        println!("✓ All manifest references resolve");
    } else {
        println!();
        println!("{} reference problem(s) found", findings.len());
    }

    match CommandClassifier::from_command_line(&config.classifier.command)
        .and_then(|c| c.resolve_binary())
    {
        Ok(binary) => println!("✓ Classifier: {}", binary.display()),
        Err(e) => println!("⚠ Classifier: {e}"),
    }

    Ok(if findings.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::VALIDATION_FAILED
    })
}

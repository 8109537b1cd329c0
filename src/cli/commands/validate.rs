//! `charter validate`

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use charter_validation::{DocumentReport, DocumentStatus, VerdictSource};

use super::common::{emit_json, resolve_user_path};
use crate::{
    BatchReport, CharterError, CommandClassifier, Config, ExitCode, Orchestrator, StatusReport,
    ValidateOptions,
};

/// What the user asked `validate` to do
#[derive(Debug, Clone, Default)]
pub struct ValidateRequest {
    pub file: Option<PathBuf>,
    pub domain: Option<String>,
    /// CI mode: warnings fail the run
    pub strict: bool,
    pub force: bool,
    pub status: bool,
    pub json: bool,
}

pub async fn execute_validate_command(config: &Config, request: ValidateRequest) -> Result<ExitCode> {
    let classifier =
        CommandClassifier::from_command_line(&config.classifier.command).map_err(CharterError::from)?;
    let mut orchestrator = Orchestrator::new(config.clone(), Arc::new(classifier));

    if request.status {
        let status = orchestrator.status().map_err(CharterError::from)?;
        if request.json {
            println!("{}", emit_json(&status)?);
        } else {
            print_status(&status);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let options = ValidateOptions {
        fail_fast: config.validate.fail_fast,
        force: request.force,
    };

    if let Some(file) = &request.file {
        let path = resolve_user_path(config, file)?;
        let report = orchestrator
            .validate_document(path.as_str(), options)
            .await
            .map_err(CharterError::from)?;
        if request.json {
            println!("{}", emit_json(&report)?);
        } else {
            print_document(&report);
        }
        return Ok(single_exit_code(&report, request.strict));
    }

    let batch = match &request.domain {
        Some(domain) => orchestrator.validate_domain(domain, options).await,
        None => orchestrator.validate_all(options).await,
    }
    .map_err(CharterError::from)?;

    if request.json {
        println!("{}", emit_json(&batch)?);
    } else {
        print_batch(&batch);
    }
    Ok(batch.exit_code(request.strict))
}

fn single_exit_code(report: &DocumentReport, strict: bool) -> ExitCode {
    if report.source == VerdictSource::ClassifierFailure {
        ExitCode::CLASSIFIER_FAILURE
    } else if report.result.is_error() || (strict && !report.result.compliant) {
        ExitCode::VALIDATION_FAILED
    } else {
        ExitCode::SUCCESS
    }
}

fn marker(report: &DocumentReport) -> &'static str {
    if report.result.compliant {
        "✓"
    } else if report.result.is_warning() {
        "⚠"
    } else {
        "✗"
    }
}

fn print_document(report: &DocumentReport) {
    let cached = if report.source == VerdictSource::Cache {
        " (cached)"
    } else {
        ""
    };
    println!("{} {}{cached}", marker(report), report.document);
    for issue in &report.result.issues {
        println!("    - {issue}");
    }
    if !report.result.compliant && !report.result.reason.is_empty() {
        println!("    {}", report.result.reason);
    }
}

fn print_batch(batch: &BatchReport) {
    let mut current_domain = None;
    for report in &batch.results {
        if current_domain != Some(report.domain.as_str()) {
            println!("{}:", report.domain);
            current_domain = Some(report.domain.as_str());
        }
        print!("  ");
        print_document(report);
    }

    let s = &batch.summary;
    println!();
    println!(
        "{} document(s): {} compliant, {} warning(s), {} error(s)",
        s.total, s.compliant, s.warnings, s.errors
    );
    if batch.stopped_early {
        println!("Stopped at first error (fail-fast)");
    }
    let stats = &batch.cache_stats;
    if stats.hits + stats.misses > 0 {
        println!(
            "Cache: {} hit(s), {} miss(es), {:.0}% hit rate",
            stats.hits,
            stats.misses,
            stats.hit_ratio() * 100.0
        );
    }
}

fn print_status(status: &StatusReport) {
    for entry in &status.entries {
        let label = match entry.status {
            DocumentStatus::Passed => "passed",
            DocumentStatus::Warned => "warned",
            DocumentStatus::Failed => "failed",
            DocumentStatus::Stale => "stale",
            DocumentStatus::NotValidated => "not validated",
        };
        println!("{label:>13}  {}", entry.document);
    }
    let t = &status.tally;
    println!();
    println!(
        "{} passed, {} warned, {} failed, {} stale, {} not validated",
        t.passed, t.warned, t.failed, t.stale, t.not_validated
    );
}

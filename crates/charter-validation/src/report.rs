use serde::Serialize;
use std::collections::BTreeMap;

use charter_cache::CacheStats;
use charter_utils::exit_codes::ExitCode;
use charter_utils::types::ValidationResult;

/// Knobs for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop at the first error-severity result
    pub fail_fast: bool,
    /// Skip cache reads; fresh verdicts are still written
    pub force: bool,
}

/// Where a document's verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Cache,
    Classifier,
    /// The classifier could not produce a verdict; the result is synthetic
    ClassifierFailure,
    /// The document or its specification could not be read; the result is synthetic
    ReadFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub domain: String,
    pub result: ValidationResult,
    pub source: VerdictSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
}

/// Batch tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub compliant: usize,
    pub warnings: usize,
    pub errors: usize,
    pub by_domain: BTreeMap<String, DomainSummary>,
}

impl Summary {
    pub(crate) fn record(&mut self, report: &DocumentReport) {
        self.total += 1;
        let domain = self.by_domain.entry(report.domain.clone()).or_default();
        domain.total += 1;
        if report.result.compliant {
            self.compliant += 1;
            domain.compliant += 1;
        } else {
            domain.non_compliant += 1;
            if report.result.is_warning() {
                self.warnings += 1;
            } else {
                self.errors += 1;
            }
        }
    }

    pub(crate) fn ensure_domain(&mut self, domain: &str) {
        self.by_domain.entry(domain.to_string()).or_default();
    }
}

/// Outcome of a batch validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub results: Vec<DocumentReport>,
    pub summary: Summary,
    /// Fail-fast stopped the run before every document was visited
    pub stopped_early: bool,
    /// Cache counters for this run only
    pub cache_stats: CacheStats,
}

impl BatchReport {
    pub(crate) fn push(&mut self, report: DocumentReport) {
        self.summary.record(&report);
        self.results.push(report);
    }

    /// Exit status for this run.
    ///
    /// Error-severity verdicts and unreadable documents fail with
    /// `VALIDATION_FAILED`. If the
    /// only errors are classifier failures the run exits with
    /// `CLASSIFIER_FAILURE`. Strict mode also fails on warnings.
    #[must_use]
    pub fn exit_code(&self, strict: bool) -> ExitCode {
        let genuine_error = self
            .results
            .iter()
            .any(|r| r.result.is_error() && r.source != VerdictSource::ClassifierFailure);
        if genuine_error {
            return ExitCode::VALIDATION_FAILED;
        }
        if self
            .results
            .iter()
            .any(|r| r.source == VerdictSource::ClassifierFailure)
        {
            return ExitCode::CLASSIFIER_FAILURE;
        }
        if strict && self.summary.compliant < self.summary.total {
            return ExitCode::VALIDATION_FAILED;
        }
        ExitCode::SUCCESS
    }
}

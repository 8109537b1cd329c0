use camino::Utf8Path;
use std::fs;
use std::sync::Arc;
use tracing::Instrument;

use charter_cache::{EntryMeta, ValidationCache, fingerprint, log_cache_stats};
use charter_classifier::{Classifier, parse_verdict};
use charter_config::Config;
use charter_utils::error::ValidationError;
use charter_utils::logging::domain_span;
use charter_utils::paths::{is_contained_relative, normalize_relative, relative_slash};
use charter_utils::types::ValidationResult;

use crate::domain::{ValidationDomain, discover_domains, governing_domain};
use crate::report::{BatchReport, DocumentReport, ValidateOptions, VerdictSource};
use crate::status::{DocumentStatus, StatusEntry, StatusReport};

/// Drives documents through the cache and the classifier
pub struct Orchestrator {
    config: Config,
    cache: ValidationCache,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("root", &self.config.root())
            .field("cache_dir", &self.cache.cache_dir())
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: Config, classifier: Arc<dyn Classifier>) -> Self {
        let cache = ValidationCache::new(config.root().to_path_buf(), &config.validate.cache_dir);
        Self {
            config,
            cache,
            classifier,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ValidationCache {
        &mut self.cache
    }

    pub fn discover_domains(&self) -> Result<Vec<ValidationDomain>, ValidationError> {
        discover_domains(&self.config)
    }

    /// Root-relative `/` form of a document path given absolute or relative
    fn normalize(&self, document: &str) -> Result<String, ValidationError> {
        let path = Utf8Path::new(document);
        let rel = if path.is_absolute() {
            relative_slash(self.config.root(), path)
        } else {
            Some(normalize_relative(document))
        };
        match rel {
            Some(rel) if !rel.is_empty() && rel != "." && is_contained_relative(&rel) => Ok(rel),
            _ => Err(ValidationError::NoDomain {
                path: document.to_string(),
            }),
        }
    }

    /// Validate one document against its nearest governing specification
    pub async fn validate_document(
        &mut self,
        document: &str,
        options: ValidateOptions,
    ) -> Result<DocumentReport, ValidationError> {
        let document = self.normalize(document)?;
        if !self.config.root().join(&document).is_file() {
            return Err(ValidationError::DocumentNotFound { path: document });
        }
        let domain = governing_domain(&self.config, &document).ok_or_else(|| {
            ValidationError::NoDomain {
                path: document.clone(),
            }
        })?;
        Ok(self.check(&domain, &document, options.force).await)
    }

    /// Validate every document of one named domain
    pub async fn validate_domain(
        &mut self,
        name: &str,
        options: ValidateOptions,
    ) -> Result<BatchReport, ValidationError> {
        let domains = self.discover_domains()?;
        let Some(domain) = domains.iter().find(|d| d.name == name).cloned() else {
            return Err(ValidationError::UnknownDomain {
                name: name.to_string(),
                available: domains.into_iter().map(|d| d.name).collect(),
            });
        };
        self.run(&[domain], options).await
    }

    /// Validate every document of every discovered domain
    pub async fn validate_all(
        &mut self,
        options: ValidateOptions,
    ) -> Result<BatchReport, ValidationError> {
        let domains = self.discover_domains()?;
        self.run(&domains, options).await
    }

    async fn run(
        &mut self,
        domains: &[ValidationDomain],
        options: ValidateOptions,
    ) -> Result<BatchReport, ValidationError> {
        let before = *self.cache.session_stats();
        let mut batch = BatchReport::default();

        for domain in domains {
            let stopped = self
                .run_domain(domain, options, &mut batch)
                .instrument(domain_span(&domain.name))
                .await?;
            if stopped {
                batch.stopped_early = true;
                break;
            }
        }

        batch.cache_stats = self.cache.session_stats().since(&before);
        let s = &batch.summary;
        tracing::info!(
            total = s.total,
            compliant = s.compliant,
            warnings = s.warnings,
            errors = s.errors,
            stopped_early = batch.stopped_early,
            "Validation finished"
        );
        log_cache_stats(&batch.cache_stats);
        Ok(batch)
    }

    /// Returns `true` when fail-fast stopped the domain early
    async fn run_domain(
        &mut self,
        domain: &ValidationDomain,
        options: ValidateOptions,
        batch: &mut BatchReport,
    ) -> Result<bool, ValidationError> {
        let documents = domain.documents(self.config.root(), &self.config)?;
        batch.summary.ensure_domain(&domain.name);
        tracing::debug!(documents = documents.len(), "Validating domain");

        for document in documents {
            let report = self.check(domain, &document, options.force).await;
            let stop = options.fail_fast && report.result.is_error();
            batch.push(report);
            if stop {
                tracing::warn!(document = %document, "Stopping at first error (fail-fast)");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Validate one document; every failure becomes a synthetic result
    async fn check(
        &mut self,
        domain: &ValidationDomain,
        document: &str,
        force: bool,
    ) -> DocumentReport {
        let report = |result: ValidationResult, source: VerdictSource| DocumentReport {
            document: document.to_string(),
            domain: domain.name.clone(),
            result,
            source,
        };

        let (doc_text, spec_text) = match self.read_pair(domain, document) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(document, error = %e, "Document could not be read");
                return report(
                    ValidationResult::failed_to_run(format!("Could not read input: {e}")),
                    VerdictSource::ReadFailure,
                );
            }
        };
        let fp = fingerprint(&doc_text, &spec_text);

        if !force && let Some(cached) = self.cache.read(document, &fp) {
            return report(cached, VerdictSource::Cache);
        }

        let verdict = match self.classifier.classify(&doc_text, &spec_text).await {
            Ok(raw) => parse_verdict(&raw),
            Err(e) => Err(e),
        };
        let result: ValidationResult = match verdict {
            Ok(verdict) => verdict.into(),
            Err(e) => {
                tracing::warn!(document, classifier = self.classifier.name(), error = %e, "Classifier failed");
                return report(
                    ValidationResult::failed_to_run(format!("Classifier failed: {e}")),
                    VerdictSource::ClassifierFailure,
                );
            }
        };

        let meta = EntryMeta {
            doc_type: domain.name.clone(),
            spec_path: domain.spec_path.clone(),
        };
        match self.cache.write(document, &fp, &result, &meta) {
            Ok(entry) => report(entry.result, VerdictSource::Classifier),
            Err(e) => {
                tracing::warn!(document, error = %e, "Verdict not cached");
                report(result, VerdictSource::Classifier)
            }
        }
    }

    fn read_pair(
        &self,
        domain: &ValidationDomain,
        document: &str,
    ) -> Result<(String, String), ValidationError> {
        let read = |rel: &str| {
            fs::read_to_string(self.config.root().join(rel)).map_err(|source| {
                ValidationError::Read {
                    path: rel.to_string(),
                    source,
                }
            })
        };
        Ok((read(document)?, read(&domain.spec_path)?))
    }

    /// Cached state of every governed document, without calling the classifier
    pub fn status(&self) -> Result<StatusReport, ValidationError> {
        let mut report = StatusReport::default();
        for domain in self.discover_domains()? {
            for document in domain.documents(self.config.root(), &self.config)? {
                let status = self.document_status(&domain, &document)?;
                report.push(StatusEntry {
                    document,
                    domain: domain.name.clone(),
                    status,
                });
            }
        }
        Ok(report)
    }

    fn document_status(
        &self,
        domain: &ValidationDomain,
        document: &str,
    ) -> Result<DocumentStatus, ValidationError> {
        let Some(entry) = self.cache.read_raw(document) else {
            return Ok(DocumentStatus::NotValidated);
        };
        let (doc_text, spec_text) = self.read_pair(domain, document)?;
        if !entry.is_current(&fingerprint(&doc_text, &spec_text)) {
            return Ok(DocumentStatus::Stale);
        }
        Ok(if entry.result.compliant {
            DocumentStatus::Passed
        } else if entry.result.is_warning() {
            DocumentStatus::Warned
        } else {
            DocumentStatus::Failed
        })
    }
}

//! Batch compliance validation.
//!
//! A validation domain is any directory under a configured source root that
//! holds a specification file. The [`Orchestrator`] walks domains in
//! discovery order, answers from the verdict cache when the fingerprint of
//! (document, specification) is unchanged, and otherwise asks the
//! classifier. Classifier failures become synthetic error results for that
//! document only; only configuration problems such as an unknown domain
//! abort a run.

mod domain;
mod orchestrator;
mod report;
mod status;

pub use charter_utils::error::ValidationError;
pub use domain::{ValidationDomain, discover_domains, governing_domain};
pub use orchestrator::Orchestrator;
pub use report::{
    BatchReport, DocumentReport, DomainSummary, Summary, ValidateOptions, VerdictSource,
};
pub use status::{DocumentStatus, StatusEntry, StatusReport, StatusTally};

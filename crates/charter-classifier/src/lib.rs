//! Compliance classifier seam.
//!
//! A classifier receives a document and the specification it must satisfy
//! and answers with free text whose first word is the verdict token.
//! [`parse_verdict`] turns that text into a [`Verdict`].

mod command;
mod prompt;
mod verdict;

use async_trait::async_trait;

pub use charter_utils::error::ClassifierError;
pub use command::CommandClassifier;
pub use prompt::build_prompt;
pub use verdict::{Verdict, parse_verdict};

/// External judge of document compliance.
///
/// Implementations must be shareable across tasks; the orchestrator holds
/// them behind `Arc<dyn Classifier>`.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Raw response text for `doc` judged against `spec`
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError` when the classifier could not be reached or
    /// exited unsuccessfully. Parsing the answer is the caller's concern.
    async fn classify(&self, doc: &str, spec: &str) -> Result<String, ClassifierError>;

    /// Short label for logs
    fn name(&self) -> &str {
        "classifier"
    }
}

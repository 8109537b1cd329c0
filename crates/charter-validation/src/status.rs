use serde::Serialize;

/// Cached state of one document, computed without calling the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Passed,
    Warned,
    Failed,
    /// A verdict exists but the document or its specification changed since
    Stale,
    NotValidated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub document: String,
    pub domain: String,
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub stale: usize,
    pub not_validated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub entries: Vec<StatusEntry>,
    pub tally: StatusTally,
}

impl StatusReport {
    pub(crate) fn push(&mut self, entry: StatusEntry) {
        let slot = match entry.status {
            DocumentStatus::Passed => &mut self.tally.passed,
            DocumentStatus::Warned => &mut self.tally.warned,
            DocumentStatus::Failed => &mut self.tally.failed,
            DocumentStatus::Stale => &mut self.tally.stale,
            DocumentStatus::NotValidated => &mut self.tally.not_validated,
        };
        *slot += 1;
        self.entries.push(entry);
    }

    /// Documents whose cached verdict is missing or out of date
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tally.stale + self.tally.not_validated
    }
}

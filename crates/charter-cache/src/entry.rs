use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use charter_utils::types::ValidationResult;

/// Bumped whenever the entry layout changes; older entries read as misses
pub const CACHE_FORMAT_VERSION: &str = "1";

/// Persisted cache file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: String,
    pub cached_at: DateTime<Utc>,
    pub content_hash: String,
    pub document: CachedDocument,
    pub result: ValidationResult,
}

/// Which document an entry belongs to and which specification judged it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDocument {
    pub path: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub spec_path: String,
}

/// Caller-supplied context stored alongside a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Logical document type, the validation domain name
    pub doc_type: String,
    /// Root-relative path of the governing specification
    pub spec_path: String,
}

impl CacheEntry {
    /// Whether this entry still describes the given fingerprint
    #[must_use]
    pub fn is_current(&self, fingerprint: &str) -> bool {
        self.version == CACHE_FORMAT_VERSION && self.content_hash == fingerprint
    }
}

//! Content-addressed verdict cache.
//!
//! One JSON file per document, mirroring the document's root-relative path
//! under the cache directory with `.md` swapped for `.json`. An entry is valid
//! only while its stored fingerprint equals the fingerprint of the current
//! document and specification text. Mismatches are misses, not errors, and
//! the stale file stays until the next write overwrites it.

mod entry;
mod maintenance;
mod sanitize;
mod stats;
mod store;

use blake3::Hasher;

pub use charter_utils::types::{Severity, ValidationResult};
pub use entry::{CACHE_FORMAT_VERSION, CacheEntry, CachedDocument, EntryMeta};
pub use maintenance::{CacheDirStats, OrphanedEntry};
pub use sanitize::{sanitize_result, sanitize_text};
pub use stats::{CacheStats, log_cache_stats};
pub use store::ValidationCache;

/// Hex characters kept from the BLAKE3 digest
pub const FINGERPRINT_LEN: usize = 16;

/// Fingerprint of a document together with its governing specification.
///
/// BLAKE3 over the concatenation of both texts, truncated to
/// [`FINGERPRINT_LEN`] hex characters.
#[must_use]
pub fn fingerprint(document: &str, spec: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(document.as_bytes());
    hasher.update(spec.as_bytes());
    let mut hex = hasher.finalize().to_hex().to_string();
    hex.truncate(FINGERPRINT_LEN);
    hex
}

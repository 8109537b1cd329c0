use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use std::fs;
use std::io;

use charter_utils::atomic_write::write_file_atomic;
use charter_utils::error::CacheError;
use charter_utils::paths::is_contained_relative;
use charter_utils::types::ValidationResult;

use crate::entry::{CACHE_FORMAT_VERSION, CacheEntry, CachedDocument, EntryMeta};
use crate::sanitize::sanitize_result;
use crate::stats::CacheStats;

/// Verdict cache rooted at an explicit project root and cache directory.
///
/// Documents are addressed by root-relative, `/`-separated paths.
#[derive(Debug)]
pub struct ValidationCache {
    root: Utf8PathBuf,
    cache_dir: Utf8PathBuf,
    stats: CacheStats,
}

impl ValidationCache {
    /// `cache_dir` is relative to `root`, as configuration guarantees
    pub fn new(root: impl Into<Utf8PathBuf>, cache_dir: impl AsRef<Utf8Path>) -> Self {
        let root = root.into();
        let cache_dir = root.join(cache_dir.as_ref());
        Self {
            root,
            cache_dir,
            stats: CacheStats::default(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    /// Counters for this process
    #[must_use]
    pub const fn session_stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Cache file for a document: same relative path, `.md` swapped for
    /// `.json` (other names get `.json` appended).
    ///
    /// `None` for absolute paths or paths that climb out of the root.
    #[must_use]
    pub fn cache_path_for(&self, document: &str) -> Option<Utf8PathBuf> {
        if document.is_empty() || !is_contained_relative(document) {
            return None;
        }
        let stem = document.strip_suffix(".md").unwrap_or(document);
        Some(self.cache_dir.join(format!("{stem}.json")))
    }

    /// Cached verdict if the stored fingerprint matches.
    ///
    /// Corrupt entries are deleted and read as a miss.
    pub fn read(&mut self, document: &str, fingerprint: &str) -> Option<ValidationResult> {
        let Some(path) = self.cache_path_for(document) else {
            self.stats.misses += 1;
            return None;
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(path = %path, error = %e, "Cache entry unreadable");
                }
                self.stats.misses += 1;
                tracing::debug!(document, "Cache miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) if entry.is_current(fingerprint) => {
                self.stats.hits += 1;
                tracing::debug!(document, fingerprint, "Cache hit");
                Some(entry.result)
            }
            Ok(entry) => {
                self.stats.invalidations += 1;
                self.stats.misses += 1;
                tracing::debug!(
                    document,
                    stored = %entry.content_hash,
                    current = fingerprint,
                    version = %entry.version,
                    "Cache entry stale"
                );
                None
            }
            Err(e) => {
                match fs::remove_file(&path) {
                    Ok(()) => self.stats.corrupt_removed += 1,
                    Err(rm) => tracing::debug!(path = %path, error = %rm, "Failed to remove corrupt entry"),
                }
                self.stats.misses += 1;
                tracing::warn!(path = %path, error = %e, "Corrupt cache entry removed");
                None
            }
        }
    }

    /// Whatever is stored, regardless of fingerprint. Never deletes.
    #[must_use]
    pub fn read_raw(&self, document: &str) -> Option<CacheEntry> {
        let path = self.cache_path_for(document)?;
        let text = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Sanitize, serialize, verify and persist a verdict.
    ///
    /// The target never holds a file that fails to parse: if persisting
    /// fails, an unreadable target is removed.
    pub fn write(
        &mut self,
        document: &str,
        fingerprint: &str,
        result: &ValidationResult,
        meta: &EntryMeta,
    ) -> Result<CacheEntry, CacheError> {
        let path = self
            .cache_path_for(document)
            .ok_or_else(|| CacheError::Write {
                path: document.to_string(),
                reason: "document path must be relative to the project root".to_string(),
            })?;

        let entry = CacheEntry {
            version: CACHE_FORMAT_VERSION.to_string(),
            cached_at: Utc::now(),
            content_hash: fingerprint.to_string(),
            document: CachedDocument {
                path: document.to_string(),
                doc_type: meta.doc_type.clone(),
                spec_path: meta.spec_path.clone(),
            },
            result: sanitize_result(result),
        };

        let json = serde_json::to_string_pretty(&entry).map_err(|e| CacheError::Serialize {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let parsed: CacheEntry =
            serde_json::from_str(&json).map_err(|e| CacheError::VerifyFailed {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        if parsed != entry {
            return Err(CacheError::VerifyFailed {
                path: path.to_string(),
                reason: "entry changed across a serialize round trip".to_string(),
            });
        }

        if let Err(e) = write_file_atomic(&path, &format!("{json}\n")) {
            self.discard_if_unreadable(&path);
            return Err(CacheError::Write {
                path: path.to_string(),
                reason: format!("{e:#}"),
            });
        }

        self.stats.writes += 1;
        tracing::debug!(document, fingerprint, "Cache write");
        Ok(entry)
    }

    /// Delete one document's entry; `false` if there was none
    pub fn remove(&self, document: &str) -> Result<bool, CacheError> {
        let Some(path) = self.cache_path_for(document) else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    fn discard_if_unreadable(&self, path: &Utf8Path) {
        let readable = fs::read_to_string(path)
            .ok()
            .is_some_and(|text| serde_json::from_str::<CacheEntry>(&text).is_ok());
        if !readable && path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    pub(crate) fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint;
    use charter_utils::test_support::ProjectFixture;
    use charter_utils::types::Severity;

    fn meta() -> EntryMeta {
        EntryMeta {
            doc_type: "agents".to_string(),
            spec_path: "agents/SPEC.md".to_string(),
        }
    }

    fn failing() -> ValidationResult {
        ValidationResult {
            compliant: false,
            issues: vec!["Missing owner".to_string()],
            reason: "Incomplete".to_string(),
            severity: Some(Severity::Warning),
        }
    }

    #[test]
    fn test_cache_path_mirrors_document_path() {
        let cache = ValidationCache::new("/p", ".charter/cache");
        assert_eq!(
            cache.cache_path_for("agents/reviewer.md"),
            Some(Utf8PathBuf::from("/p/.charter/cache/agents/reviewer.json"))
        );
        assert_eq!(
            cache.cache_path_for("notes/a.txt"),
            Some(Utf8PathBuf::from("/p/.charter/cache/notes/a.txt.json"))
        );
        assert_eq!(cache.cache_path_for("../escape.md"), None);
        assert_eq!(cache.cache_path_for("/abs.md"), None);
    }

    #[test]
    fn test_round_trip_and_fingerprint_mismatch() -> anyhow::Result<()> {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        let fp = fingerprint("doc", "spec");

        cache.write("agents/reviewer.md", &fp, &failing(), &meta())?;

        assert_eq!(cache.read("agents/reviewer.md", &fp), Some(failing()));
        assert_eq!(cache.read("agents/reviewer.md", &fingerprint("doc2", "spec")), None);
        assert!(project.path(".charter/cache/agents/reviewer.json").exists());

        let stats = cache.session_stats();
        assert_eq!((stats.hits, stats.misses, stats.invalidations, stats.writes), (1, 1, 1, 1));
        Ok(())
    }

    #[test]
    fn test_absent_entry_is_miss() {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        assert_eq!(cache.read("agents/none.md", "0000000000000000"), None);
        assert_eq!(cache.session_stats().misses, 1);
    }

    #[test]
    fn test_version_mismatch_is_miss_without_deletion() -> anyhow::Result<()> {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        let entry = cache.write("a.md", "ff", &ValidationResult::passed("ok"), &meta())?;

        let mut old = entry;
        old.version = "0".to_string();
        project.write(".charter/cache/a.json", &serde_json::to_string(&old)?);

        assert_eq!(cache.read("a.md", "ff"), None);
        assert!(project.path(".charter/cache/a.json").exists());
        assert_eq!(cache.read_raw("a.md").map(|e| e.version), Some("0".to_string()));
        Ok(())
    }

    #[test]
    fn test_corrupt_entry_removed_on_checked_read_only() {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        let corrupt = project.write(".charter/cache/agents/broken.json", "{ not json");

        assert!(cache.read_raw("agents/broken.md").is_none());
        assert!(corrupt.exists());

        assert!(cache.read("agents/broken.md", "anything").is_none());
        assert!(!corrupt.exists());
        assert_eq!(cache.session_stats().corrupt_removed, 1);
    }

    #[test]
    fn test_write_sanitizes_free_text() -> anyhow::Result<()> {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        let dirty = ValidationResult {
            compliant: false,
            issues: vec!["Uses \u{201C}smart\u{201D} quotes\u{7}".to_string()],
            reason: "Bad\u{0} byte".to_string(),
            severity: Some(Severity::Error),
        };

        let stored = cache.write("d.md", "aa", &dirty, &meta())?;
        assert_eq!(stored.result.issues, vec!["Uses \"smart\" quotes"]);
        assert_eq!(stored.result.reason, "Bad byte");
        assert_eq!(cache.read("d.md", "aa"), Some(stored.result));
        Ok(())
    }

    #[test]
    fn test_write_outside_root_rejected() {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        let err = cache
            .write("../x.md", "aa", &ValidationResult::passed("ok"), &meta())
            .unwrap_err();
        assert!(matches!(err, CacheError::Write { .. }));
    }

    #[test]
    fn test_overwrite_in_place_and_remove() -> anyhow::Result<()> {
        let project = ProjectFixture::new();
        let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
        cache.write("a.md", "01", &failing(), &meta())?;
        cache.write("a.md", "02", &ValidationResult::passed("fixed"), &meta())?;

        assert_eq!(cache.read_raw("a.md").map(|e| e.content_hash), Some("02".to_string()));
        assert!(cache.remove("a.md")?);
        assert!(!cache.remove("a.md")?);
        Ok(())
    }
}

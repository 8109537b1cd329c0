use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

use charter_utils::error::CacheError;
use charter_utils::paths::{is_within_dir, relative_slash, walk_files};

use crate::entry::CacheEntry;
use crate::store::ValidationCache;

/// A cache file whose source document is gone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedEntry {
    pub cache_path: Utf8PathBuf,
    /// Root-relative document the entry was written for
    pub document: String,
}

/// Size of the cache directory, without validating any entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheDirStats {
    pub file_count: usize,
    pub total_bytes: u64,
    /// Entry counts keyed by first path component under the cache directory
    pub by_directory: BTreeMap<String, usize>,
}

impl ValidationCache {
    fn entry_files(&self) -> Result<Vec<Utf8PathBuf>, CacheError> {
        let files = walk_files(self.cache_dir()).map_err(|source| CacheError::Io {
            path: self.cache_dir().to_string(),
            source,
        })?;
        Ok(files
            .into_iter()
            .filter(|p| p.extension() == Some("json"))
            .collect())
    }

    /// Document an entry file belongs to.
    ///
    /// Prefers the path recorded inside the entry and falls back to mapping
    /// the file name back to `.md` when the entry does not parse.
    fn document_for(&self, cache_file: &Utf8Path) -> Option<String> {
        let recorded = fs::read_to_string(cache_file)
            .ok()
            .and_then(|text| serde_json::from_str::<CacheEntry>(&text).ok())
            .map(|entry| entry.document.path);
        if recorded.is_some() {
            return recorded;
        }
        let rel = relative_slash(self.cache_dir(), cache_file)?;
        rel.strip_suffix(".json").map(|stem| format!("{stem}.md"))
    }

    /// Entries whose document no longer exists in any source directory.
    ///
    /// A document that exists but changed is stale, not orphaned.
    pub fn orphaned_entries<S: AsRef<str>>(
        &self,
        source_dirs: &[S],
    ) -> Result<Vec<OrphanedEntry>, CacheError> {
        let mut orphans = Vec::new();
        for cache_path in self.entry_files()? {
            let Some(document) = self.document_for(&cache_path) else {
                continue;
            };
            let in_sources = source_dirs
                .iter()
                .any(|dir| is_within_dir(&document, dir.as_ref()));
            if !in_sources || !self.root().join(&document).is_file() {
                orphans.push(OrphanedEntry {
                    cache_path,
                    document,
                });
            }
        }
        Ok(orphans)
    }

    /// Delete orphaned entries and return what was removed
    pub fn prune_orphans<S: AsRef<str>>(
        &self,
        source_dirs: &[S],
    ) -> Result<Vec<OrphanedEntry>, CacheError> {
        let orphans = self.orphaned_entries(source_dirs)?;
        for orphan in &orphans {
            fs::remove_file(&orphan.cache_path).map_err(|source| CacheError::Io {
                path: orphan.cache_path.to_string(),
                source,
            })?;
            tracing::info!(document = %orphan.document, "Pruned orphaned cache entry");
        }
        Ok(orphans)
    }

    /// File count, total size and per-directory counts
    pub fn stats(&self) -> Result<CacheDirStats, CacheError> {
        let mut stats = CacheDirStats::default();
        for path in self.entry_files()? {
            let size = fs::metadata(&path)
                .map_err(|source| CacheError::Io {
                    path: path.to_string(),
                    source,
                })?
                .len();
            stats.file_count += 1;
            stats.total_bytes += size;

            let rel = relative_slash(self.cache_dir(), &path).unwrap_or_default();
            let top = match rel.split_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => ".".to_string(),
            };
            *stats.by_directory.entry(top).or_default() += 1;
        }
        Ok(stats)
    }

    /// Delete every entry and reset counters; returns how many were removed
    pub fn clear(&mut self) -> Result<usize, CacheError> {
        let files = self.entry_files()?;
        for path in &files {
            fs::remove_file(path).map_err(|source| CacheError::Io {
                path: path.to_string(),
                source,
            })?;
        }
        self.reset_stats();
        tracing::info!(removed = files.len(), "Cleared validation cache");
        Ok(files.len())
    }
}

//! Expansion of manifest reference patterns into concrete files.
//!
//! A pattern is either a literal root-relative path or a glob (`*`, `?`,
//! `[`). Literals resolve to themselves without touching the disk. Globs match
//! files only, come back sorted and deduplicated, and never include the
//! template-placeholder or specification file at any depth.

mod body;

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};

use charter_config::FilesConfig;
use charter_utils::error::ResolverError;
use charter_utils::paths::{relative_slash, walk_files};

pub use body::ReferenceBody;

/// Purely syntactic glob detection
#[must_use]
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expands reference patterns against a fixed project root
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    root: Utf8PathBuf,
    excluded_names: Vec<String>,
}

impl ReferenceResolver {
    /// Resolver that excludes the configured template and specification names
    pub fn new(root: impl Into<Utf8PathBuf>, files: &FilesConfig) -> Self {
        Self::with_excluded_names(root, vec![files.template.clone(), files.spec.clone()])
    }

    pub fn with_excluded_names(root: impl Into<Utf8PathBuf>, excluded_names: Vec<String>) -> Self {
        Self {
            root: root.into(),
            excluded_names,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Whether a filename is dropped from glob results
    #[must_use]
    pub fn is_excluded_name(&self, file_name: &str) -> bool {
        self.excluded_names.iter().any(|n| n == file_name)
    }

    /// Expand one pattern into root-relative, `/`-separated paths.
    ///
    /// Zero matches is an empty list, not an error.
    pub fn expand(&self, pattern: &str) -> Result<Vec<String>, ResolverError> {
        if !is_glob(pattern) {
            return Ok(vec![pattern.to_string()]);
        }

        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        let matcher = compile_glob(pattern)?;
        let prefix = literal_prefix(pattern);
        let base = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        };

        let files = walk_files(&base).map_err(|source| ResolverError::Walk {
            path: base.to_string(),
            source,
        })?;

        let mut matches: Vec<String> = files
            .iter()
            .filter_map(|path| relative_slash(&self.root, path))
            .filter(|rel| matcher.is_match(rel.as_str()))
            .filter(|rel| !self.is_excluded_name(file_name(rel)))
            .collect();
        matches.sort();
        matches.dedup();

        tracing::trace!(pattern, count = matches.len(), "Expanded glob");
        Ok(matches)
    }

    /// Expand each pattern in order and concatenate.
    ///
    /// Duplicates across patterns are kept.
    pub fn expand_all<I, S>(&self, patterns: I) -> Result<Vec<String>, ResolverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for pattern in patterns {
            out.extend(self.expand(pattern.as_ref())?);
        }
        Ok(out)
    }

    /// Whether a pattern names at least one existing file
    pub fn matches(&self, pattern: &str) -> Result<bool, ResolverError> {
        if is_glob(pattern) {
            Ok(!self.expand(pattern)?.is_empty())
        } else {
            Ok(charter_utils::paths::is_contained_relative(pattern)
                && self.root.join(pattern).is_file())
        }
    }
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, ResolverError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ResolverError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Leading directory components that contain no glob syntax
fn literal_prefix(pattern: &str) -> String {
    let mut components: Vec<&str> = pattern.split('/').collect();
    components.pop();
    components
        .into_iter()
        .take_while(|c| !is_glob(c) && *c != "..")
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

use charter_utils::paths::is_contained_relative;

use super::ReferenceResolver;

/// A resolved reference after an attempt to read it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceBody {
    /// Body with its manifest header stripped and whitespace trimmed
    Found { path: String, body: String },
    /// Path did not exist (or was unreadable) at read time
    Missing { path: String },
}

impl ReferenceBody {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Found { path, .. } | Self::Missing { path } => path,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Found { body, .. } => Some(body),
            Self::Missing { .. } => None,
        }
    }
}

impl ReferenceResolver {
    /// Read a resolved path fresh from disk and strip its header
    #[must_use]
    pub fn load(&self, rel: &str) -> ReferenceBody {
        if !is_contained_relative(rel) {
            tracing::warn!(path = rel, "Reference escapes the project root; ignoring");
            return ReferenceBody::Missing {
                path: rel.to_string(),
            };
        }

        let full = self.root().join(rel);
        match charter_manifest::parse_file(&full) {
            Ok(doc) => ReferenceBody::Found {
                path: rel.to_string(),
                body: doc.body().to_string(),
            },
            Err(e) => {
                tracing::debug!(path = rel, error = %e, "Referenced file unavailable");
                ReferenceBody::Missing {
                    path: rel.to_string(),
                }
            }
        }
    }

    /// Load every path, keeping order
    pub fn load_all<I, S>(&self, paths: I) -> Vec<ReferenceBody>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().map(|p| self.load(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_config::FilesConfig;
    use charter_utils::test_support::ProjectFixture;

    #[test]
    fn test_load_strips_header() {
        let project = ProjectFixture::new();
        project.write_doc("r/review.md", "title: Review", "\nReview PRs.\n");
        let r = ReferenceResolver::new(project.root(), &FilesConfig::default());

        assert_eq!(
            r.load("r/review.md"),
            ReferenceBody::Found {
                path: "r/review.md".to_string(),
                body: "Review PRs.".to_string(),
            }
        );
    }

    #[test]
    fn test_load_missing_and_escaping_paths() {
        let project = ProjectFixture::new();
        let r = ReferenceResolver::new(project.root(), &FilesConfig::default());

        assert!(matches!(r.load("gone.md"), ReferenceBody::Missing { .. }));
        assert!(matches!(r.load("../etc/passwd"), ReferenceBody::Missing { .. }));
        assert_eq!(r.load("gone.md").body(), None);
    }

    #[test]
    fn test_load_all_keeps_order() {
        let project = ProjectFixture::new();
        project.write("b.md", "B");
        project.write("a.md", "A");
        let r = ReferenceResolver::new(project.root(), &FilesConfig::default());

        let loaded = r.load_all(["b.md", "missing.md", "a.md"]);
        let paths: Vec<&str> = loaded.iter().map(ReferenceBody::path).collect();
        assert_eq!(paths, vec!["b.md", "missing.md", "a.md"]);
        assert_eq!(loaded[2].body(), Some("A"));
    }
}

use charter_manifest::{Manifest, ManifestValue};

use crate::fields;

/// The `immutableContext` manifest field.
///
/// `true` is the legacy "everything in the immutable directory" form. A
/// string or list of patterns is the explicit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmutableContext {
    Disabled,
    LegacyAll,
    ExplicitList(Vec<String>),
}

impl ImmutableContext {
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        match manifest.get(fields::IMMUTABLE_CONTEXT) {
            ManifestValue::Absent | ManifestValue::Bool(false) => Self::Disabled,
            ManifestValue::Bool(true) => Self::LegacyAll,
            other => Self::ExplicitList(other.into_sequence()),
        }
    }

    /// Patterns to expand for this document.
    ///
    /// `LegacyAll` yields nothing unless `legacy_all` is set, in which case it
    /// becomes every markdown file under `immutable_dir`.
    #[must_use]
    pub fn patterns(&self, immutable_dir: &str, legacy_all: bool) -> Vec<String> {
        match self {
            Self::Disabled => Vec::new(),
            Self::ExplicitList(patterns) => patterns.clone(),
            Self::LegacyAll if legacy_all => {
                vec![format!("{}/**/*.md", immutable_dir.trim_end_matches('/'))]
            }
            Self::LegacyAll => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_manifest::parse_document;

    fn immutable(header: &str) -> ImmutableContext {
        ImmutableContext::from_manifest(parse_document(&format!("---\n{header}\n---\n")).manifest())
    }

    #[test]
    fn test_variants() {
        assert_eq!(immutable("name: a"), ImmutableContext::Disabled);
        assert_eq!(immutable("immutableContext: false"), ImmutableContext::Disabled);
        assert_eq!(immutable("immutableContext: true"), ImmutableContext::LegacyAll);
        assert_eq!(
            immutable("immutableContext: identity/*.md"),
            ImmutableContext::ExplicitList(vec!["identity/*.md".to_string()])
        );
        assert_eq!(
            immutable("immutableContext: [a.md, b.md]"),
            ImmutableContext::ExplicitList(vec!["a.md".to_string(), "b.md".to_string()])
        );
    }

    #[test]
    fn test_legacy_patterns_behind_flag() {
        let legacy = ImmutableContext::LegacyAll;
        assert!(legacy.patterns("immutable", false).is_empty());
        assert_eq!(legacy.patterns("immutable/", true), vec!["immutable/**/*.md"]);
    }
}

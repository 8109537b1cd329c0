//! Reference health check.
//!
//! The compiler drops unmatched patterns and vanished files silently. This
//! pass reports them so authors can fix their manifests.

use camino::Utf8Path;
use std::fmt;

use charter_resolver::is_glob;
use charter_utils::error::CompileError;
use charter_utils::paths::is_contained_relative;

use crate::compiler::Compiler;
use crate::fields;
use crate::immutable::ImmutableContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// Glob pattern that matches no file
    ZeroMatches,
    /// Literal path that does not exist
    MissingFile,
    /// Absolute or `..` path
    OutsideRoot,
    InvalidPattern { reason: String },
    /// `immutableContext: true`
    LegacyImmutable,
    MissingName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFinding {
    /// Root-relative subject document
    pub document: String,
    /// Manifest field the pattern came from
    pub field: &'static str,
    pub pattern: String,
    pub kind: FindingKind,
}

impl fmt::Display for ReferenceFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.kind {
            FindingKind::ZeroMatches => "glob matches no files".to_string(),
            FindingKind::MissingFile => "file does not exist".to_string(),
            FindingKind::OutsideRoot => "path leaves the project root".to_string(),
            FindingKind::InvalidPattern { reason } => format!("invalid pattern: {reason}"),
            FindingKind::LegacyImmutable => {
                "deprecated boolean form; list patterns explicitly".to_string()
            }
            FindingKind::MissingName => "document cannot be compiled".to_string(),
        };
        if self.pattern.is_empty() {
            write!(f, "{}: {}: {what}", self.document, self.field)
        } else {
            write!(f, "{}: {} '{}': {what}", self.document, self.field, self.pattern)
        }
    }
}

impl Compiler {
    /// Check every reference pattern in one subject document
    pub fn check_references(&self, path: &Utf8Path) -> Result<Vec<ReferenceFinding>, CompileError> {
        let path = self.absolute(path);
        let document = self.display_path(&path);
        let doc = self.read_subject(&path)?;
        let manifest = doc.manifest();
        let mut findings = Vec::new();

        let finding = |field: &'static str, pattern: &str, kind: FindingKind| ReferenceFinding {
            document: document.clone(),
            field,
            pattern: pattern.to_string(),
            kind,
        };

        if manifest.string(fields::NAME).is_none() {
            findings.push(finding(fields::NAME, "", FindingKind::MissingName));
        }

        let immutable = ImmutableContext::from_manifest(manifest);
        if immutable.is_legacy() {
            findings.push(finding(
                fields::IMMUTABLE_CONTEXT,
                "true",
                FindingKind::LegacyImmutable,
            ));
        }

        let checks = [
            (fields::OWNED_WORK, manifest.array(fields::OWNED_WORK)),
            (fields::IMMUTABLE_CONTEXT, self.immutable_patterns(&immutable)),
            (fields::CONTEXT, manifest.array(fields::CONTEXT)),
            (fields::REFERENCES, manifest.array(fields::REFERENCES)),
        ];

        for (field, patterns) in checks {
            for pattern in &patterns {
                if !is_contained_relative(pattern.strip_prefix("./").unwrap_or(pattern)) {
                    findings.push(finding(field, pattern.as_str(), FindingKind::OutsideRoot));
                    continue;
                }
                match self.resolver().matches(pattern) {
                    Ok(true) => {}
                    Ok(false) if is_glob(pattern) => {
                        findings.push(finding(field, pattern.as_str(), FindingKind::ZeroMatches));
                    }
                    Ok(false) => findings.push(finding(field, pattern.as_str(), FindingKind::MissingFile)),
                    Err(e) => findings.push(finding(
                        field,
                        pattern.as_str(),
                        FindingKind::InvalidPattern {
                            reason: e.to_string(),
                        },
                    )),
                }
            }
        }

        Ok(findings)
    }

    /// Check every subject in the configured source directories
    pub fn check_all(&self) -> Result<Vec<ReferenceFinding>, CompileError> {
        let mut findings = Vec::new();
        for dir in self.source_dirs() {
            for path in self.list_subjects(dir)? {
                findings.extend(self.check_references(&path)?);
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_config::Config;
    use charter_utils::test_support::ProjectFixture;

    #[test]
    fn test_findings_for_broken_references() {
        let project = ProjectFixture::new();
        project.write_doc(
            "agents/a.md",
            "name: a\nimmutableContext: true\nownedWork: [work/*.md, work/real.md]\n\
             context: [gone/*.md, gone.md]\nreferences: ['../outside.md']",
            "Body",
        );
        project.write("work/real.md", "Real");

        let config = Config::builder()
            .root(project.root().to_path_buf())
            .build()
            .unwrap();
        let findings = Compiler::new(&config)
            .check_references(Utf8Path::new("agents/a.md"))
            .unwrap();

        let summary: Vec<(&str, &str, &FindingKind)> = findings
            .iter()
            .map(|f| (f.field, f.pattern.as_str(), &f.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                (fields::IMMUTABLE_CONTEXT, "true", &FindingKind::LegacyImmutable),
                (fields::CONTEXT, "gone/*.md", &FindingKind::ZeroMatches),
                (fields::CONTEXT, "gone.md", &FindingKind::MissingFile),
                (fields::REFERENCES, "../outside.md", &FindingKind::OutsideRoot),
            ]
        );
        assert_eq!(
            findings[1].to_string(),
            "agents/a.md: context 'gone/*.md': glob matches no files"
        );
    }

    #[test]
    fn test_check_all_flags_nameless_documents() {
        let project = ProjectFixture::new();
        project.write_doc("agents/ok.md", "name: ok", "Body");
        project.write_doc("agents/anon.md", "description: x", "Body");

        let config = Config::builder()
            .root(project.root().to_path_buf())
            .build()
            .unwrap();
        let findings = Compiler::new(&config).check_all().unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].document, "agents/anon.md");
        assert_eq!(findings[0].kind, FindingKind::MissingName);
    }
}

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;

use charter_config::Config;
use charter_utils::error::ValidationError;
use charter_utils::paths::{is_within_dir, relative_slash, to_slash};

/// A directory holding a specification file, plus the documents it governs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDomain {
    /// Root-relative directory, used as the domain name and cached document type
    pub name: String,
    pub dir: Utf8PathBuf,
    /// Root-relative path of the specification file
    pub spec_path: String,
}

fn read_error(path: &Utf8Path, source: std::io::Error) -> ValidationError {
    ValidationError::Read {
        path: path.to_string(),
        source,
    }
}

fn sorted_entries(dir: &Utf8Path) -> Result<Vec<(Utf8PathBuf, fs::FileType)>, ValidationError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| read_error(dir, e))? {
        let entry = entry.map_err(|e| read_error(dir, e))?;
        let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 path");
            continue;
        };
        let file_type = entry.file_type().map_err(|e| read_error(&path, e))?;
        entries.push((path, file_type));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn is_hidden(path: &Utf8Path) -> bool {
    path.file_name().is_some_and(|n| n.starts_with('.'))
}

/// Find every domain under the configured validation source roots.
///
/// Source roots are visited in declaration order and each is walked
/// depth-first with sorted entries. Missing roots are skipped.
pub fn discover_domains(config: &Config) -> Result<Vec<ValidationDomain>, ValidationError> {
    let root = config.root();
    let mut domains = Vec::new();
    for source in &config.validate.source_dirs {
        let dir = if source == "." {
            root.to_path_buf()
        } else {
            root.join(source)
        };
        if !dir.is_dir() {
            tracing::debug!(source = %source, "Validation source directory missing");
            continue;
        }
        collect_domains(root, &dir, &config.files.spec, &mut domains)?;
    }
    Ok(domains)
}

fn collect_domains(
    root: &Utf8Path,
    dir: &Utf8Path,
    spec_name: &str,
    domains: &mut Vec<ValidationDomain>,
) -> Result<(), ValidationError> {
    if dir.join(spec_name).is_file()
        && let Some(name) = relative_slash(root, dir)
        && !domains.iter().any(|d| d.dir.as_path() == dir)
    {
        let spec_path = to_slash(&Utf8Path::new(&name).join(spec_name));
        domains.push(ValidationDomain {
            name,
            dir: dir.to_path_buf(),
            spec_path,
        });
    }
    for (path, file_type) in sorted_entries(dir)? {
        if file_type.is_dir() && !is_hidden(&path) {
            collect_domains(root, &path, spec_name, domains)?;
        }
    }
    Ok(())
}

impl ValidationDomain {
    /// Markdown documents this domain governs, root-relative and sorted.
    ///
    /// Subdirectories are included unless they hold their own specification.
    /// The specification, the template and private files are excluded.
    pub fn documents(
        &self,
        root: &Utf8Path,
        config: &Config,
    ) -> Result<Vec<String>, ValidationError> {
        let mut documents = Vec::new();
        self.collect_documents(root, &self.dir, config, &mut documents)?;
        documents.sort();
        Ok(documents)
    }

    fn collect_documents(
        &self,
        root: &Utf8Path,
        dir: &Utf8Path,
        config: &Config,
        documents: &mut Vec<String>,
    ) -> Result<(), ValidationError> {
        for (path, file_type) in sorted_entries(dir)? {
            if file_type.is_dir() {
                if !is_hidden(&path) && !path.join(&config.files.spec).is_file() {
                    self.collect_documents(root, &path, config, documents)?;
                }
                continue;
            }
            if !path.is_file() || !is_governed_file(&path, config) {
                continue;
            }
            if let Some(rel) = relative_slash(root, &path) {
                documents.push(rel);
            }
        }
        Ok(())
    }
}

/// Whether a file name is a validatable document
pub(crate) fn is_governed_file(path: &Utf8Path, config: &Config) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    path.extension() == Some("md")
        && name != config.files.spec
        && name != config.files.template
        && (config.files.private_prefix.is_empty() || !name.starts_with(&config.files.private_prefix))
}

/// Nearest ancestor of `document` inside a validation source root that holds
/// a specification file
pub fn governing_domain(config: &Config, document: &str) -> Option<ValidationDomain> {
    let root = config.root();
    let mut current = Utf8Path::new(document).parent();
    while let Some(dir) = current {
        let rel = to_slash(dir);
        if rel.is_empty() {
            break;
        }
        let inside = config
            .validate
            .source_dirs
            .iter()
            .any(|s| is_within_dir(&rel, s));
        if !inside {
            break;
        }
        let abs = root.join(dir);
        if abs.join(&config.files.spec).is_file() {
            return Some(ValidationDomain {
                spec_path: format!("{rel}/{}", config.files.spec),
                name: rel,
                dir: abs,
            });
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_utils::test_support::ProjectFixture;

    fn config(project: &ProjectFixture, sources: &[&str]) -> Config {
        Config::builder()
            .root(project.root().to_path_buf())
            .validate_source_dirs(sources.iter().map(|s| s.to_string()).collect())
            .build()
            .unwrap()
    }

    #[test]
    fn test_domains_found_in_source_order() {
        let project = ProjectFixture::new();
        project.write("context/SPEC.md", "spec");
        project.write("agents/SPEC.md", "spec");
        project.write("agents/nested/team/SPEC.md", "spec");
        project.write("agents/plain/doc.md", "x");

        let domains = discover_domains(&config(&project, &["context", "agents", "missing"])).unwrap();
        let names: Vec<_> = domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["context", "agents", "agents/nested/team"]);
        assert_eq!(domains[2].spec_path, "agents/nested/team/SPEC.md");
    }

    #[test]
    fn test_overlapping_sources_do_not_duplicate() {
        let project = ProjectFixture::new();
        project.write("agents/team/SPEC.md", "spec");
        let domains = discover_domains(&config(&project, &["agents", "agents/team"])).unwrap();
        assert_eq!(domains.len(), 1);
    }

    #[test]
    fn test_documents_exclude_spec_template_and_private() {
        let project = ProjectFixture::new();
        project.write("agents/SPEC.md", "spec");
        project.write("agents/TEMPLATE.md", "t");
        project.write("agents/_draft.md", "d");
        project.write("agents/notes.txt", "n");
        project.write("agents/b.md", "b");
        project.write("agents/a.md", "a");
        project.write("agents/sub/c.md", "c");
        project.write("agents/team/SPEC.md", "spec");
        project.write("agents/team/d.md", "d");
        let config = config(&project, &["agents"]);

        let domains = discover_domains(&config).unwrap();
        let docs = domains[0].documents(project.root(), &config).unwrap();
        assert_eq!(docs, vec!["agents/a.md", "agents/b.md", "agents/sub/c.md"]);
        let team = domains[1].documents(project.root(), &config).unwrap();
        assert_eq!(team, vec!["agents/team/d.md"]);
    }

    #[test]
    fn test_governing_domain_is_nearest_spec_inside_sources() {
        let project = ProjectFixture::new();
        project.write("SPEC.md", "root spec is outside every source");
        project.write("agents/SPEC.md", "spec");
        project.write("agents/team/SPEC.md", "spec");
        project.write("agents/team/deep/x.md", "x");
        project.write("other/y.md", "y");
        let config = config(&project, &["agents"]);

        let domain = governing_domain(&config, "agents/team/deep/x.md").unwrap();
        assert_eq!(domain.name, "agents/team");
        assert_eq!(domain.spec_path, "agents/team/SPEC.md");
        assert!(governing_domain(&config, "other/y.md").is_none());
        assert!(governing_domain(&config, "top.md").is_none());
    }

    #[test]
    fn test_dotted_source_dir_finds_same_domain_both_ways() {
        let project = ProjectFixture::new();
        project.write("agents/SPEC.md", "spec");
        project.write("agents/a.md", "a");

        for spelling in ["./agents", "agents/", "./agents/"] {
            let config = config(&project, &[spelling]);
            let discovered: Vec<_> = discover_domains(&config)
                .unwrap()
                .into_iter()
                .map(|d| d.name)
                .collect();
            assert_eq!(discovered, vec!["agents"], "{spelling}");
            let governing = governing_domain(&config, "agents/a.md").map(|d| d.name);
            assert_eq!(governing.as_deref(), Some("agents"), "{spelling}");
        }
    }

    #[test]
    fn test_root_source_dir_governs_everything_below() {
        let project = ProjectFixture::new();
        project.write("agents/SPEC.md", "spec");
        project.write("agents/a.md", "a");
        let config = config(&project, &["."]);

        assert_eq!(governing_domain(&config, "agents/a.md").map(|d| d.name).as_deref(), Some("agents"));
    }
}

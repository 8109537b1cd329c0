use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fmt;

use charter_config::{Config, FilesConfig};
use charter_manifest::{ManifestError, ParsedDocument};
use charter_resolver::{ReferenceBody, ReferenceResolver};
use charter_utils::atomic_write::write_file_atomic;
use charter_utils::error::CompileError;
use charter_utils::logging::compile_span;
use charter_utils::paths::relative_slash;

use crate::fields;
use crate::immutable::ImmutableContext;
use crate::metadata::AgentMetadata;
use crate::plugin::{AgentDirPlugin, OutputPlugin, PluginInput};
use crate::sections::{Section, SectionBuilder, SectionKind, render_sections};
use crate::slug::slugify;

/// A fully assembled document, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDocument {
    /// Root-relative path of the subject document
    pub source: String,
    pub name: String,
    pub slug: String,
    pub metadata: Option<AgentMetadata>,
    pub sections: Vec<Section>,
    /// Rendered sections without the metadata block
    pub body: String,
    /// Complete output text
    pub text: String,
}

impl CompiledDocument {
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Why a document produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    /// The name contains no ASCII letters or digits
    EmptySlug { name: String },
    /// The document or one of its reference patterns could not be read
    Unresolvable { reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "no `{}` field in manifest", fields::NAME),
            Self::EmptySlug { name } => write!(f, "name '{name}' yields an empty filename"),
            Self::Unresolvable { reason } => write!(f, "{reason}"),
        }
    }
}

/// A plugin output that was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    pub plugin: String,
    pub path: Utf8PathBuf,
}

/// A plugin that failed for one document; the run continues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFailure {
    pub plugin: String,
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled {
        document: CompiledDocument,
        output: Utf8PathBuf,
        plugin_outputs: Vec<PluginOutput>,
        plugin_failures: Vec<PluginFailure>,
    },
    Skipped {
        path: String,
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
    pub source: String,
    pub name: String,
    pub output: Utf8PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: SkipReason,
}

/// Totals for a directory-wide compile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub compiled: Vec<CompiledEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub plugin_outputs: Vec<PluginOutput>,
    pub plugin_failures: Vec<PluginFailure>,
}

impl CompileReport {
    fn record(&mut self, outcome: CompileOutcome) {
        match outcome {
            CompileOutcome::Compiled {
                document,
                output,
                plugin_outputs,
                plugin_failures,
            } => {
                self.compiled.push(CompiledEntry {
                    source: document.source,
                    name: document.name,
                    output,
                });
                self.plugin_outputs.extend(plugin_outputs);
                self.plugin_failures.extend(plugin_failures);
            }
            CompileOutcome::Skipped { path, reason } => {
                self.skipped.push(SkippedEntry { path, reason });
            }
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.compiled.extend(other.compiled);
        self.skipped.extend(other.skipped);
        self.plugin_outputs.extend(other.plugin_outputs);
        self.plugin_failures.extend(other.plugin_failures);
    }
}

/// Turns subject documents into self-contained outputs
pub struct Compiler {
    root: Utf8PathBuf,
    files: FilesConfig,
    source_dirs: Vec<Utf8PathBuf>,
    output_dir: Utf8PathBuf,
    immutable_dir: String,
    legacy_immutable_all: bool,
    resolver: ReferenceResolver,
    plugins: Vec<Box<dyn OutputPlugin>>,
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("root", &self.root)
            .field("output_dir", &self.output_dir)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Compiler {
    /// Compiler with one [`AgentDirPlugin`] per configured plugin directory
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let plugins = config
            .plugin_dirs()
            .into_iter()
            .map(|dir| Box::new(AgentDirPlugin::new(dir)) as Box<dyn OutputPlugin>)
            .collect();

        Self {
            root: config.root.clone(),
            files: config.files.clone(),
            source_dirs: config.compile_source_dirs(),
            output_dir: config.output_dir(),
            immutable_dir: config.compile.immutable_dir.clone(),
            legacy_immutable_all: config.compile.legacy_immutable_all,
            resolver: ReferenceResolver::new(&config.root, &config.files),
            plugins,
        }
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin: Box<dyn OutputPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    #[must_use]
    pub fn source_dirs(&self) -> &[Utf8PathBuf] {
        &self.source_dirs
    }

    pub(crate) fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    pub(crate) fn immutable_patterns(&self, immutable: &ImmutableContext) -> Vec<String> {
        immutable.patterns(&self.immutable_dir, self.legacy_immutable_all)
    }

    pub(crate) fn absolute(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub(crate) fn display_path(&self, path: &Utf8Path) -> String {
        relative_slash(&self.root, path).unwrap_or_else(|| path.to_string())
    }

    pub(crate) fn read_subject(&self, path: &Utf8Path) -> Result<ParsedDocument, CompileError> {
        charter_manifest::parse_file(path).map_err(|e| match e {
            ManifestError::Read { path, source } => CompileError::Read {
                path: path.to_string(),
                source,
            },
        })
    }

    /// Assemble a document in memory.
    ///
    /// Returns the skip reason when no output can be derived.
    pub fn assemble(&self, path: &Utf8Path) -> Result<Result<CompiledDocument, SkipReason>, CompileError> {
        let path = self.absolute(path);
        let source = self.display_path(&path);
        let doc = self.read_subject(&path)?;
        let manifest = doc.manifest();

        let Some(name) = manifest.string(fields::NAME) else {
            return Ok(Err(SkipReason::MissingName));
        };
        let slug = slugify(&name);
        if slug.is_empty() {
            return Ok(Err(SkipReason::EmptySlug { name }));
        }

        let mut builder = SectionBuilder::new();
        builder.push(SectionKind::Primary, &source, doc.body());

        let immutable = ImmutableContext::from_manifest(manifest);
        if immutable.is_legacy() {
            tracing::warn!(
                document = %source,
                legacy_all = self.legacy_immutable_all,
                "`immutableContext: true` is deprecated; list patterns explicitly"
            );
        }

        let reference_fields = [
            (SectionKind::OwnedWork, manifest.array(fields::OWNED_WORK)),
            (SectionKind::ImmutableContext, self.immutable_patterns(&immutable)),
            (SectionKind::Context, manifest.array(fields::CONTEXT)),
            (SectionKind::References, manifest.array(fields::REFERENCES)),
        ];

        for (kind, patterns) in reference_fields {
            let paths = self.resolver.expand_all(&patterns)?;
            for reference in self.resolver.load_all(&paths) {
                match reference {
                    ReferenceBody::Found { path, body } => builder.push(kind, &path, &body),
                    ReferenceBody::Missing { path } => {
                        tracing::debug!(document = %source, reference = %path, "Skipping missing reference");
                    }
                }
            }
        }

        let sections = builder.finish();
        let body = render_sections(&sections);
        let metadata = AgentMetadata::from_manifest(&name, manifest);

        let mut text = match &metadata {
            Some(meta) => {
                let front_matter = meta.to_front_matter().map_err(|e| CompileError::Metadata {
                    path: source.clone(),
                    reason: e.to_string(),
                })?;
                format!("{front_matter}\n{body}")
            }
            None => body.clone(),
        };
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        text.push('\n');

        Ok(Ok(CompiledDocument {
            source,
            name,
            slug,
            metadata,
            sections,
            body,
            text,
        }))
    }

    /// Compile one document and write its output and plugin artifacts
    pub fn compile_file(&self, path: &Utf8Path) -> Result<CompileOutcome, CompileError> {
        let abs = self.absolute(path);
        let span = compile_span(&self.display_path(&abs));
        let _guard = span.enter();

        let document = match self.assemble(&abs)? {
            Ok(document) => document,
            Err(reason) => {
                let path = self.display_path(&abs);
                tracing::warn!(document = %path, %reason, "Skipping document");
                return Ok(CompileOutcome::Skipped { path, reason });
            }
        };

        let output = self.output_dir.join(format!("{}.md", document.slug));
        write_file_atomic(&output, &document.text).map_err(|e| CompileError::Write {
            path: output.to_string(),
            reason: format!("{e:#}"),
        })?;

        let (plugin_outputs, plugin_failures) = self.run_plugins(&document)?;

        tracing::debug!(output = %output, sections = document.sections.len(), "Compiled document");
        Ok(CompileOutcome::Compiled {
            document,
            output,
            plugin_outputs,
            plugin_failures,
        })
    }

    fn run_plugins(
        &self,
        document: &CompiledDocument,
    ) -> Result<(Vec<PluginOutput>, Vec<PluginFailure>), CompileError> {
        let mut outputs = Vec::new();
        let mut failures = Vec::new();
        let input = PluginInput {
            body: &document.body,
            metadata: document.metadata.as_ref(),
            slug: &document.slug,
        };

        for plugin in &self.plugins {
            let artifact = match plugin.render(&input) {
                Ok(artifact) => artifact,
                Err(e) => {
                    tracing::warn!(plugin = plugin.name(), document = %document.source, error = %e, "Plugin failed");
                    failures.push(PluginFailure {
                        plugin: plugin.name().to_string(),
                        source: document.source.clone(),
                        error: format!("{e:#}"),
                    });
                    continue;
                }
            };
            write_file_atomic(&artifact.path, &artifact.content).map_err(|e| {
                CompileError::Write {
                    path: artifact.path.to_string(),
                    reason: format!("{e:#}"),
                }
            })?;
            outputs.push(PluginOutput {
                plugin: plugin.name().to_string(),
                path: artifact.path,
            });
        }

        Ok((outputs, failures))
    }

    /// Subject documents directly inside `dir`, sorted.
    ///
    /// Private, specification and template files are not subjects.
    pub fn list_subjects(&self, dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, CompileError> {
        let dir = self.absolute(dir);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&dir).map_err(|source| CompileError::Read {
            path: dir.to_string(),
            source,
        })?;

        let mut subjects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CompileError::Read {
                path: dir.to_string(),
                source,
            })?;
            let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
                continue;
            };
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if path.extension() != Some("md")
                || !path.is_file()
                || (!self.files.private_prefix.is_empty()
                    && file_name.starts_with(&self.files.private_prefix))
                || file_name == self.files.spec
                || file_name == self.files.template
            {
                continue;
            }
            subjects.push(path);
        }
        subjects.sort();
        Ok(subjects)
    }

    /// Compile every subject in `dir`, continuing past skips.
    ///
    /// A document that cannot be read or names an invalid pattern is skipped;
    /// output and metadata failures still abort the run.
    pub fn compile_dir(&self, dir: &Utf8Path) -> Result<CompileReport, CompileError> {
        let mut report = CompileReport::default();
        let mut slugs: HashMap<String, String> = HashMap::new();

        for path in self.list_subjects(dir)? {
            let outcome = match self.compile_file(&path) {
                Ok(outcome) => outcome,
                Err(e @ (CompileError::Read { .. } | CompileError::Resolver(_))) => {
                    let path = self.display_path(&path);
                    tracing::warn!(document = %path, error = %e, "Skipping document");
                    CompileOutcome::Skipped {
                        path,
                        reason: SkipReason::Unresolvable {
                            reason: e.to_string(),
                        },
                    }
                }
                Err(e) => return Err(e),
            };
            if let CompileOutcome::Compiled { document, .. } = &outcome
                && let Some(previous) = slugs.insert(document.slug.clone(), document.source.clone())
            {
                tracing::warn!(
                    slug = %document.slug,
                    first = %previous,
                    second = %document.source,
                    "Two documents compile to the same output; the later one wins"
                );
            }
            report.record(outcome);
        }

        Ok(report)
    }

    /// Compile every configured source directory
    pub fn compile_all(&self) -> Result<CompileReport, CompileError> {
        let mut report = CompileReport::default();
        for dir in &self.source_dirs {
            report.merge(self.compile_dir(dir)?);
        }
        tracing::info!(
            compiled = report.compiled.len(),
            skipped = report.skipped.len(),
            "Compile finished"
        );
        Ok(report)
    }
}

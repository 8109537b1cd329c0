//! End-to-end scenarios across the compiler, the cache and the orchestrator.

use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;

use charter::cache::EntryMeta;
use charter::classifier::ClassifierError;
use charter::compiler::SectionKind;
use charter::{
    Classifier, CompileOutcome, Compiler, Config, Orchestrator, ValidateOptions, ValidationCache,
    ValidationResult, fingerprint,
};
use charter_utils::test_support::ProjectFixture;

struct AlwaysPass;

#[async_trait]
impl Classifier for AlwaysPass {
    async fn classify(&self, _doc: &str, _spec: &str) -> Result<String, ClassifierError> {
        Ok("PASS\nMeets the specification.".to_string())
    }
}

fn config(project: &ProjectFixture) -> Config {
    Config::builder()
        .root(project.root().to_path_buf())
        .compile_source_dirs(vec!["agents".to_string()])
        .validate_source_dirs(vec!["agents".to_string(), "responsibilities".to_string()])
        .build()
        .expect("valid config")
}

#[test]
fn reviewer_compiles_to_primary_and_owned_work_only() -> anyhow::Result<()> {
    let project = ProjectFixture::new();
    project.write_doc(
        "agents/reviewer.md",
        "name: \"reviewer\"\nownedWork: [\"responsibilities/review.md\"]",
        "Reviews pull requests.",
    );
    project.write("responsibilities/review.md", "Review PRs.");

    let compiler = Compiler::new(&config(&project));
    let CompileOutcome::Compiled { document, .. } =
        compiler.compile_file(Utf8Path::new("agents/reviewer.md"))?
    else {
        panic!("reviewer should compile");
    };

    let kinds: Vec<_> = document.sections.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SectionKind::Primary, SectionKind::OwnedWork]);
    let owned = document.section(SectionKind::OwnedWork).expect("owned work");
    assert_eq!(owned.items, vec!["Review PRs."]);
    Ok(())
}

#[test]
fn recompiling_unchanged_input_is_byte_identical() -> anyhow::Result<()> {
    let project = ProjectFixture::new();
    project.write_doc(
        "agents/ops.md",
        "name: Ops\ndescription: Runs operations\ncontext: [\"shared/*.md\"]",
        "Operate.",
    );
    project.write("shared/b.md", "B");
    project.write("shared/a.md", "A");

    let compiler = Compiler::new(&config(&project));
    compiler.compile_all()?;
    let first = project.read("dist/agents/ops.md");
    compiler.compile_all()?;
    assert_eq!(project.read("dist/agents/ops.md"), first);
    assert!(first.find("\nA\n").unwrap_or(usize::MAX) < first.find("\nB\n").unwrap_or(0));
    Ok(())
}

#[tokio::test]
async fn validate_all_across_two_domains() -> anyhow::Result<()> {
    let project = ProjectFixture::new();
    project.write("agents/SPEC.md", "Agents must state an owner.");
    project.write("agents/reviewer.md", "Owner: platform team");
    project.write("responsibilities/SPEC.md", "Responsibilities must be verbs.");
    project.write("responsibilities/review.md", "Review PRs.");

    let mut orchestrator = Orchestrator::new(config(&project), Arc::new(AlwaysPass));
    let batch = orchestrator.validate_all(ValidateOptions::default()).await?;

    let s = &batch.summary;
    assert_eq!((s.total, s.compliant, s.warnings, s.errors), (2, 2, 0, 0));
    assert!(!batch.stopped_early);
    assert!(batch.exit_code(true).is_success());
    Ok(())
}

#[tokio::test]
async fn deleting_a_document_orphans_its_entry_but_editing_does_not() -> anyhow::Result<()> {
    let project = ProjectFixture::new();
    project.write("agents/SPEC.md", "spec");
    project.write("agents/kept.md", "v1");
    project.write("agents/gone.md", "v1");

    let config = config(&project);
    let mut orchestrator = Orchestrator::new(config.clone(), Arc::new(AlwaysPass));
    orchestrator.validate_all(ValidateOptions::default()).await?;

    project.write("agents/kept.md", "v2");
    project.remove("agents/gone.md");

    let cache = ValidationCache::new(config.root().to_path_buf(), &config.validate.cache_dir);
    let orphans = cache.orphaned_entries(&config.validate.source_dirs)?;
    let documents: Vec<_> = orphans.iter().map(|o| o.document.as_str()).collect();
    assert_eq!(documents, vec!["agents/gone.md"]);

    let status = orchestrator.status()?;
    assert_eq!(status.tally.stale, 1);
    Ok(())
}

#[test]
fn corrupt_entry_heals_on_checked_read_only() -> anyhow::Result<()> {
    let project = ProjectFixture::new();
    let mut cache = ValidationCache::new(project.root().to_path_buf(), ".charter/cache");
    let fp = fingerprint("doc", "spec");
    let meta = EntryMeta {
        doc_type: "agents".to_string(),
        spec_path: "agents/SPEC.md".to_string(),
    };
    cache.write("agents/a.md", &fp, &ValidationResult::passed("ok"), &meta)?;
    assert_eq!(cache.read("agents/a.md", &fp), Some(ValidationResult::passed("ok")));

    let file = project.write(".charter/cache/agents/a.json", "\u{0}\u{1}not json");
    assert!(cache.read_raw("agents/a.md").is_none());
    assert!(file.exists());
    assert!(cache.read("agents/a.md", &fp).is_none());
    assert!(!file.exists());
    Ok(())
}

//! CLI argument definitions and parsing structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// charter - compile markdown charters and validate them against their specifications
#[derive(Parser, Debug)]
#[command(name = "charter")]
#[command(about = "Compile markdown agent charters and cache their compliance verdicts")]
#[command(long_about = r#"
charter compiles knowledge documents (markdown with a YAML manifest header) into
self-contained outputs, and validates documents against the specification file of
the directory that governs them. Verdicts are cached by content fingerprint.

EXAMPLES:
  # Compile every document in compile.source_dirs
  charter compile

  # Compile a single document
  charter compile agents/reviewer.md

  # Validate one document, or all of them
  charter validate agents/reviewer.md
  charter validate --all

  # CI mode: warnings fail the run too
  charter validate --ci

  # Show cached state without calling the classifier
  charter validate --status

  # Inspect and tidy the verdict cache
  charter cache stats
  charter cache orphans --prune

  # Report manifest patterns that match nothing
  charter doctor

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from --root (or CWD) for .charter/config.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to start configuration discovery from
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override compile.output_dir
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Override validate.cache_dir
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    /// Expand `immutableContext: true` to every document in compile.immutable_dir
    #[arg(long, global = true)]
    pub legacy_immutable_all: bool,

    /// Classifier command line (default: "claude -p")
    #[arg(long = "classifier", global = true)]
    pub classifier_command: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile one document, or every document in the compile source directories
    Compile {
        /// Document to compile (root-relative or absolute)
        file: Option<PathBuf>,
    },

    /// Validate documents against their governing specification
    Validate {
        /// Document to validate (root-relative or absolute)
        #[arg(conflicts_with_all = ["all", "status"])]
        file: Option<PathBuf>,

        /// Validate every document of every domain
        #[arg(long)]
        all: bool,

        /// Validate only this domain (its root-relative directory)
        #[arg(long, conflicts_with = "file")]
        domain: Option<String>,

        /// Strict mode for CI: any non-compliant result fails the run (implies --all)
        #[arg(long)]
        ci: bool,

        /// Stop at the first error-severity result
        #[arg(long)]
        fail_fast: bool,

        /// Ignore cached verdicts (fresh verdicts are still cached)
        #[arg(long)]
        force: bool,

        /// Show cached state of every document without calling the classifier
        #[arg(long, conflicts_with_all = ["force", "fail_fast", "ci"])]
        status: bool,

        /// Emit JSON instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Inspect or maintain the verdict cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Report manifest patterns that match nothing and other reference problems
    Doctor {
        /// Document to check (default: every compile subject)
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// File count, size and per-directory entry counts
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Entries whose document no longer exists in a validation source directory
    Orphans {
        /// Delete the orphaned entries
        #[arg(long)]
        prune: bool,
    },

    /// Delete every cache entry
    Clear,
}

//! charter - compile markdown agent charters and cache their compliance verdicts
//!
//! Knowledge documents are short markdown files with a YAML manifest header.
//! charter does two independent jobs with them:
//!
//! - **Compile**: a subject document's manifest names other documents (owned
//!   work, immutable context, context, references). The compiler inlines
//!   their bodies into one self-contained output, optionally preceded by a
//!   metadata block, and lets output plugins re-wrap it.
//! - **Validate**: every directory holding a specification file is a
//!   validation domain. Each document in a domain is judged against that
//!   specification by an external classifier; verdicts are cached by a
//!   fingerprint of (document, specification) so unchanged pairs are never
//!   judged twice.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Compile every document in compile.source_dirs
//! charter compile
//!
//! # Validate everything, failing on warnings too
//! charter validate --ci
//!
//! # See which verdicts are stale without calling the classifier
//! charter validate --status
//!
//! # Report manifest patterns that match nothing
//! charter doctor
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use charter::{Compiler, Config};
//!
//! let config = Config::builder()
//!     .root("/srv/knowledge")
//!     .compile_source_dirs(vec!["agents".to_string()])
//!     .build()
//!     .expect("valid config");
//! let report = Compiler::new(&config).compile_all().expect("compile");
//! println!("compiled {}", report.compiled.len());
//! ```

pub mod cli;

// ============================================================================
// Public API
// ============================================================================

/// Configuration with precedence CLI > `.charter/config.toml` > defaults.
///
/// Use [`Config::discover()`] for CLI-like behavior or [`Config::builder()`]
/// when embedding.
pub use charter_config::Config;

/// Builder for programmatic configuration.
pub use charter_config::ConfigBuilder;

/// CLI overrides consumed by [`Config::discover()`].
pub use charter_config::CliArgs;

/// Library-level error type.
///
/// Library code returns errors and never calls `std::process::exit()`; the
/// CLI maps them with [`to_exit_code()`](CharterError::to_exit_code).
pub use charter_utils::error::CharterError;

/// Exit codes matching the documented exit code table.
pub use charter_utils::exit_codes::ExitCode;

pub use charter_utils::error::{ErrorCategory, UserFriendlyError};
pub use charter_utils::types::{Severity, ValidationResult};

pub use charter_cache::{ValidationCache, fingerprint};
pub use charter_classifier::{Classifier, CommandClassifier, Verdict, parse_verdict};
pub use charter_compiler::{CompileOutcome, CompileReport, Compiler, OutputPlugin};
pub use charter_validation::{BatchReport, Orchestrator, StatusReport, ValidateOptions};

// ============================================================================
// Component crates
// ============================================================================

#[doc(hidden)]
pub use charter_cache as cache;
#[doc(hidden)]
pub use charter_classifier as classifier;
#[doc(hidden)]
pub use charter_compiler as compiler;
#[doc(hidden)]
pub use charter_config as config;
#[doc(hidden)]
pub use charter_manifest as manifest;
#[doc(hidden)]
pub use charter_resolver as resolver;
#[doc(hidden)]
pub use charter_validation as validation;
#[doc(hidden)]
pub use charter_utils::{atomic_write, error, exit_codes, logging, paths, types};

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub use charter_utils::test_support;

use std::fmt;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type for charter operations.
///
/// Only fatal conditions surface as `CharterError`. Skips, cache misses,
/// self-healed corruption and per-document classifier failures are recovered
/// locally and recorded in the relevant report type instead.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors, unknown validation domain |
/// | 70 | Classifier collaborator failure |
/// | 1 | Other errors |
///
/// Library code returns `CharterError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum CharterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference resolution error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Compilation,
    FileSystem,
    Classifier,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Compilation => write!(f, "Compilation"),
            Self::FileSystem => write!(f, "File System"),
            Self::Classifier => write!(f, "Classifier"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

/// Errors raised while expanding reference patterns
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Invalid reference pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal compile errors (skips are not errors, see `CompileOutcome`)
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write compiled output {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to render metadata for {path}: {reason}")]
    Metadata { path: String, reason: String },

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// Validation cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to serialize cache entry for {path}: {reason}")]
    Serialize { path: String, reason: String },

    #[error("Serialized cache entry for {path} did not parse back: {reason}")]
    VerifyFailed { path: String, reason: String },

    #[error("Failed to write cache entry {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Cache IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the external classifier collaborator
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier response starts with unrecognized verdict token '{token}'")]
    UnrecognizedVerdict { token: String },

    #[error("Classifier returned an empty response")]
    EmptyResponse,

    #[error("Classifier command '{command}' not found")]
    CommandNotFound { command: String },

    #[error("Classifier command exited with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    #[error("Classifier misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Classifier IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal batch-validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unknown validation domain '{name}'")]
    UnknownDomain {
        name: String,
        available: Vec<String>,
    },

    #[error("No specification governs {path}")]
    NoDomain { path: String },

    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CharterError {
    /// Map the error to the documented CLI exit code
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Validation(
                ValidationError::UnknownDomain { .. }
                | ValidationError::NoDomain { .. }
                | ValidationError::DocumentNotFound { .. },
            ) => ExitCode::CLI_ARGS,
            Self::Classifier(_) => ExitCode::CLASSIFIER_FAILURE,
            _ => ExitCode::INTERNAL,
        }
    }

    /// Render a multi-line message with context and suggestions for terminals
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut out = format!("error[{}]: {}", self.category(), self.user_message());
        if let Some(context) = self.context() {
            out.push_str(&format!("\n  context: {context}"));
        }
        for suggestion in self.suggestions() {
            out.push_str(&format!("\n  hint: {suggestion}"));
        }
        out
    }
}

impl UserFriendlyError for CharterError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Validation(err) => err.user_message(),
            Self::Classifier(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Validation(err) => err.context(),
            Self::Classifier(err) => err.context(),
            Self::Cache(_) => Some("The validation cache directory may be read-only".to_string()),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Validation(err) => err.suggestions(),
            Self::Classifier(err) => err.suggestions(),
            Self::Resolver(ResolverError::InvalidPattern { .. }) => {
                vec!["Check the glob syntax in the document's manifest".to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Resolver(_) | Self::Compile(_) => ErrorCategory::Compilation,
            Self::Cache(_) | Self::Io(_) => ErrorCategory::FileSystem,
            Self::Classifier(_) => ErrorCategory::Classifier,
            Self::Validation(_) => ErrorCategory::Validation,
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => format!("Configuration file has invalid format: {reason}"),
            Self::MissingRequired(key) => format!("Required configuration '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) | Self::InvalidValue { .. } => {
                Some("Configuration is read from .charter/config.toml".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Check the path passed to --config".to_string(),
                "Omit --config to use discovery from the current directory".to_string(),
            ],
            Self::InvalidFile(_) => vec!["Validate the TOML syntax of the config file".to_string()],
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for ValidationError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UnknownDomain { available, .. } if !available.is_empty() => {
                Some(format!("Known domains: {}", available.join(", ")))
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownDomain { .. } => {
                vec!["Run `charter validate --status` to list discovered domains".to_string()]
            }
            Self::NoDomain { .. } => vec![
                "Add a specification file to the document's directory".to_string(),
                "Check validate.source_dirs in the config".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl UserFriendlyError for ClassifierError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UnrecognizedVerdict { .. } => {
                Some("Responses must begin with PASS, WARN or FAIL".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CommandNotFound { .. } => {
                vec!["Install the classifier CLI or set classifier.command".to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Classifier
    }
}

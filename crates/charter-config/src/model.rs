use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default name of the per-directory specification file
pub const DEFAULT_SPEC_FILE: &str = "SPEC.md";
/// Default name of the template-placeholder file
pub const DEFAULT_TEMPLATE_FILE: &str = "TEMPLATE.md";
/// Filenames starting with this prefix are private and never validated
pub const DEFAULT_PRIVATE_PREFIX: &str = "_";
/// Directory globbed by the legacy `immutableContext: true` form
pub const DEFAULT_IMMUTABLE_DIR: &str = "immutable";
/// Cache directory, relative to the project root
pub const DEFAULT_CACHE_DIR: &str = ".charter/cache";
/// Directory that marks a project root and holds `config.toml`
pub const CONFIG_DIR_NAME: &str = ".charter";
/// Default classifier command line
pub const DEFAULT_CLASSIFIER_COMMAND: &str = "claude -p";

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    ConfigFile(Utf8PathBuf),
    Cli,
    Programmatic,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => write!(f, "default"),
            Self::ConfigFile(path) => write!(f, "config ({path})"),
            Self::Cli => write!(f, "cli"),
            Self::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// Configuration for charter operations.
///
/// Use [`Config::discover_from()`] for CLI-like behavior or
/// [`Config::builder()`] when embedding.
///
/// ```toml
/// [files]
/// spec = "SPEC.md"
/// template = "TEMPLATE.md"
/// private_prefix = "_"
///
/// [compile]
/// source_dirs = ["agents"]
/// output_dir = "dist/agents"
/// immutable_dir = "immutable"
/// legacy_immutable_all = false
/// plugin_dirs = [".claude/agents"]
///
/// [validate]
/// source_dirs = ["agents", "responsibilities"]
/// cache_dir = ".charter/cache"
/// fail_fast = false
///
/// [classifier]
/// command = "claude -p"
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root; every relative path below resolves against it
    pub root: Utf8PathBuf,
    /// Config file that was loaded, if any
    pub config_path: Option<Utf8PathBuf>,
    pub files: FilesConfig,
    pub compile: CompileConfig,
    pub validate: ValidateConfig,
    pub classifier: ClassifierConfig,
    pub verbose: bool,
    /// Source attribution for each setting (for status display)
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// Designated filenames shared by the resolver, compiler and orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    pub spec: String,
    pub template: String,
    pub private_prefix: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            spec: DEFAULT_SPEC_FILE.to_string(),
            template: DEFAULT_TEMPLATE_FILE.to_string(),
            private_prefix: DEFAULT_PRIVATE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Root-relative directories holding subject documents
    pub source_dirs: Vec<String>,
    /// Root-relative directory compiled documents are written to
    pub output_dir: String,
    /// Directory expanded by the legacy boolean immutable-context form
    pub immutable_dir: String,
    /// Expand legacy `immutableContext: true` to every file in `immutable_dir`
    pub legacy_immutable_all: bool,
    /// Extra directories that receive plugin-wrapped agent files
    pub plugin_dirs: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec!["agents".to_string()],
            output_dir: "dist/agents".to_string(),
            immutable_dir: DEFAULT_IMMUTABLE_DIR.to_string(),
            legacy_immutable_all: false,
            plugin_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateConfig {
    /// Root-relative directories scanned for validation domains, in order
    pub source_dirs: Vec<String>,
    /// Root-relative cache directory
    pub cache_dir: String,
    pub fail_fast: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec!["agents".to_string()],
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Shell-style command line; the prompt is written to its stdin
    pub command: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_CLASSIFIER_COMMAND.to_string(),
        }
    }
}

impl Config {
    /// Absolute output directory for compiled documents
    #[must_use]
    pub fn output_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.compile.output_dir)
    }

    /// Absolute cache directory
    #[must_use]
    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.validate.cache_dir)
    }

    /// Absolute plugin output directories
    #[must_use]
    pub fn plugin_dirs(&self) -> Vec<Utf8PathBuf> {
        self.compile
            .plugin_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    /// Absolute compile source directories
    #[must_use]
    pub fn compile_source_dirs(&self) -> Vec<Utf8PathBuf> {
        self.compile
            .source_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

// ---------------------------------------------------------------------------
// TOML file layer: every field optional so files override defaults piecemeal
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub files: Option<TomlFiles>,
    pub compile: Option<TomlCompile>,
    pub validate: Option<TomlValidate>,
    pub classifier: Option<TomlClassifier>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlFiles {
    pub spec: Option<String>,
    pub template: Option<String>,
    pub private_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlCompile {
    pub source_dirs: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub immutable_dir: Option<String>,
    pub legacy_immutable_all: Option<bool>,
    pub plugin_dirs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlValidate {
    pub source_dirs: Option<Vec<String>>,
    pub cache_dir: Option<String>,
    pub fail_fast: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlClassifier {
    pub command: Option<String>,
}

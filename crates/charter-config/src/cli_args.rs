use std::path::PathBuf;

/// CLI overrides applied on top of the config file during discovery
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file (skips upward discovery)
    pub config_path: Option<PathBuf>,
    /// Explicit project root
    pub root: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub output_dir: Option<String>,
    pub cache_dir: Option<String>,
    pub fail_fast: Option<bool>,
    pub legacy_immutable_all: Option<bool>,
    pub classifier_command: Option<String>,
}

use camino::Utf8PathBuf;
use std::collections::HashMap;

use charter_utils::error::{CharterError, ConfigError};

use super::{
    ClassifierConfig, CompileConfig, Config, ConfigSource, FilesConfig, ValidateConfig,
};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use charter_config::Config;
    ///
    /// let config = Config::builder()
    ///     .root("/srv/knowledge")
    ///     .compile_source_dirs(vec!["agents".to_string()])
    ///     .cache_dir(".cache/verdicts")
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.cache_dir().as_str(), "/srv/knowledge/.cache/verdicts");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of charter.
///
/// The project root is required: there is no fallback to the process working
/// directory. All values set via the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    root: Option<Utf8PathBuf>,
    files: FilesConfig,
    compile: CompileConfig,
    validate: ValidateConfig,
    classifier: ClassifierConfig,
    verbose: bool,
    touched: Vec<&'static str>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn spec_file(mut self, name: impl Into<String>) -> Self {
        self.files.spec = name.into();
        self.touched.push("files.spec");
        self
    }

    #[must_use]
    pub fn template_file(mut self, name: impl Into<String>) -> Self {
        self.files.template = name.into();
        self.touched.push("files.template");
        self
    }

    #[must_use]
    pub fn private_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.files.private_prefix = prefix.into();
        self.touched.push("files.private_prefix");
        self
    }

    #[must_use]
    pub fn compile_source_dirs(mut self, dirs: Vec<String>) -> Self {
        self.compile.source_dirs = dirs;
        self.touched.push("compile.source_dirs");
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.compile.output_dir = dir.into();
        self.touched.push("compile.output_dir");
        self
    }

    #[must_use]
    pub fn immutable_dir(mut self, dir: impl Into<String>) -> Self {
        self.compile.immutable_dir = dir.into();
        self.touched.push("compile.immutable_dir");
        self
    }

    #[must_use]
    pub fn legacy_immutable_all(mut self, enabled: bool) -> Self {
        self.compile.legacy_immutable_all = enabled;
        self.touched.push("compile.legacy_immutable_all");
        self
    }

    #[must_use]
    pub fn plugin_dirs(mut self, dirs: Vec<String>) -> Self {
        self.compile.plugin_dirs = dirs;
        self.touched.push("compile.plugin_dirs");
        self
    }

    #[must_use]
    pub fn validate_source_dirs(mut self, dirs: Vec<String>) -> Self {
        self.validate.source_dirs = dirs;
        self.touched.push("validate.source_dirs");
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<String>) -> Self {
        self.validate.cache_dir = dir.into();
        self.touched.push("validate.cache_dir");
        self
    }

    #[must_use]
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.validate.fail_fast = enabled;
        self.touched.push("validate.fail_fast");
        self
    }

    #[must_use]
    pub fn classifier_command(mut self, command: impl Into<String>) -> Self {
        self.classifier.command = command.into();
        self.touched.push("classifier.command");
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config, CharterError> {
        let root = self.root.ok_or_else(|| {
            CharterError::Config(ConfigError::MissingRequired("root".to_string()))
        })?;

        let mut source_attribution = HashMap::new();
        for key in self.touched {
            source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
        }

        let mut config = Config {
            root,
            config_path: None,
            files: self.files,
            compile: self.compile,
            validate: self.validate,
            classifier: self.classifier,
            verbose: self.verbose,
            source_attribution,
        };
        config.validate_settings()?;
        config.normalize_dirs();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_root() {
        let err = Config::builder().build().unwrap_err();
        assert!(matches!(
            err,
            CharterError::Config(ConfigError::MissingRequired(ref key)) if key == "root"
        ));
    }

    #[test]
    fn test_builder_attributes_programmatic_sources() {
        let config = Config::builder()
            .root("/p")
            .fail_fast(true)
            .spec_file("RULES.md")
            .build()
            .unwrap();
        assert!(config.validate.fail_fast);
        assert_eq!(
            config.source_attribution.get("validate.fail_fast"),
            Some(&ConfigSource::Programmatic)
        );
        assert_eq!(config.files.spec, "RULES.md");
        assert!(config.source_attribution.get("classifier.command").is_none());
    }
}

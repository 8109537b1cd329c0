use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

use charter_utils::error::{CharterError, ConfigError};

use super::model::{
    CONFIG_DIR_NAME, ClassifierConfig, CompileConfig, Config, ConfigSource, FilesConfig,
    TomlConfig, ValidateConfig,
};
use super::CliArgs;

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory as the discovery start point unless
    /// `cli_args.root` is set.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = match &cli_args.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &std::path::Path, cli_args: &CliArgs) -> Result<Self> {
        let start_dir = Utf8PathBuf::try_from(start_dir.to_path_buf())
            .context("Start directory is not valid UTF-8")?;
        // The root is always absolute
        let start_dir = if start_dir.is_relative() {
            let cwd = Utf8PathBuf::try_from(
                std::env::current_dir().context("Failed to get current directory")?,
            )
            .context("Current directory is not valid UTF-8")?;
            cwd.join(start_dir)
        } else {
            start_dir
        };

        let mut source_attribution = HashMap::new();
        let mut files = FilesConfig::default();
        let mut compile = CompileConfig::default();
        let mut validate = ValidateConfig::default();
        let mut classifier = ClassifierConfig::default();
        let mut verbose = false;

        for key in [
            "files.spec",
            "files.template",
            "files.private_prefix",
            "compile.source_dirs",
            "compile.output_dir",
            "compile.immutable_dir",
            "compile.legacy_immutable_all",
            "compile.plugin_dirs",
            "validate.source_dirs",
            "validate.cache_dir",
            "validate.fail_fast",
            "classifier.command",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                let explicit = Utf8PathBuf::try_from(explicit.clone())
                    .context("Config path is not valid UTF-8")?;
                if !explicit.exists() {
                    return Err(CharterError::Config(ConfigError::NotFound {
                        path: explicit.to_string(),
                    })
                    .into());
                }
                Some(explicit)
            }
            None => Self::discover_config_file_from(&start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let src = ConfigSource::ConfigFile(path.clone());

            macro_rules! apply {
                ($section:expr, $target:expr, $field:ident, $key:literal) => {
                    if let Some(value) = $section.$field {
                        $target.$field = value;
                        source_attribution.insert($key.to_string(), src.clone());
                    }
                };
            }

            if let Some(f) = file_config.files {
                apply!(f, files, spec, "files.spec");
                apply!(f, files, template, "files.template");
                apply!(f, files, private_prefix, "files.private_prefix");
            }
            if let Some(c) = file_config.compile {
                apply!(c, compile, source_dirs, "compile.source_dirs");
                apply!(c, compile, output_dir, "compile.output_dir");
                apply!(c, compile, immutable_dir, "compile.immutable_dir");
                apply!(c, compile, legacy_immutable_all, "compile.legacy_immutable_all");
                apply!(c, compile, plugin_dirs, "compile.plugin_dirs");
            }
            if let Some(v) = file_config.validate {
                apply!(v, validate, source_dirs, "validate.source_dirs");
                apply!(v, validate, cache_dir, "validate.cache_dir");
                apply!(v, validate, fail_fast, "validate.fail_fast");
            }
            if let Some(c) = file_config.classifier {
                apply!(c, classifier, command, "classifier.command");
            }
        }

        // CLI overrides (highest priority)
        if let Some(v) = cli_args.verbose {
            verbose = v;
        }
        if let Some(dir) = &cli_args.output_dir {
            compile.output_dir = dir.clone();
            source_attribution.insert("compile.output_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(dir) = &cli_args.cache_dir {
            validate.cache_dir = dir.clone();
            source_attribution.insert("validate.cache_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(fail_fast) = cli_args.fail_fast {
            validate.fail_fast = fail_fast;
            source_attribution.insert("validate.fail_fast".to_string(), ConfigSource::Cli);
        }
        if let Some(legacy) = cli_args.legacy_immutable_all {
            compile.legacy_immutable_all = legacy;
            source_attribution.insert(
                "compile.legacy_immutable_all".to_string(),
                ConfigSource::Cli,
            );
        }
        if let Some(command) = &cli_args.classifier_command {
            classifier.command = command.clone();
            source_attribution.insert("classifier.command".to_string(), ConfigSource::Cli);
        }

        // Root: explicit --root, else the directory owning `.charter/`, else start dir
        let root = match (&cli_args.root, &config_path) {
            (Some(_), _) => start_dir.clone(),
            (None, Some(path)) => Self::root_for_config_file(path).unwrap_or(start_dir.clone()),
            (None, None) => start_dir.clone(),
        };

        let mut config = Config {
            root,
            config_path,
            files,
            compile,
            validate,
            classifier,
            verbose,
            source_attribution,
        };

        config.validate_settings()?;
        config.normalize_dirs();

        tracing::debug!(
            root = %config.root,
            config_file = ?config.config_path,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Search upward for `.charter/config.toml`, stopping at a repository root
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR_NAME).join("config.toml");
            if candidate.is_file() {
                return Some(candidate);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() {
                break;
            }
            current = dir.parent();
        }

        None
    }

    /// `<root>/.charter/config.toml` -> `<root>`
    fn root_for_config_file(path: &Utf8Path) -> Option<Utf8PathBuf> {
        let dir = path.parent()?;
        if dir.file_name() == Some(CONFIG_DIR_NAME) {
            dir.parent().map(Utf8Path::to_path_buf)
        } else {
            Some(dir.to_path_buf())
        }
    }

    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        toml::from_str(&content).map_err(|e| {
            CharterError::Config(ConfigError::InvalidFile(format!("{path}: {e}"))).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_utils::test_support::ProjectFixture;

    #[test]
    fn test_defaults_without_config_file() -> Result<()> {
        let project = ProjectFixture::new();
        let config = Config::discover_from(project.root().as_std_path(), &CliArgs::default())?;

        assert_eq!(config.root, project.root());
        assert!(config.config_path.is_none());
        assert_eq!(config.files.spec, "SPEC.md");
        assert_eq!(config.validate.cache_dir, ".charter/cache");
        assert_eq!(
            config.source_attribution.get("files.spec"),
            Some(&ConfigSource::Defaults)
        );
        Ok(())
    }

    #[test]
    fn test_config_file_overrides_defaults_and_sets_root() -> Result<()> {
        let project = ProjectFixture::new();
        project.write(
            ".charter/config.toml",
            r#"
[files]
spec = "RULES.md"

[compile]
source_dirs = ["roles"]
legacy_immutable_all = true

[validate]
source_dirs = ["roles", "duties"]
fail_fast = true
"#,
        );
        project.write("roles/nested/.keep", "");

        let start = project.path("roles/nested");
        let config = Config::discover_from(start.as_std_path(), &CliArgs::default())?;

        assert_eq!(config.root, project.root());
        assert_eq!(config.files.spec, "RULES.md");
        assert_eq!(config.files.template, "TEMPLATE.md");
        assert_eq!(config.compile.source_dirs, vec!["roles"]);
        assert!(config.compile.legacy_immutable_all);
        assert_eq!(config.validate.source_dirs, vec!["roles", "duties"]);
        assert!(config.validate.fail_fast);
        assert!(matches!(
            config.source_attribution.get("files.spec"),
            Some(ConfigSource::ConfigFile(_))
        ));
        Ok(())
    }

    #[test]
    fn test_relative_start_dir_becomes_absolute_root() -> Result<()> {
        let config = Config::discover_from(
            std::path::Path::new("charter-missing-start/site"),
            &CliArgs::default(),
        )?;
        assert!(config.root.is_absolute());
        assert!(config.root.ends_with("charter-missing-start/site"));
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> Result<()> {
        let project = ProjectFixture::new();
        project.write(".charter/config.toml", "[validate]\nfail_fast = true\n");

        let cli = CliArgs {
            fail_fast: Some(false),
            cache_dir: Some("tmp/cache".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_from(project.root().as_std_path(), &cli)?;

        assert!(!config.validate.fail_fast);
        assert_eq!(config.cache_dir(), project.path("tmp/cache"));
        assert_eq!(
            config.source_attribution.get("validate.fail_fast"),
            Some(&ConfigSource::Cli)
        );
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let project = ProjectFixture::new();
        project.write(".charter/config.toml", "[compile\nsource_dirs = 3");

        let err = Config::discover_from(project.root().as_std_path(), &CliArgs::default())
            .unwrap_err();
        let charter_err = err.downcast_ref::<CharterError>().expect("typed error");
        assert!(matches!(
            charter_err,
            CharterError::Config(ConfigError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let project = ProjectFixture::new();
        project.write(".charter/config.toml", "[compile]\nsource_dir = [\"a\"]\n");

        assert!(Config::discover_from(project.root().as_std_path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn test_explicit_missing_config_path() {
        let project = ProjectFixture::new();
        let cli = CliArgs {
            config_path: Some(project.path("nope.toml").into_std_path_buf()),
            ..CliArgs::default()
        };
        let err = Config::discover_from(project.root().as_std_path(), &cli).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}

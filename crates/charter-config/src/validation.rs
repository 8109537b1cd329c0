use charter_utils::error::{CharterError, ConfigError};
use charter_utils::paths::{is_contained_relative, normalize_relative};

use super::Config;

fn invalid(key: &str, value: impl Into<String>) -> CharterError {
    CharterError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values
    pub fn validate_settings(&self) -> Result<(), CharterError> {
        for (key, name) in [
            ("files.spec", &self.files.spec),
            ("files.template", &self.files.template),
        ] {
            if name.trim().is_empty() {
                return Err(invalid(key, "must not be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(invalid(key, format!("'{name}' must be a bare filename")));
            }
        }
        if self.files.spec == self.files.template {
            return Err(invalid(
                "files.template",
                "must differ from files.spec",
            ));
        }

        if self.compile.source_dirs.is_empty() {
            return Err(CharterError::Config(ConfigError::MissingRequired(
                "compile.source_dirs".to_string(),
            )));
        }
        if self.validate.source_dirs.is_empty() {
            return Err(CharterError::Config(ConfigError::MissingRequired(
                "validate.source_dirs".to_string(),
            )));
        }

        let dir_lists = [
            ("compile.source_dirs", &self.compile.source_dirs),
            ("compile.plugin_dirs", &self.compile.plugin_dirs),
            ("validate.source_dirs", &self.validate.source_dirs),
        ];
        for (key, dirs) in dir_lists {
            for dir in dirs {
                if !is_contained_relative(dir) {
                    return Err(invalid(
                        key,
                        format!("'{dir}' must be relative to the project root"),
                    ));
                }
            }
        }

        for (key, dir) in [
            ("compile.output_dir", &self.compile.output_dir),
            ("compile.immutable_dir", &self.compile.immutable_dir),
            ("validate.cache_dir", &self.validate.cache_dir),
        ] {
            if dir.trim().is_empty() || !is_contained_relative(dir) {
                return Err(invalid(
                    key,
                    format!("'{dir}' must be a non-empty path relative to the project root"),
                ));
            }
        }

        match shell_words::split(&self.classifier.command) {
            Ok(words) if words.first().is_some_and(|program| !program.is_empty()) => {}
            Ok(_) => return Err(invalid("classifier.command", "must not be empty")),
            Err(e) => {
                return Err(invalid(
                    "classifier.command",
                    format!("'{}' is not a valid command line: {e}", self.classifier.command),
                ));
            }
        }

        Ok(())
    }

    /// Rewrite directory lists to their canonical root-relative spelling.
    ///
    /// Runs after validation so error messages quote what the user wrote.
    pub(crate) fn normalize_dirs(&mut self) {
        for dirs in [
            &mut self.compile.source_dirs,
            &mut self.compile.plugin_dirs,
            &mut self.validate.source_dirs,
        ] {
            for dir in dirs.iter_mut() {
                *dir = normalize_relative(dir);
            }
        }
    }
}

//! Atomic file writes: temp file in the target directory, fsync, rename.
//!
//! Readers never observe a half-written file. Concurrent writers to the same
//! path race last-writer-wins.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::Write;
use tempfile::NamedTempFile;

/// Atomically write `content` to `path`, creating parent directories.
///
/// Line endings are normalized to LF so repeated writes of the same logical
/// content are byte-identical across platforms.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let normalized = normalize_line_endings(content);

    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    crate::paths::ensure_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {parent}"))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {parent}"))?;

    temp_file
        .write_all(normalized.as_bytes())
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    temp_file
        .persist(path.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(())
}

/// Normalize CRLF and lone CR to LF
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
    if !content.contains('\r') {
        return content.to_string();
    }
    content.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_write_creates_parent_directories() -> Result<()> {
        let temp = TempDir::new()?;
        let target = utf8_root(&temp).join("a/b/c.json");

        write_file_atomic(&target, "{}")?;

        assert_eq!(std::fs::read_to_string(&target)?, "{}");
        Ok(())
    }

    #[test]
    fn test_write_overwrites_existing_file() -> Result<()> {
        let temp = TempDir::new()?;
        let target = utf8_root(&temp).join("out.md");

        write_file_atomic(&target, "first")?;
        write_file_atomic(&target, "second")?;

        assert_eq!(std::fs::read_to_string(&target)?, "second");
        Ok(())
    }

    #[test]
    fn test_write_leaves_no_temp_files() -> Result<()> {
        let temp = TempDir::new()?;
        let root = utf8_root(&temp);
        write_file_atomic(&root.join("only.md"), "x")?;

        let names: Vec<_> = std::fs::read_dir(&root)?
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["only.md".to_string()]);
        Ok(())
    }

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    proptest::proptest! {
        #[test]
        fn prop_normalized_text_has_no_carriage_returns(text in ".*") {
            let once = normalize_line_endings(&text);
            proptest::prop_assert!(!once.contains('\r'));
            proptest::prop_assert_eq!(normalize_line_endings(&once), once.clone());
        }
    }
}

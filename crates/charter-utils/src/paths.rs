//! Path helpers shared by the resolver, the cache and the orchestrator.
//!
//! Paths handed between crates are root-relative and `/`-separated so cache
//! keys and compiled output are identical across platforms.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Create a directory and all parents, ignoring benign races with other processes
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> io::Result<()> {
    match fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursively list every regular file under `dir`, sorted.
///
/// A missing directory yields an empty list. Symlinked directories are not
/// followed; symlinks to files are listed. Entries below `dir` that cannot be
/// read or whose names are not UTF-8 are skipped with a warning; only a
/// failure to read `dir` itself is an error.
pub fn walk_files(dir: &Utf8Path) -> io::Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            walk_entry(entry, &mut files);
        }
    }
    files.sort();
    Ok(files)
}

fn walk_entry(entry: io::Result<fs::DirEntry>, files: &mut Vec<Utf8PathBuf>) {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unreadable directory entry");
            return;
        }
    };
    let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
        tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 path");
        return;
    };
    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Skipping unreadable entry");
            return;
        }
    };

    if file_type.is_dir() {
        match fs::read_dir(&path) {
            Ok(entries) => {
                for entry in entries {
                    walk_entry(entry, files);
                }
            }
            Err(e) => tracing::warn!(path = %path, error = %e, "Skipping unreadable directory"),
        }
    } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
        files.push(path);
    }
}

/// Express `path` relative to `root` with `/` separators.
///
/// Returns `None` when `path` is not under `root`.
#[must_use]
pub fn relative_slash(root: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(to_slash(rel))
}

/// Join path components with `/` regardless of platform
#[must_use]
pub fn to_slash(path: &Utf8Path) -> String {
    path.components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject absolute paths and paths that climb out of the root with `..`
#[must_use]
pub fn is_contained_relative(path: &str) -> bool {
    let p = Utf8Path::new(path);
    !p.is_absolute()
        && !p
            .components()
            .any(|c| matches!(c, camino::Utf8Component::ParentDir))
}

/// Canonical spelling of a root-relative directory: `/`-separated, no `.`
/// components, no trailing separator. The root itself is `.`.
#[must_use]
pub fn normalize_relative(path: &str) -> String {
    let joined = Utf8Path::new(path)
        .components()
        .filter(|c| !matches!(c, camino::Utf8Component::CurDir))
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() { ".".to_string() } else { joined }
}

/// Whether a root-relative `/`-separated path lies inside `dir` (or is `dir`).
///
/// `dir` is normalized first, so `./agents/` and `agents` behave the same.
#[must_use]
pub fn is_within_dir(path: &str, dir: &str) -> bool {
    let dir = normalize_relative(dir);
    dir == "." || path == dir || path.strip_prefix(dir.as_str()).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_walk_files_sorted_and_recursive() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf())?;
        fs::create_dir_all(root.join("b/nested"))?;
        fs::create_dir_all(root.join("a"))?;
        fs::write(root.join("b/nested/z.md"), "z")?;
        fs::write(root.join("a/y.md"), "y")?;
        fs::write(root.join("x.md"), "x")?;

        let rels: Vec<String> = walk_files(&root)?
            .iter()
            .map(|p| relative_slash(&root, p).unwrap())
            .collect();
        assert_eq!(rels, vec!["a/y.md", "b/nested/z.md", "x.md"]);
        Ok(())
    }

    #[test]
    fn test_walk_missing_dir_is_empty() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf())?;
        assert!(walk_files(&root.join("absent"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_relative_slash_outside_root() {
        assert_eq!(
            relative_slash(Utf8Path::new("/a/b"), Utf8Path::new("/a/b/c/d.md")),
            Some("c/d.md".to_string())
        );
        assert_eq!(
            relative_slash(Utf8Path::new("/a/b"), Utf8Path::new("/x/d.md")),
            None
        );
    }

    #[test]
    fn test_is_contained_relative() {
        assert!(is_contained_relative("agents"));
        assert!(is_contained_relative("docs/agents"));
        assert!(!is_contained_relative("../agents"));
        assert!(!is_contained_relative("/etc"));
    }

    #[test]
    fn test_normalize_relative_strips_dot_and_trailing_slash() {
        assert_eq!(normalize_relative("./agents/"), "agents");
        assert_eq!(normalize_relative("docs/./agents"), "docs/agents");
        assert_eq!(normalize_relative("agents"), "agents");
        assert_eq!(normalize_relative("."), ".");
        assert_eq!(normalize_relative("./"), ".");
        assert_eq!(normalize_relative(""), ".");
    }

    #[test]
    fn test_is_within_dir() {
        assert!(is_within_dir("agents/a.md", "./agents"));
        assert!(is_within_dir("agents/team/a.md", "agents/"));
        assert!(is_within_dir("agents", "agents"));
        assert!(is_within_dir("anything/at/all.md", "."));
        assert!(!is_within_dir("agentsx/a.md", "agents"));
        assert!(!is_within_dir("other/a.md", "./agents"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_non_utf8_names() -> anyhow::Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new()?;
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf())?;
        fs::create_dir_all(root.join("docs"))?;
        fs::write(root.join("docs/good.md"), "ok")?;
        let bad = temp.path().join("docs").join(OsStr::from_bytes(b"bad\xff.md"));
        if fs::write(&bad, "x").is_err() {
            // Some filesystems refuse non-UTF-8 names outright
            return Ok(());
        }

        let rels: Vec<String> = walk_files(&root)?
            .iter()
            .filter_map(|p| relative_slash(&root, p))
            .collect();
        assert_eq!(rels, vec!["docs/good.md"]);
        Ok(())
    }
}

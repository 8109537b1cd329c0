//! Test fixtures shared across charter crates.
//!
//! Enabled for dependents through the `test-utils` feature.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A throwaway project tree rooted in a temp directory
pub struct ProjectFixture {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl ProjectFixture {
    /// Create an empty project root
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created or is not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 temp path");
        Self { _temp: temp, root }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of a root-relative file
    #[must_use]
    pub fn path(&self, rel: &str) -> Utf8PathBuf {
        self.root.join(rel)
    }

    /// Write a file, creating parent directories
    ///
    /// # Panics
    ///
    /// Panics on IO failure.
    pub fn write(&self, rel: &str, content: &str) -> Utf8PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Write a document with a YAML manifest header
    pub fn write_doc(&self, rel: &str, manifest: &str, body: &str) -> Utf8PathBuf {
        self.write(rel, &format!("---\n{manifest}\n---\n{body}"))
    }

    /// Read a file relative to the root
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read fixture file")
    }

    /// Delete a file relative to the root
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be removed.
    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.root.join(rel)).expect("remove fixture file");
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

//! Output plugins re-wrap a compiled document for another consumer.
//!
//! The compiler hands each plugin the assembled body (no metadata block), the
//! optional metadata record and the slug. The plugin returns an artifact and
//! the compiler writes it.

use anyhow::{Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::metadata::AgentMetadata;

/// What a plugin receives for one compiled document
#[derive(Debug, Clone, Copy)]
pub struct PluginInput<'a> {
    pub body: &'a str,
    pub metadata: Option<&'a AgentMetadata>,
    pub slug: &'a str,
}

/// A file a plugin wants written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginArtifact {
    pub path: Utf8PathBuf,
    pub content: String,
}

pub trait OutputPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, input: &PluginInput<'_>) -> Result<PluginArtifact>;
}

/// Writes `<dir>/<slug>.md` in the agent-directory format: front matter
/// carrying the metadata record, then the body.
#[derive(Debug, Clone)]
pub struct AgentDirPlugin {
    dir: Utf8PathBuf,
}

impl AgentDirPlugin {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

impl OutputPlugin for AgentDirPlugin {
    fn name(&self) -> &str {
        "agent-dir"
    }

    fn render(&self, input: &PluginInput<'_>) -> Result<PluginArtifact> {
        let Some(metadata) = input.metadata else {
            bail!(
                "'{}' has no description; agent files require name and description",
                input.slug
            );
        };

        let front_matter = metadata.to_front_matter()?;
        Ok(PluginArtifact {
            path: self.dir.join(format!("{}.md", input.slug)),
            content: format!("{front_matter}\n{}\n", input.body.trim_end()),
        })
    }
}

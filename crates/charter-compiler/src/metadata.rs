use charter_manifest::{Manifest, ManifestValue};
use serde::Serialize;

use crate::fields;

/// Agent metadata emitted as YAML front matter on compiled output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentMetadata {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "permissionMode", skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
}

impl AgentMetadata {
    /// Built only when the manifest carries an explicit description
    #[must_use]
    pub fn from_manifest(name: &str, manifest: &Manifest) -> Option<Self> {
        let description = manifest.string(fields::DESCRIPTION)?;
        Some(Self {
            name: name.to_string(),
            description,
            tools: tool_list(manifest),
            model: manifest.string(fields::MODEL),
            permission_mode: manifest.string(fields::PERMISSION_MODE),
        })
    }

    /// `---` fenced YAML block ending in a newline
    pub fn to_front_matter(&self) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(self)?;
        let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);
        Ok(format!("---\n{yaml}---\n"))
    }
}

/// `tools` may be written as a comma-separated string or a list
fn tool_list(manifest: &Manifest) -> Option<String> {
    match manifest.get(fields::TOOLS) {
        ManifestValue::Scalar(s) if !s.trim().is_empty() => Some(s),
        ManifestValue::Sequence(items) if !items.is_empty() => Some(items.join(", ")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_manifest::parse_document;

    fn manifest(header: &str) -> Manifest {
        parse_document(&format!("---\n{header}\n---\n"))
            .manifest()
            .clone()
    }

    #[test]
    fn test_requires_description() {
        assert!(AgentMetadata::from_manifest("a", &manifest("name: a\nmodel: opus")).is_none());
    }

    #[test]
    fn test_only_present_fields_are_rendered() {
        let meta =
            AgentMetadata::from_manifest("reviewer", &manifest("description: Reviews\nmodel: sonnet"))
                .unwrap();
        let fm = meta.to_front_matter().unwrap();
        assert_eq!(fm, "---\nname: reviewer\ndescription: Reviews\nmodel: sonnet\n---\n");
    }

    #[test]
    fn test_field_order_and_tool_list() {
        let meta = AgentMetadata::from_manifest(
            "ops",
            &manifest("permissionMode: plan\ntools: [Read, Grep]\ndescription: Ops\nmodel: haiku"),
        )
        .unwrap();
        assert_eq!(meta.tools.as_deref(), Some("Read, Grep"));

        let meta = AgentMetadata {
            tools: Some("Read".to_string()),
            ..meta
        };
        assert_eq!(
            meta.to_front_matter().unwrap(),
            "---\nname: ops\ndescription: Ops\ntools: Read\nmodel: haiku\npermissionMode: plan\n---\n"
        );
    }
}

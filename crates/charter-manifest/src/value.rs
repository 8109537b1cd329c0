use serde_yaml::Value;

/// A manifest field, normalized once so call sites never inspect YAML types.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    Absent,
    Scalar(String),
    Bool(bool),
    Sequence(Vec<String>),
    /// Mappings, tagged values and sequences holding non-scalars
    Other(Value),
}

impl ManifestValue {
    fn from_yaml(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(*b),
            Value::Sequence(items) => items
                .iter()
                .map(scalar_string)
                .collect::<Option<Vec<_>>>()
                .map_or_else(|| Self::Other(value.clone()), Self::Sequence),
            other => scalar_string(other).map_or_else(|| Self::Other(other.clone()), Self::Scalar),
        }
    }

    /// Normalize to a list of strings.
    ///
    /// Absent is empty and a scalar becomes a one-item list. Booleans and
    /// structured values carry no path list and normalize to empty.
    #[must_use]
    pub fn into_sequence(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::Sequence(items) => items,
            Self::Absent | Self::Bool(_) | Self::Other(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ordered key/value header of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: Vec<(String, Value)>,
}

impl Manifest {
    pub(crate) fn from_yaml(payload: &str) -> Self {
        if payload.trim().is_empty() {
            return Self::default();
        }

        match serde_yaml::from_str::<Value>(payload) {
            Ok(Value::Mapping(mapping)) => {
                let entries = mapping
                    .iter()
                    .filter_map(|(k, v)| scalar_string(k).map(|key| (key, v.clone())))
                    .collect();
                Self { entries }
            }
            Ok(Value::Null) => Self::default(),
            Ok(_) => {
                tracing::debug!("Manifest header is not a mapping; treating as empty");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Manifest header did not parse; treating as empty");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in header order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Raw YAML value of a field
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> ManifestValue {
        self.value(key)
            .map_or(ManifestValue::Absent, ManifestValue::from_yaml)
    }

    /// A field as a list: missing is empty, a scalar is wrapped
    #[must_use]
    pub fn array(&self, key: &str) -> Vec<String> {
        self.get(key).into_sequence()
    }

    /// A scalar field rendered as a string; empty strings count as missing
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            ManifestValue::Scalar(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

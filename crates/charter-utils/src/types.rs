use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a non-compliant verdict is.
///
/// Only `Error` stops a fail-fast batch and fails a non-strict run.
///
/// ```rust
/// use charter_utils::types::Severity;
///
/// assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The verdict recorded for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub compliant: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl ValidationResult {
    #[must_use]
    pub fn passed(reason: impl Into<String>) -> Self {
        Self {
            compliant: true,
            issues: Vec::new(),
            reason: reason.into(),
            severity: None,
        }
    }

    /// Synthetic error-severity result for a document whose check could not run
    #[must_use]
    pub fn failed_to_run(reason: impl Into<String>) -> Self {
        Self {
            compliant: false,
            issues: Vec::new(),
            reason: reason.into(),
            severity: Some(Severity::Error),
        }
    }

    /// Non-compliant and not merely a warning.
    ///
    /// A non-compliant result without a recorded severity counts as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.compliant && self.severity != Some(Severity::Warning)
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.compliant && self.severity == Some(Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_omitted_when_absent() {
        let json = serde_json::to_string(&ValidationResult::passed("ok")).unwrap();
        assert_eq!(json, r#"{"compliant":true,"issues":[],"reason":"ok"}"#);
    }

    #[test]
    fn test_error_and_warning_tiers() {
        let failed = ValidationResult::failed_to_run("timeout");
        assert!(failed.is_error());
        assert!(!failed.is_warning());

        let warned = ValidationResult {
            severity: Some(Severity::Warning),
            ..failed
        };
        assert!(warned.is_warning());
        assert!(!warned.is_error());

        let unrated = ValidationResult {
            severity: None,
            ..warned
        };
        assert!(unrated.is_error());
        assert!(!ValidationResult::passed("ok").is_error());
    }
}

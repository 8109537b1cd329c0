use charter_utils::error::ClassifierError;
use charter_utils::types::{Severity, ValidationResult};

/// Parsed classifier answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub compliant: bool,
    pub severity: Option<Severity>,
    pub issues: Vec<String>,
    pub reason: String,
}

impl From<Verdict> for ValidationResult {
    fn from(verdict: Verdict) -> Self {
        Self {
            compliant: verdict.compliant,
            issues: verdict.issues,
            reason: verdict.reason,
            severity: verdict.severity,
        }
    }
}

/// Parse a raw classifier response.
///
/// The first whitespace-delimited word, with a trailing `:` ignored and
/// compared case-insensitively, must be `PASS`, `WARN` or `FAIL`. Lines of
/// the remaining text that start with `- ` or `* ` become issues; everything
/// else, trimmed, is the reason.
///
/// ```rust
/// use charter_classifier::parse_verdict;
///
/// let verdict = parse_verdict("WARN: close\n- Missing owner").unwrap();
/// assert!(!verdict.compliant);
/// assert_eq!(verdict.issues, vec!["Missing owner".to_string()]);
/// assert_eq!(verdict.reason, "close");
/// ```
pub fn parse_verdict(raw: &str) -> Result<Verdict, ClassifierError> {
    let text = raw.trim_start();
    let Some(token) = text.split_whitespace().next() else {
        return Err(ClassifierError::EmptyResponse);
    };
    let rest = &text[token.len()..];
    let word = token.strip_suffix(':').unwrap_or(token);

    let (compliant, severity) = if word.eq_ignore_ascii_case("PASS") {
        (true, None)
    } else if word.eq_ignore_ascii_case("WARN") {
        (false, Some(Severity::Warning))
    } else if word.eq_ignore_ascii_case("FAIL") {
        (false, Some(Severity::Error))
    } else {
        return Err(ClassifierError::UnrecognizedVerdict {
            token: token.to_string(),
        });
    };

    let mut issues = Vec::new();
    let mut reason_lines = Vec::new();
    for line in rest.lines() {
        let trimmed = line.trim();
        match trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            Some(issue) if !issue.trim().is_empty() => issues.push(issue.trim().to_string()),
            Some(_) => {}
            None => reason_lines.push(trimmed),
        }
    }
    let reason = reason_lines.join("\n").trim().to_string();

    Ok(Verdict {
        compliant,
        severity,
        issues,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_is_compliant_without_severity() {
        let verdict = parse_verdict("PASS\nEverything required is present.").unwrap();
        assert!(verdict.compliant);
        assert_eq!(verdict.severity, None);
        assert!(verdict.issues.is_empty());
        assert_eq!(verdict.reason, "Everything required is present.");
    }

    #[test]
    fn test_warn_and_fail_tiers() {
        let warn = parse_verdict("warn: minor gaps").unwrap();
        assert!(!warn.compliant);
        assert_eq!(warn.severity, Some(Severity::Warning));

        let fail = parse_verdict("  Fail\n- No owner\n* No scope\nStructure is wrong.").unwrap();
        assert_eq!(fail.severity, Some(Severity::Error));
        assert_eq!(fail.issues, vec!["No owner", "No scope"]);
        assert_eq!(fail.reason, "Structure is wrong.");
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = parse_verdict("Looks fine to me").unwrap_err();
        assert!(matches!(err, ClassifierError::UnrecognizedVerdict { token } if token == "Looks"));

        // A verdict word glued to punctuation other than ':' is not accepted.
        assert!(parse_verdict("PASS.").is_err());
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(parse_verdict(" \n\t"), Err(ClassifierError::EmptyResponse)));
    }

    #[test]
    fn test_into_validation_result() {
        let result: ValidationResult = parse_verdict("FAIL: broken\n- a").unwrap().into();
        assert!(result.is_error());
        assert_eq!(result.issues, vec!["a"]);
        assert_eq!(result.reason, "broken");
    }
}

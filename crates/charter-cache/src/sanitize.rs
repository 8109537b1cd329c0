use unicode_normalization::UnicodeNormalization;

use charter_utils::types::ValidationResult;

/// Clean classifier free text before it is persisted.
///
/// Strips control characters other than newline and tab, maps curly quotes to
/// ASCII, and NFC-normalizes.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    text.nfc()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => Some('"'),
            '\n' | '\t' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

#[must_use]
pub fn sanitize_result(result: &ValidationResult) -> ValidationResult {
    ValidationResult {
        compliant: result.compliant,
        issues: result.issues.iter().map(|i| sanitize_text(i)).collect(),
        reason: sanitize_text(&result.reason),
        severity: result.severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(sanitize_text("a\u{0}b\u{7}c\r\nd\te"), "abc\nd\te");
    }

    #[test]
    fn test_curly_quotes_normalized() {
        assert_eq!(
            sanitize_text("\u{201C}quoted\u{201D} and \u{2018}single\u{2019}"),
            "\"quoted\" and 'single'"
        );
    }

    #[test]
    fn test_nfc_normalization() {
        assert_eq!(sanitize_text("e\u{301}"), "\u{e9}");
    }
}

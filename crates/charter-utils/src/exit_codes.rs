//! Exit code constants for charter.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `VALIDATION_FAILED` | Non-compliant documents found |
//! | 70 | `CLASSIFIER_FAILURE` | Classifier invocation failed outside a batch |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for common exit codes, or [`as_i32()`](Self::as_i32)
/// to get the numeric value for `std::process::exit()`.
///
/// ```rust
/// use charter_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::VALIDATION_FAILED, ExitCode::from_i32(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, config, or unknown domain
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Validation failed - error-severity (or, in strict mode, any) non-compliant results
    pub const VALIDATION_FAILED: ExitCode = ExitCode(3);

    /// Classifier failure - the classifier collaborator could not be invoked
    pub const CLASSIFIER_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::VALIDATION_FAILED.as_i32(), 3);
        assert_eq!(ExitCode::CLASSIFIER_FAILURE.as_i32(), 70);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::VALIDATION_FAILED.is_success());
    }
}

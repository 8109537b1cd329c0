use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use charter_utils::error::ClassifierError;

use crate::Classifier;
use crate::prompt::build_prompt;

const STDERR_LIMIT: usize = 2048;

/// Classifier backed by an external command.
///
/// The prompt is written to the command's stdin and its stdout is the raw
/// response. The command line is split with shell quoting rules but never run
/// through a shell.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    /// Parse a command line such as `claude -p`.
    ///
    /// # Errors
    ///
    /// `ClassifierError::Misconfiguration` for unbalanced quotes or an empty
    /// command line.
    pub fn from_command_line(command: &str) -> Result<Self, ClassifierError> {
        let mut words = shell_words::split(command).map_err(|e| {
            ClassifierError::Misconfiguration(format!("cannot parse command '{command}': {e}"))
        })?;
        if words.is_empty() {
            return Err(ClassifierError::Misconfiguration(
                "classifier command is empty".to_string(),
            ));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Locate the program on `PATH`
    pub fn resolve_binary(&self) -> Result<PathBuf, ClassifierError> {
        which::which(&self.program).map_err(|e| {
            tracing::debug!(program = %self.program, error = %e, "Classifier binary lookup failed");
            ClassifierError::CommandNotFound {
                command: self.program.clone(),
            }
        })
    }

    fn tail(stderr: &[u8]) -> String {
        let start = stderr.len().saturating_sub(STDERR_LIMIT);
        String::from_utf8_lossy(&stderr[start..]).trim().to_string()
    }
}

#[async_trait]
impl Classifier for CommandClassifier {
    async fn classify(&self, doc: &str, spec: &str) -> Result<String, ClassifierError> {
        let binary = self.resolve_binary()?;
        let prompt = build_prompt(doc, spec);

        let mut child = TokioCommand::new(&binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        tracing::debug!(binary = %binary.display(), prompt_bytes = prompt.len(), "Classifier spawned");

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if let Err(e) = fed
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(ClassifierError::Io(e));
        }

        if !output.status.success() {
            return Err(ClassifierError::CommandFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: Self::tail(&output.stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_is_split_with_quotes() {
        let classifier =
            CommandClassifier::from_command_line("claude -p --append 'two words'").unwrap();
        assert_eq!(classifier.program(), "claude");
        assert_eq!(classifier.args(), ["-p", "--append", "two words"]);
    }

    #[test]
    fn test_bad_command_lines() {
        assert!(matches!(
            CommandClassifier::from_command_line("   "),
            Err(ClassifierError::Misconfiguration(_))
        ));
        assert!(matches!(
            CommandClassifier::from_command_line("claude 'unterminated"),
            Err(ClassifierError::Misconfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let classifier =
            CommandClassifier::from_command_line("charter-no-such-classifier-binary").unwrap();
        let err = classifier.classify("doc", "spec").await.unwrap_err();
        assert!(matches!(err, ClassifierError::CommandNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prompt_goes_to_stdin() {
        let classifier = CommandClassifier::from_command_line("cat").unwrap();
        let raw = classifier.classify("the document", "the rules").await.unwrap();
        assert!(raw.contains("<document>\nthe document\n</document>"));
        assert!(raw.contains("the rules"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_reports_status_and_stderr() {
        let classifier =
            CommandClassifier::from_command_line("sh -c 'cat >/dev/null; echo quota >&2; exit 3'")
                .unwrap();
        let err = classifier.classify("doc", "spec").await.unwrap_err();
        match err {
            ClassifierError::CommandFailed { status, stderr } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "quota");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

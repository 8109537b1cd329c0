//! Logging and observability infrastructure for charter
//!
//! Structured logging is done with `tracing` events throughout the workspace.
//! Binaries call [`init_tracing`] once at startup; library code only emits.

use std::io::IsTerminal;
use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode logs charter crates at
/// `debug`, and the default shows `info` and above. Logs go to stderr so that
/// `--json` output on stdout stays machine-readable.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("charter=debug,info")
            } else {
                EnvFilter::try_new("info")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .without_time()
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering the compilation of one subject document
pub fn compile_span(document: &str) -> tracing::Span {
    span!(Level::INFO, "compile", document = %document)
}

/// Span covering validation of one domain
pub fn domain_span(domain: &str) -> tracing::Span {
    span!(Level::INFO, "validate_domain", domain = %domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered_without_subscriber() {
        let span = compile_span("agents/reviewer.md");
        let _guard = span.enter();
        let inner = domain_span("agents");
        let _inner_guard = inner.enter();
    }

    #[test]
    fn test_tracing_initialization_is_idempotent_error() {
        // A second init in the same process fails instead of panicking
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }
}

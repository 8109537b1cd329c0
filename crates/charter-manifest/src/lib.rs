//! Manifest header parsing for charter documents.
//!
//! A document may open with a YAML header fenced by `---` lines. The header
//! becomes a [`Manifest`]; everything after the closing fence is the body.
//! Parsing never fails: a missing, unterminated or malformed header yields an
//! empty manifest and the caller carries on.

mod header;
mod value;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub use header::HEADER_MARKER;
pub use value::{Manifest, ManifestValue};

/// Errors from reading a document off disk. Parsing itself is infallible.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A document split into its manifest and body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    manifest: Manifest,
    raw_body: String,
    has_header: bool,
}

impl ParsedDocument {
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Body for inlining, with enclosing whitespace trimmed
    #[must_use]
    pub fn body(&self) -> &str {
        self.raw_body.trim()
    }

    /// Body exactly as it followed the closing marker
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Whether a complete header was present
    #[must_use]
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    #[must_use]
    pub fn into_parts(self) -> (Manifest, String) {
        (self.manifest, self.raw_body)
    }
}

/// Split document text into manifest and body
#[must_use]
pub fn parse_document(text: &str) -> ParsedDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    match header::split_header(text) {
        Some((payload, body)) => ParsedDocument {
            manifest: Manifest::from_yaml(payload),
            raw_body: body.to_string(),
            has_header: true,
        },
        None => ParsedDocument {
            manifest: Manifest::default(),
            raw_body: text.to_string(),
            has_header: false,
        },
    }
}

/// Read and parse a document from disk. Always reads fresh.
pub fn parse_file(path: &Utf8Path) -> Result<ParsedDocument, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_document(&text))
}

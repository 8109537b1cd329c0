//! Document compilation for charter.
//!
//! A subject document names other documents in its manifest. Compiling it
//! inlines their bodies into one self-contained output with a fixed section
//! order: primary body, owned work, immutable context, context, references.
//! An optional metadata block leads the output when the subject has a
//! description.
//!
//! The compiler never consults the validation cache.

mod compiler;
mod health;
mod immutable;
mod metadata;
mod plugin;
mod sections;
mod slug;

/// Manifest field names read by the compiler
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const TOOLS: &str = "tools";
    pub const MODEL: &str = "model";
    pub const PERMISSION_MODE: &str = "permissionMode";
    pub const OWNED_WORK: &str = "ownedWork";
    pub const IMMUTABLE_CONTEXT: &str = "immutableContext";
    pub const CONTEXT: &str = "context";
    pub const REFERENCES: &str = "references";
}

pub use compiler::{
    CompileOutcome, CompileReport, CompiledDocument, CompiledEntry, Compiler, PluginFailure,
    PluginOutput, SkipReason, SkippedEntry,
};
pub use health::{FindingKind, ReferenceFinding};
pub use immutable::ImmutableContext;
pub use metadata::AgentMetadata;
pub use plugin::{AgentDirPlugin, OutputPlugin, PluginArtifact, PluginInput};
pub use sections::{BLANK_LINE_SEPARATOR, RULE_SEPARATOR, Section, SectionKind};
pub use slug::slugify;

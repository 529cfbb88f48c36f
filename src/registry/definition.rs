//! The in-memory form of one agent template file.

use crate::storage::Scope;
use std::fmt::Write as _;
use std::path::PathBuf;

pub const DEFAULT_VERSION: &str = "1.0.0";

/// One agent template discovered on disk.
///
/// Reconstructed fresh on every discovery pass; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Unique within a scope; lowercase alphanumeric + hyphens.
    pub id: String,
    /// Free text shown in listings.
    pub description: String,
    /// Declared capability (tool) names, in declaration order.
    pub capabilities: Vec<String>,
    /// Semantic version string; `1.0.0` when the file declares none.
    pub version: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
    /// Companion sub-command file declared in the metadata, if any.
    pub sub_command: Option<String>,
    /// Exact bytes of the source file. Opaque to the reconciler.
    pub raw_content: String,
    /// Free-form text after the metadata block(s).
    pub body: String,
    /// Where the file was found.
    pub path: PathBuf,
    /// Scope of the directory it was discovered in, when known.
    pub scope: Option<Scope>,
}

/// Validate an agent identifier: lowercase ASCII alphanumerics and hyphens,
/// 1-64 chars, no leading/trailing/double hyphen.
pub fn validate_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !id.starts_with('-')
        && !id.ends_with('-')
        && !id.contains("--")
}

impl Definition {
    /// Render a canonical file: one normalized metadata block followed by
    /// the original body. Used when a freshly-generated file is wanted
    /// instead of a byte-exact copy of the source.
    pub fn to_canonical(&self) -> String {
        let mut out = String::from("---\n");
        let _ = writeln!(out, "name: {}", self.id);
        let _ = writeln!(out, "description: {}", self.description);
        if !self.capabilities.is_empty() {
            let _ = writeln!(out, "tools: {}", self.capabilities.join(", "));
        }
        let _ = writeln!(out, "version: {}", self.version);
        if let Some(author) = &self.author {
            let _ = writeln!(out, "author: {}", author);
        }
        if !self.tags.is_empty() {
            let _ = writeln!(out, "tags: {}", self.tags.join(", "));
        }
        if let Some(sub) = &self.sub_command {
            let _ = writeln!(out, "sub-command: {}", sub);
        }
        out.push_str("---\n");
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

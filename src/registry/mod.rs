//! Agent registry: discovery, parsing, manifest state, and the
//! reconciliation engine that keeps the two scopes consistent.
//!
//! Ownership boundaries:
//! - the manifest store is the only code that reads/writes manifest files;
//! - the reconciler decides what the manifest should contain;
//! - the materializer performs definition file writes and never touches a
//!   manifest.

pub mod companion;
pub mod definition;
pub mod discovery;
pub mod manifest;
pub mod materializer;
pub mod parser;
pub mod reconciler;

pub use definition::Definition;
pub use discovery::DefinitionSet;
pub use manifest::{Manifest, ManifestEntry, ManifestStore};
pub use parser::ParseOutcome;
pub use reconciler::{SyncMode, SyncReport};

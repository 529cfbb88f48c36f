use crate::config::Config;
use crate::error::Result;
use crate::registry::{DefinitionSet, ManifestStore};
use crate::storage::{Layout, PathKind, Scope};

/// Resolve the layout for this invocation, honoring config overrides.
pub fn layout(config: &Config) -> Result<Layout> {
    Layout::resolve(
        config.user_root().as_deref(),
        config.project_root().as_deref(),
    )
}

/// Scope selected by the `--project` flag, falling back to the
/// configured default.
pub fn scope_from_flag(config: &Config, project: bool) -> Scope {
    if project {
        Scope::Project
    } else {
        config.default_scope()
    }
}

pub fn store(layout: &Layout, scope: Scope) -> ManifestStore {
    ManifestStore::new(layout.path(scope, PathKind::Manifest))
}

/// Print discovery warnings (degraded parses, skipped files). Always
/// shown; these are logged events, not errors.
pub fn print_discovery_warnings(defs: &DefinitionSet) {
    for warning in &defs.warnings {
        eprintln!("Warning: {}", warning);
    }
}

/// Final per-command tally, printed even when some items failed.
pub fn print_summary(succeeded: usize, failed: usize, skipped: usize) {
    println!(
        "Summary: {} succeeded, {} failed, {} skipped",
        succeeded, failed, skipped
    );
}

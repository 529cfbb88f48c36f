use crate::commands::helpers;
use crate::config::Config;
use crate::error::Result;
use crate::registry::{reconciler, DefinitionSet, SyncMode};
use crate::storage::Scope;
use chrono::Utc;

pub fn execute(
    config: &Config,
    ids: &[String],
    all: bool,
    force_copy: bool,
    project_only: bool,
) -> Result<()> {
    let layout = helpers::layout(config)?;
    let defs = DefinitionSet::discover(&layout);
    helpers::print_discovery_warnings(&defs);

    let mode = if all {
        SyncMode::Auto
    } else if !ids.is_empty() {
        SyncMode::Selective(ids.to_vec())
    } else {
        SyncMode::Report
    };

    let mut user_store = helpers::store(&layout, Scope::User);
    let mut project_store = helpers::store(&layout, Scope::Project);
    let mut user_manifest = user_store.load()?;
    let mut project_manifest = project_store.load()?;

    let report = reconciler::sync(
        &layout,
        &defs,
        &mut user_manifest,
        &mut project_manifest,
        mode.clone(),
        project_only,
        force_copy,
        Utc::now(),
    );

    // Only scopes that actually gained entries get written back; a dry
    // report must not create manifest files.
    if report.registered.iter().any(|(_, s)| *s == Scope::User) {
        user_store.save(&user_manifest)?;
    }
    if report.registered.iter().any(|(_, s)| *s == Scope::Project) {
        project_store.save(&project_manifest)?;
    }

    for (id, scope) in &report.registered {
        println!("Registered '{}' in {} scope", id, scope);
    }
    if matches!(mode, SyncMode::Report) && !report.skipped.is_empty() {
        println!("Unregistered definitions on disk:");
        for id in &report.skipped {
            println!("  {}", id);
        }
    } else if config.verbose {
        for id in &report.skipped {
            eprintln!("Left '{}' unregistered", id);
        }
    }
    for id in &report.copied {
        println!("Copied '{}' into project scope", id);
    }
    for path in &report.orphans {
        println!("Orphaned sub-command: {}", path.display());
    }
    for (id, reason) in &report.failures {
        eprintln!("Failed '{}': {}", id, reason);
    }

    helpers::print_summary(
        report.registered.len() + report.copied.len(),
        report.failures.len(),
        report.skipped.len() + report.already_registered.len(),
    );
    Ok(())
}

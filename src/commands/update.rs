use crate::commands::helpers;
use crate::config::Config;
use crate::error::{AgentryError, Result};
use crate::registry::reconciler::{self, UpdateOutcome};
use crate::registry::DefinitionSet;
use chrono::Utc;

pub fn execute(
    config: &Config,
    ids: &[String],
    all: bool,
    project: bool,
    force: bool,
    preserve_custom: bool,
) -> Result<()> {
    let layout = helpers::layout(config)?;
    let scope = helpers::scope_from_flag(config, project);
    let defs = DefinitionSet::discover(&layout);
    helpers::print_discovery_warnings(&defs);

    let mut store = helpers::store(&layout, scope);
    let mut manifest = store.load()?;

    let targets: Vec<String> = if all {
        manifest.installed.keys().cloned().collect()
    } else if ids.is_empty() {
        return Err(AgentryError::InvalidConfig(
            "update requires agent identifiers or --all".to_string(),
        ));
    } else {
        ids.to_vec()
    };

    let preserve = preserve_custom || config.update.preserve_custom;
    let now = Utc::now();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut skipped = 0;

    // Sequential batch; one failure never stops the rest.
    for id in &targets {
        match reconciler::update(
            &layout,
            &defs,
            &mut manifest,
            id,
            scope,
            force,
            preserve,
            now,
        ) {
            Ok(UpdateOutcome::Updated { path, backup, .. }) => {
                succeeded += 1;
                println!("Updated '{}' at {}", id, path.display());
                if let Some(backup) = backup {
                    println!("  kept local copy as {}", backup.display());
                }
            }
            Ok(UpdateOutcome::UpToDate { installed }) => {
                skipped += 1;
                println!("'{}' is already up to date ({})", id, installed);
            }
            Err(e) => {
                failed += 1;
                eprintln!("Failed to update '{}': {}", id, e);
            }
        }
    }

    // Successful items are persisted even when others failed.
    store.save(&manifest)?;
    helpers::print_summary(succeeded, failed, skipped);
    Ok(())
}

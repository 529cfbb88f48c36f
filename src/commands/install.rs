use crate::commands::helpers;
use crate::config::Config;
use crate::error::{AgentryError, Result};
use crate::registry::definition::validate_id;
use crate::registry::{reconciler, DefinitionSet};
use chrono::Utc;

pub fn execute(config: &Config, id: &str, project: bool, force: bool) -> Result<()> {
    if !validate_id(id) {
        return Err(AgentryError::InvalidIdentifier(id.to_string()));
    }

    let layout = helpers::layout(config)?;
    let scope = helpers::scope_from_flag(config, project);
    let defs = DefinitionSet::discover(&layout);
    helpers::print_discovery_warnings(&defs);

    let mut store = helpers::store(&layout, scope);
    let mut manifest = store.load()?;

    let outcome = reconciler::install(&layout, &defs, &mut manifest, id, scope, force, Utc::now())?;
    store.save(&manifest)?;

    println!("Installed '{}' to {}", id, outcome.path.display());
    if let Some(companion) = &outcome.companion {
        println!("Installed sub-command '{}'", companion);
    } else if config.verbose {
        eprintln!("No companion sub-command found for '{}'", id);
    }
    helpers::print_summary(1, 0, 0);
    Ok(())
}

use crate::commands::helpers;
use crate::config::Config;
use crate::error::Result;
use crate::registry::{reconciler, DefinitionSet};

pub fn execute(config: &Config, id: &str, project: bool) -> Result<()> {
    let layout = helpers::layout(config)?;
    let scope = helpers::scope_from_flag(config, project);
    let defs = DefinitionSet::discover(&layout);
    helpers::print_discovery_warnings(&defs);

    let mut store = helpers::store(&layout, scope);
    let mut manifest = store.load()?;

    let outcome = reconciler::remove(&layout, &defs, &mut manifest, id, scope)?;
    store.save(&manifest)?;

    for path in &outcome.deleted {
        println!("Deleted {}", path.display());
    }
    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!("Removed '{}' from {} scope", id, scope);
    helpers::print_summary(1, 0, 0);
    Ok(())
}

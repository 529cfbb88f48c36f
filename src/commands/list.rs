use crate::commands::helpers;
use crate::config::Config;
use crate::error::Result;
use crate::registry::{reconciler, DefinitionSet, Manifest};
use crate::storage::Scope;
use std::collections::BTreeMap;

pub fn execute(config: &Config, installed: bool, available: bool, all: bool) -> Result<()> {
    let layout = helpers::layout(config)?;
    let defs = DefinitionSet::discover(&layout);
    helpers::print_discovery_warnings(&defs);

    let user_manifest = helpers::store(&layout, Scope::User).load()?;
    let project_manifest = helpers::store(&layout, Scope::Project).load()?;

    if available {
        list_available(&defs);
        return Ok(());
    }
    if installed {
        list_installed(&user_manifest, &project_manifest);
        return Ok(());
    }
    list_effective(&defs, &user_manifest, &project_manifest, all);
    Ok(())
}

fn list_available(defs: &DefinitionSet) {
    let effective = defs.effective();
    if effective.is_empty() {
        println!("No agent definitions found on disk.");
        return;
    }
    println!("{:<28} {:>9} {:>8}  {}", "AGENT", "VERSION", "SCOPE", "DESCRIPTION");
    for def in effective {
        println!(
            "{:<28} {:>9} {:>8}  {}",
            def.id,
            def.version,
            def.scope.map(|s| s.to_string()).unwrap_or_default(),
            def.description
        );
    }
}

fn list_installed(user: &Manifest, project: &Manifest) {
    if user.installed.is_empty() && project.installed.is_empty() {
        println!("No agents installed.");
        return;
    }
    println!("{:<28} {:>9} {:>8}  {}", "AGENT", "VERSION", "SCOPE", "STATE");
    for (manifest, scope) in [(user, Scope::User), (project, Scope::Project)] {
        for (id, entry) in &manifest.installed {
            println!(
                "{:<28} {:>9} {:>8}  {}",
                id,
                entry.version,
                scope,
                reconciler::state_name(manifest.is_enabled(id))
            );
        }
    }
}

/// Effective merged view: project entries shadow user entries for the
/// same identifier; disabled agents are hidden unless `--all`.
fn list_effective(defs: &DefinitionSet, user: &Manifest, project: &Manifest, all: bool) {
    let mut rows: BTreeMap<&str, (&Manifest, Scope)> = BTreeMap::new();
    for id in user.installed.keys() {
        rows.insert(id.as_str(), (user, Scope::User));
    }
    for id in project.installed.keys() {
        rows.insert(id.as_str(), (project, Scope::Project));
    }

    if rows.is_empty() {
        println!("No agents installed. Try 'agentry list --available'.");
        return;
    }

    println!(
        "{:<28} {:>9} {:>8} {:>9}  {}",
        "AGENT", "VERSION", "SCOPE", "STATE", "DESCRIPTION"
    );
    let mut shown = 0;
    let mut hidden = 0;
    for (&id, &(manifest, scope)) in &rows {
        let enabled = manifest.is_enabled(id);
        if !enabled && !all {
            hidden += 1;
            continue;
        }
        let entry = &manifest.installed[id];
        let description = defs
            .get(id, scope)
            .map(|d| d.description.as_str())
            .unwrap_or("(definition missing on disk)");
        println!(
            "{:<28} {:>9} {:>8} {:>9}  {}",
            id,
            entry.version,
            scope,
            reconciler::state_name(enabled),
            description
        );
        shown += 1;
    }
    if hidden > 0 {
        println!("({} disabled agent(s) hidden; use --all to show)", hidden);
    }
    println!("{} agent(s) listed", shown);
}

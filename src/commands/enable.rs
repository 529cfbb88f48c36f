use crate::commands::helpers;
use crate::config::Config;
use crate::error::Result;
use crate::registry::reconciler;

/// Shared by `enable` and `disable`; the two commands differ only in the
/// target state.
pub fn execute(config: &Config, id: &str, project: bool, enabled: bool) -> Result<()> {
    let layout = helpers::layout(config)?;
    let scope = helpers::scope_from_flag(config, project);

    let mut store = helpers::store(&layout, scope);
    let mut manifest = store.load()?;

    reconciler::set_enabled(&mut manifest, id, enabled)?;
    store.save(&manifest)?;

    println!("Agent '{}' is now {}", id, reconciler::state_name(enabled));
    helpers::print_summary(1, 0, 0);
    Ok(())
}

//! The registry reconciliation engine.
//!
//! Each operation is a transition applied to a `(DefinitionSet, Manifest)`
//! pair. Operations mutate the in-memory manifest only after the
//! filesystem writes for that item succeed; the command layer loads the
//! manifest before and saves it after, so the manifest stays the single
//! source of truth when a run is interrupted.

use crate::error::{AgentryError, Result};
use crate::registry::companion;
use crate::registry::discovery::DefinitionSet;
use crate::registry::manifest::{Manifest, ManifestEntry};
use crate::registry::materializer;
use crate::storage::{Layout, PathKind, Scope};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// What an install actually wrote.
#[derive(Debug)]
pub struct InstallOutcome {
    pub path: PathBuf,
    pub companion: Option<String>,
}

/// What an update did.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated {
        path: PathBuf,
        backup: Option<PathBuf>,
        companion: Option<String>,
    },
    /// Source version is not newer than the installed one.
    UpToDate { installed: String },
}

/// What a remove deleted.
#[derive(Debug)]
pub struct RemoveOutcome {
    pub deleted: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Install a discoverable definition into `scope`.
///
/// Writes the canonical (normalized) form of the definition plus a
/// best-effort companion sub-command, then records the manifest entry
/// with `enabled=true`.
pub fn install(
    layout: &Layout,
    defs: &DefinitionSet,
    manifest: &mut Manifest,
    id: &str,
    scope: Scope,
    force: bool,
    now: DateTime<Utc>,
) -> Result<InstallOutcome> {
    let def = defs
        .get(id, scope)
        .ok_or_else(|| AgentryError::DefinitionNotFound(id.to_string()))?;

    if manifest.contains(id) && !force {
        return Err(AgentryError::AlreadyInstalled {
            id: id.to_string(),
            scope: scope.to_string(),
        });
    }

    // Filesystem first, manifest second.
    let path = materializer::write_canonical(layout, scope, def)?;
    let companion = copy_companion(layout, def, scope)?;

    manifest.add_entry(
        id,
        ManifestEntry {
            version: def.version.clone(),
            installed_at: now,
            updated_at: None,
            scope,
        },
    );

    Ok(InstallOutcome { path, companion })
}

/// Refresh an installed definition from its source template.
///
/// Keeps the original install timestamp and stamps `updatedAt`. With
/// `preserve_custom`, a locally modified copy is renamed to `.backup`
/// before being overwritten (backup-and-overwrite, not a merge).
pub fn update(
    layout: &Layout,
    defs: &DefinitionSet,
    manifest: &mut Manifest,
    id: &str,
    scope: Scope,
    force: bool,
    preserve_custom: bool,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    // The copy installed into `scope` is the thing being refreshed, so
    // the source template is preferably the other scope's file.
    let source_scope = match scope {
        Scope::User => Scope::Project,
        Scope::Project => Scope::User,
    };
    let def = defs
        .get(id, source_scope)
        .ok_or_else(|| AgentryError::DefinitionNotFound(id.to_string()))?;
    let entry = manifest
        .entry(id)
        .ok_or_else(|| AgentryError::NotInstalled(id.to_string()))?
        .clone();

    if !force && !is_newer(&def.version, &entry.version) {
        return Ok(UpdateOutcome::UpToDate {
            installed: entry.version,
        });
    }

    let dest = layout.definition_file(scope, id);
    let mut backup = None;
    if preserve_custom && dest.is_file() && dest != def.path {
        let current = std::fs::read_to_string(&dest)?;
        let digest = md5::compute(current.as_bytes());
        // Install writes the canonical rendering, so an untouched copy
        // matches either the source bytes or their canonical form.
        let pristine = digest == md5::compute(def.raw_content.as_bytes())
            || digest == md5::compute(def.to_canonical().as_bytes());
        if !pristine {
            backup = Some(materializer::backup_existing(&dest)?);
        }
    }

    // Plain update copies the source bytes as-is.
    let path = materializer::write_definition(layout, scope, id, &def.raw_content)?;
    let companion = copy_companion(layout, def, scope)?;

    manifest.add_entry(
        id,
        ManifestEntry {
            version: def.version.clone(),
            installed_at: entry.installed_at,
            updated_at: Some(now),
            scope,
        },
    );

    Ok(UpdateOutcome::Updated {
        path,
        backup,
        companion,
    })
}

fn copy_companion(
    layout: &Layout,
    def: &crate::registry::definition::Definition,
    dest_scope: Scope,
) -> Result<Option<String>> {
    // Search the source scope first, then the other one.
    let first = def.scope.unwrap_or(Scope::User);
    let second = match first {
        Scope::User => Scope::Project,
        Scope::Project => Scope::User,
    };
    let source_dirs: Vec<PathBuf> = [first, second]
        .into_iter()
        .map(|s| layout.path(s, PathKind::SubCommands))
        .collect();

    let Some((name, source_path)) = companion::find_companion(def, &source_dirs) else {
        // Best-effort: a missing companion file is not an error.
        return Ok(None);
    };

    let dest = layout.sub_command_file(dest_scope, &name);
    if dest == source_path {
        return Ok(Some(name));
    }
    let content = std::fs::read_to_string(&source_path)?;
    materializer::write_sub_command(layout, dest_scope, &name, &content)?;
    Ok(Some(name))
}

/// Flip the enabled state. Manifest-only; no content changes.
pub fn set_enabled(manifest: &mut Manifest, id: &str, enabled: bool) -> Result<()> {
    if !manifest.contains(id) {
        return Err(AgentryError::NotInstalled(id.to_string()));
    }
    if manifest.is_enabled(id) == enabled {
        return Err(AgentryError::AlreadyInState {
            id: id.to_string(),
            state: state_name(enabled).to_string(),
        });
    }
    manifest.set_enabled(id, enabled);
    Ok(())
}

pub fn state_name(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

/// Remove an installed definition: best-effort file deletion, then the
/// manifest entry and any overrides.
pub fn remove(
    layout: &Layout,
    defs: &DefinitionSet,
    manifest: &mut Manifest,
    id: &str,
    scope: Scope,
) -> Result<RemoveOutcome> {
    if !manifest.contains(id) {
        return Err(AgentryError::NotInstalled(id.to_string()));
    }

    let mut deleted = Vec::new();
    let mut warnings = Vec::new();

    match materializer::remove_definition(layout, scope, id) {
        Ok(true) => deleted.push(layout.definition_file(scope, id)),
        Ok(false) => {}
        Err(e) => warnings.push(e.to_string()),
    }

    // Companions resolve exactly as install resolved them: the first
    // candidate that exists in this scope is the one install wrote, and
    // only that file is deleted. A sibling agent whose companion name
    // collides with a later candidate keeps its file.
    let companion = match defs.get(id, scope) {
        Some(def) => {
            companion::find_companion(def, &[layout.path(scope, PathKind::SubCommands)])
                .map(|(name, _)| name)
        }
        // Definition already gone from disk; the identifier is the only
        // candidate left.
        None => Some(id.to_string()),
    };
    if let Some(name) = companion {
        match materializer::remove_sub_command(layout, scope, &name) {
            Ok(true) => deleted.push(layout.sub_command_file(scope, &name)),
            Ok(false) => {}
            Err(e) => warnings.push(e.to_string()),
        }
    }

    manifest.remove_entry(id);
    Ok(RemoveOutcome { deleted, warnings })
}

/// How sync decides which unregistered definitions to register.
#[derive(Debug, Clone)]
pub enum SyncMode {
    /// Report only; no state change.
    Report,
    /// Register everything found on disk.
    Auto,
    /// Register only the requested identifiers.
    Selective(Vec<String>),
}

/// Outcome tally of one sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub registered: Vec<(String, Scope)>,
    pub already_registered: Vec<String>,
    /// Unregistered definitions deliberately left alone.
    pub skipped: Vec<String>,
    pub copied: Vec<String>,
    pub orphans: Vec<PathBuf>,
    pub failures: Vec<(String, String)>,
}

/// Reconcile on-disk definitions with the two manifests.
///
/// Registration records manifest entries for files already in place (no
/// copying); `project_only` restricts registration to definitions found
/// in the project scope; `force_copy` additionally re-materializes every
/// registered definition into the project scope. Per-item failures are
/// tallied, not propagated.
pub fn sync(
    layout: &Layout,
    defs: &DefinitionSet,
    user_manifest: &mut Manifest,
    project_manifest: &mut Manifest,
    mode: SyncMode,
    project_only: bool,
    force_copy: bool,
    now: DateTime<Utc>,
) -> SyncReport {
    let mut report = SyncReport::default();

    let is_registered =
        |user: &Manifest, project: &Manifest, id: &str| user.contains(id) || project.contains(id);

    for def in defs.effective() {
        if is_registered(user_manifest, project_manifest, &def.id) {
            report.already_registered.push(def.id.clone());
            continue;
        }

        let wanted = match &mode {
            SyncMode::Report => false,
            SyncMode::Auto => true,
            SyncMode::Selective(ids) => ids.iter().any(|i| i == &def.id),
        };
        if !wanted {
            // Expected partial completion, not a warning.
            report.skipped.push(def.id.clone());
            continue;
        }

        let scope = def.scope.unwrap_or(Scope::User);
        if project_only && scope != Scope::Project {
            report.skipped.push(def.id.clone());
            continue;
        }
        let manifest = match scope {
            Scope::User => &mut *user_manifest,
            Scope::Project => &mut *project_manifest,
        };
        manifest.add_entry(
            &def.id,
            ManifestEntry {
                version: def.version.clone(),
                installed_at: now,
                updated_at: None,
                scope,
            },
        );
        report.registered.push((def.id.clone(), scope));
    }

    if let SyncMode::Selective(ids) = &mode {
        for id in ids {
            let known = defs.get(id, Scope::Project).is_some();
            let handled = report.registered.iter().any(|(r, _)| r == id)
                || report.already_registered.iter().any(|r| r == id);
            if !known && !handled {
                report
                    .failures
                    .push((id.clone(), "no definition found on disk".into()));
            }
        }
    }

    if force_copy {
        for def in defs.effective() {
            if !is_registered(user_manifest, project_manifest, &def.id) {
                continue;
            }
            match materializer::write_definition(layout, Scope::Project, &def.id, &def.raw_content)
            {
                Ok(_) => report.copied.push(def.id.clone()),
                Err(e) => report.failures.push((def.id.clone(), e.to_string())),
            }
        }
    }

    report.orphans = find_orphans(layout, defs, user_manifest, project_manifest);
    report
}

/// Companion files with no matching registered definition. Diagnostic
/// only; never mutates anything.
fn find_orphans(
    layout: &Layout,
    defs: &DefinitionSet,
    user_manifest: &Manifest,
    project_manifest: &Manifest,
) -> Vec<PathBuf> {
    let registered: Vec<&crate::registry::definition::Definition> = defs
        .effective()
        .into_iter()
        .filter(|d| user_manifest.contains(&d.id) || project_manifest.contains(&d.id))
        .collect();

    let mut orphans = Vec::new();
    for scope in [Scope::User, Scope::Project] {
        let dir = layout.path(scope, PathKind::SubCommands);
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(stem) = companion::sub_command_stem(&path) else {
                continue;
            };
            let claimed = registered.iter().any(|def| companion::matches(def, stem));
            if !claimed {
                orphans.push(path);
            }
        }
    }
    orphans.sort();
    orphans
}

/// Strict semver comparison with a permissive fallback: unparseable
/// versions are treated as different, so the update proceeds.
fn is_newer(candidate: &str, installed: &str) -> bool {
    match (
        semver::Version::parse(candidate),
        semver::Version::parse(installed),
    ) {
        (Ok(c), Ok(i)) => c > i,
        _ => candidate != installed,
    }
}

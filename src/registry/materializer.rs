//! Filesystem side effects for definition payloads.
//!
//! Two distinct write paths exist on purpose: `write_definition` copies
//! source bytes verbatim (sync, plain update), while `write_canonical`
//! regenerates the file from the parsed fields (normalize/migrate flows).
//! The materializer never touches a manifest; ordering is the
//! reconciler's job.

use crate::error::{AgentryError, Result};
use crate::registry::definition::Definition;
use crate::storage::{Layout, PathKind, Scope};
use std::path::{Path, PathBuf};

/// Write a definition byte-for-byte into the scope's definitions
/// directory, creating it if needed.
pub fn write_definition(layout: &Layout, scope: Scope, id: &str, raw: &str) -> Result<PathBuf> {
    layout.ensure_dir(scope, PathKind::Definitions)?;
    let dest = layout.definition_file(scope, id);
    write_file(&dest, raw)?;
    Ok(dest)
}

/// Write a freshly-generated canonical file (normalized metadata block
/// plus the original body) instead of the source bytes.
pub fn write_canonical(layout: &Layout, scope: Scope, def: &Definition) -> Result<PathBuf> {
    layout.ensure_dir(scope, PathKind::Definitions)?;
    let dest = layout.definition_file(scope, &def.id);
    write_file(&dest, &def.to_canonical())?;
    Ok(dest)
}

/// Copy a companion sub-command file as-is.
pub fn write_sub_command(layout: &Layout, scope: Scope, name: &str, raw: &str) -> Result<PathBuf> {
    layout.ensure_dir(scope, PathKind::SubCommands)?;
    let dest = layout.sub_command_file(scope, name);
    write_file(&dest, raw)?;
    Ok(dest)
}

/// Rename an existing file to `<file>.backup`, replacing any previous
/// backup. Used before overwriting a locally customized copy.
pub fn backup_existing(path: &Path) -> Result<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".backup");
    let backup = PathBuf::from(backup);
    std::fs::rename(path, &backup).map_err(|source| AgentryError::MaterializationFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(backup)
}

/// Best-effort delete of a materialized definition. Missing files are
/// not an error; anything else is reported back for the batch tally.
pub fn remove_definition(layout: &Layout, scope: Scope, id: &str) -> Result<bool> {
    remove_file(&layout.definition_file(scope, id))
}

/// Best-effort delete of a companion sub-command file.
pub fn remove_sub_command(layout: &Layout, scope: Scope, name: &str) -> Result<bool> {
    remove_file(&layout.sub_command_file(scope, name))
}

fn remove_file(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(AgentryError::MaterializationFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| AgentryError::MaterializationFailed {
        path: path.to_path_buf(),
        source,
    })
}

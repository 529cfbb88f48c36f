//! Filesystem discovery of agent definitions in both scopes.

use crate::registry::definition::Definition;
use crate::registry::parser::{self, ParseOutcome};
use crate::storage::{Layout, PathKind, Scope};
use std::collections::HashMap;
use std::path::Path;

/// All definitions found on disk, indexed per scope.
///
/// Rebuilt fresh at the start of every command that needs it.
#[derive(Debug, Default)]
pub struct DefinitionSet {
    user: HashMap<String, Definition>,
    project: HashMap<String, Definition>,
    /// Formatted degraded-parse and skip notices, for the command output.
    pub warnings: Vec<String>,
}

impl DefinitionSet {
    /// Scan the definitions directories of both scopes. Missing
    /// directories are fine; unreadable or malformed files are skipped
    /// with a warning rather than failing the whole pass.
    pub fn discover(layout: &Layout) -> Self {
        let mut set = DefinitionSet::default();
        for scope in [Scope::User, Scope::Project] {
            let dir = layout.path(scope, PathKind::Definitions);
            set.scan_dir(&dir, scope);
        }
        set
    }

    fn scan_dir(&mut self, dir: &Path, scope: Scope) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with('.') || name.eq_ignore_ascii_case("readme.md") {
                continue;
            }

            match parser::parse_file(&path) {
                Ok(outcome) => {
                    for warning in outcome.warnings() {
                        self.warnings
                            .push(format!("{}: {}", path.display(), warning));
                    }
                    self.insert(outcome, scope);
                }
                Err(e) => {
                    self.warnings
                        .push(format!("{}: skipped ({})", path.display(), e));
                }
            }
        }
    }

    fn insert(&mut self, outcome: ParseOutcome, scope: Scope) {
        let mut def = outcome.into_definition();
        def.scope = Some(scope);
        let map = match scope {
            Scope::User => &mut self.user,
            Scope::Project => &mut self.project,
        };
        if let Some(previous) = map.insert(def.id.clone(), def) {
            self.warnings.push(format!(
                "{}: duplicate identifier '{}' in {} scope; later file wins",
                previous.path.display(),
                previous.id,
                scope
            ));
        }
    }

    /// Look up a definition, preferring the requested scope's copy.
    pub fn get(&self, id: &str, prefer: Scope) -> Option<&Definition> {
        let (first, second) = match prefer {
            Scope::User => (&self.user, &self.project),
            Scope::Project => (&self.project, &self.user),
        };
        first.get(id).or_else(|| second.get(id))
    }

    /// All definitions across both scopes, project copies shadowing user
    /// copies with the same identifier, sorted by identifier.
    pub fn effective(&self) -> Vec<&Definition> {
        let mut merged: HashMap<&str, &Definition> = HashMap::new();
        for def in self.user.values() {
            merged.insert(&def.id, def);
        }
        for def in self.project.values() {
            merged.insert(&def.id, def);
        }
        let mut defs: Vec<_> = merged.into_values().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.project.is_empty()
    }
}

//! Filesystem layout for the two installation scopes.
//!
//! Every path the tool touches is derived here: the user scope lives in a
//! dot-directory under the home directory, the project scope in a
//! dot-directory under the current working directory. Resolution is pure;
//! directory creation only happens through the explicit `ensure_dir` call.

use crate::error::{AgentryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the dot-directory used for both scopes.
pub const DOT_DIR: &str = ".agentry";

/// Environment variable overriding the user-scope root (mainly for tests).
pub const HOME_ENV: &str = "AGENTRY_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Project,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::User => write!(f, "user"),
            Scope::Project => write!(f, "project"),
        }
    }
}

/// Logical location kinds inside a scope root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Definitions,
    SubCommands,
    Manifest,
}

/// Resolved directory layout for one invocation.
#[derive(Debug, Clone)]
pub struct Layout {
    user_root: PathBuf,
    project_root: PathBuf,
}

impl Layout {
    /// Resolve both scope roots. Precedence for the user root:
    /// explicit override (config), then `AGENTRY_HOME`, then `$HOME/.agentry`.
    pub fn resolve(user_override: Option<&Path>, project_override: Option<&Path>) -> Result<Self> {
        let user_root = match user_override {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os(HOME_ENV) {
                Some(dir) => PathBuf::from(dir),
                None => {
                    let home = std::env::var_os("HOME").ok_or(AgentryError::NoHomeDir)?;
                    PathBuf::from(home).join(DOT_DIR)
                }
            },
        };

        let project_root = match project_override {
            Some(p) => p.to_path_buf(),
            None => std::env::current_dir()?.join(DOT_DIR),
        };

        Ok(Self {
            user_root,
            project_root,
        })
    }

    /// Build a layout from explicit roots (used by tests and sync helpers).
    pub fn with_roots(user_root: PathBuf, project_root: PathBuf) -> Self {
        Self {
            user_root,
            project_root,
        }
    }

    pub fn root(&self, scope: Scope) -> &Path {
        match scope {
            Scope::User => &self.user_root,
            Scope::Project => &self.project_root,
        }
    }

    /// Pure path resolution; never touches the filesystem.
    pub fn path(&self, scope: Scope, kind: PathKind) -> PathBuf {
        let root = self.root(scope);
        match kind {
            PathKind::Definitions => root.join("definitions"),
            PathKind::SubCommands => root.join("sub-commands"),
            PathKind::Manifest => root.join("manifest.json"),
        }
    }

    /// Path of a single definition file within a scope.
    pub fn definition_file(&self, scope: Scope, id: &str) -> PathBuf {
        self.path(scope, PathKind::Definitions).join(format!("{}.md", id))
    }

    /// Path of a single companion sub-command file within a scope.
    pub fn sub_command_file(&self, scope: Scope, name: &str) -> PathBuf {
        self.path(scope, PathKind::SubCommands).join(format!("{}.md", name))
    }

    /// Create the directory for `kind` (and parents) if missing.
    pub fn ensure_dir(&self, scope: Scope, kind: PathKind) -> Result<PathBuf> {
        let path = match kind {
            PathKind::Manifest => self.root(scope).to_path_buf(),
            _ => self.path(scope, kind),
        };
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::with_roots(PathBuf::from("/home/u/.agentry"), PathBuf::from("/w/.agentry"))
    }

    #[test]
    fn test_path_resolution_is_pure_and_stable() {
        let l = layout();
        let a = l.path(Scope::User, PathKind::Definitions);
        let b = l.path(Scope::User, PathKind::Definitions);
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/home/u/.agentry/definitions"));
    }

    #[test]
    fn test_scope_selects_root() {
        let l = layout();
        assert_eq!(
            l.path(Scope::Project, PathKind::Manifest),
            PathBuf::from("/w/.agentry/manifest.json")
        );
        assert_eq!(
            l.path(Scope::User, PathKind::SubCommands),
            PathBuf::from("/home/u/.agentry/sub-commands")
        );
    }

    #[test]
    fn test_definition_and_sub_command_files() {
        let l = layout();
        assert_eq!(
            l.definition_file(Scope::User, "code-reviewer"),
            PathBuf::from("/home/u/.agentry/definitions/code-reviewer.md")
        );
        assert_eq!(
            l.sub_command_file(Scope::Project, "review"),
            PathBuf::from("/w/.agentry/sub-commands/review.md")
        );
    }

    #[test]
    fn test_ensure_dir_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let l = Layout::with_roots(tmp.path().join("u"), tmp.path().join("p"));

        let defs = l.ensure_dir(Scope::User, PathKind::Definitions).unwrap();
        assert!(defs.is_dir());

        // Manifest kind ensures the scope root, not the file.
        let root = l.ensure_dir(Scope::Project, PathKind::Manifest).unwrap();
        assert!(root.is_dir());
        assert_eq!(root, tmp.path().join("p"));
    }

    #[test]
    fn test_scope_serde_wire_form() {
        assert_eq!(serde_json::to_string(&Scope::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::from_str::<Scope>("\"project\"").unwrap(),
            Scope::Project
        );
    }
}

//! Optional TOML configuration.
//!
//! Two files are merged: `~/.agentry.toml` (user) under `./.agentry.toml`
//! (project, wins). Both are optional; a present-but-invalid file is a
//! hard error.

use crate::error::Result;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".agentry.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    /// Verbose mode (CLI flag, not stored in the config file).
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Scope used when no `--project` flag is given: "user" or "project".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Override for the user-scope root (tilde expanded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_root: Option<String>,

    /// Override for the project-scope root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateConfig {
    /// Back up locally modified copies before overwriting on update.
    #[serde(default)]
    pub preserve_custom: bool,
}

impl Config {
    /// Load and merge the user and project config files, either of which
    /// may be absent.
    pub fn load() -> Result<Self> {
        let user_path = std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(CONFIG_FILE));
        let project_path = std::env::current_dir()?.join(CONFIG_FILE);

        let mut config = Config::default();
        if let Some(path) = user_path {
            if let Some(user) = Self::read_file(&path)? {
                config = user;
            }
        }
        if let Some(project) = Self::read_file(&project_path)? {
            config = config.merged_with(project);
        }
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Project values win wherever they are explicitly set.
    fn merged_with(self, project: Config) -> Self {
        Config {
            defaults: DefaultsConfig {
                scope: project.defaults.scope.or(self.defaults.scope),
            },
            paths: PathsConfig {
                user_root: project.paths.user_root.or(self.paths.user_root),
                project_root: project.paths.project_root.or(self.paths.project_root),
            },
            update: UpdateConfig {
                preserve_custom: project.update.preserve_custom || self.update.preserve_custom,
            },
            verbose: self.verbose,
        }
    }

    /// Effective default scope: `project` only when configured so.
    pub fn default_scope(&self) -> crate::storage::Scope {
        match self.defaults.scope.as_deref() {
            Some("project") => crate::storage::Scope::Project,
            _ => crate::storage::Scope::User,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Tilde-expanded user root override, if configured.
    pub fn user_root(&self) -> Option<PathBuf> {
        self.paths.user_root.as_deref().and_then(expand_tilde)
    }

    /// Project root override, if configured.
    pub fn project_root(&self) -> Option<PathBuf> {
        self.paths.project_root.as_deref().and_then(expand_tilde)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_scope(), crate::storage::Scope::User);
        assert!(config.paths.user_root.is_none());
        assert!(!config.update.preserve_custom);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str("[update]\npreserve_custom = true\n").unwrap();
        assert!(config.update.preserve_custom);
        assert_eq!(config.default_scope(), crate::storage::Scope::User);
    }

    #[test]
    fn test_parse_paths() {
        let config: Config =
            toml::from_str("[paths]\nuser_root = \"/srv/agents\"\n").unwrap();
        assert_eq!(config.user_root(), Some(PathBuf::from("/srv/agents")));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result: std::result::Result<Config, _> = toml::from_str("defaults = nope");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_project_wins() {
        let user: Config =
            toml::from_str("[defaults]\nscope = \"user\"\n[paths]\nuser_root = \"/a\"\n").unwrap();
        let project: Config = toml::from_str("[defaults]\nscope = \"project\"\n").unwrap();
        let merged = user.merged_with(project);
        assert_eq!(merged.default_scope(), crate::storage::Scope::Project);
        // Unset project values fall back to the user file.
        assert_eq!(merged.paths.user_root.as_deref(), Some("/a"));
    }
}

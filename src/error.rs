use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentryError {
    #[error("No agent definition found for '{0}'")]
    DefinitionNotFound(String),

    #[error("Malformed definition {path}: {reason}")]
    MalformedDefinition { path: PathBuf, reason: String },

    #[error("Agent '{id}' is already installed in {scope} scope (use --force to overwrite)")]
    AlreadyInstalled { id: String, scope: String },

    #[error("Agent '{0}' is not installed")]
    NotInstalled(String),

    #[error("Agent '{id}' is already {state}")]
    AlreadyInState { id: String, state: String },

    #[error("Failed to write {path}: {source}")]
    MaterializationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {path} is unreadable: {reason}")]
    ManifestCorrupt { path: PathBuf, reason: String },

    #[error("Invalid identifier '{0}': must be 1-64 lowercase alphanumeric/hyphen characters")]
    InvalidIdentifier(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Manifest serialization error: {0}")]
    ManifestSerialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Home directory could not be determined (set HOME or AGENTRY_HOME)")]
    NoHomeDir,
}

impl AgentryError {
    /// Benign no-ops are reported as warnings and exit zero.
    /// Everything else is a hard error.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            AgentryError::AlreadyInstalled { .. }
                | AgentryError::NotInstalled(_)
                | AgentryError::AlreadyInState { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AgentryError>;

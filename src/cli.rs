use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agentry")]
#[command(about = "Install, sync, and manage markdown agent templates", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output including degraded-parse details
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration files
    Validate,

    /// Show effective configuration after merging all sources
    Show,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install an agent definition into a scope
    Install {
        /// Agent identifier
        id: String,

        /// Install into the project scope instead of the user scope
        #[arg(long)]
        project: bool,

        /// Overwrite an existing installation
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// List agents and their state
    List {
        /// Show only installed agents (manifest entries)
        #[arg(long, conflicts_with = "available")]
        installed: bool,

        /// Show only agents discovered on disk
        #[arg(long)]
        available: bool,

        /// Include disabled agents in the default view
        #[arg(long)]
        all: bool,
    },

    /// Enable an installed agent
    Enable {
        /// Agent identifier
        id: String,

        /// Operate on the project scope
        #[arg(long)]
        project: bool,
    },

    /// Disable an installed agent without removing it
    Disable {
        /// Agent identifier
        id: String,

        /// Operate on the project scope
        #[arg(long)]
        project: bool,
    },

    /// Remove an installed agent and its files
    Remove {
        /// Agent identifier
        id: String,

        /// Operate on the project scope
        #[arg(long)]
        project: bool,
    },

    /// Update installed agents from their source templates
    Update {
        /// Agent identifiers to update
        ids: Vec<String>,

        /// Update every installed agent in the scope
        #[arg(long)]
        all: bool,

        /// Operate on the project scope
        #[arg(long)]
        project: bool,

        /// Update even when the source version is not newer
        #[arg(short = 'f', long)]
        force: bool,

        /// Back up locally modified copies before overwriting
        #[arg(long = "preserve-custom")]
        preserve_custom: bool,
    },

    /// Reconcile on-disk definitions with the manifests
    #[command(name = "sync-processes", visible_alias = "sync")]
    SyncProcesses {
        /// Identifiers to register (selective sync)
        ids: Vec<String>,

        /// Register every unregistered definition
        #[arg(long, conflicts_with = "ids")]
        all: bool,

        /// Re-copy every registered definition into the project scope
        #[arg(long = "force-copy")]
        force_copy: bool,

        /// Only register definitions found in the project scope
        #[arg(long)]
        project: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

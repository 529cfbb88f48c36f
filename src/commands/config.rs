use crate::cli::ConfigCommands;
use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use std::path::PathBuf;

pub fn execute(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate => validate(),
        ConfigCommands::Show => show(),
    }
}

fn validate() -> Result<()> {
    let global_config = std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(CONFIG_FILE));
    let project_config = std::env::current_dir()?.join(CONFIG_FILE);

    println!("Validating configuration files...\n");

    if let Some(global) = &global_config {
        if global.exists() {
            println!("  Global config: {}", global.display());
        } else {
            println!("  Global config: {} - not found (optional)", global.display());
        }
    }
    if project_config.exists() {
        println!("  Project config: {}", project_config.display());
    } else {
        println!(
            "  Project config: {} - not found (optional)",
            project_config.display()
        );
    }

    println!("\nLoading and validating configuration...");
    match Config::load() {
        Ok(_) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(e) => {
            println!("Configuration is invalid.");
            println!("  Error: {}", e);
            Err(e)
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| crate::error::AgentryError::InvalidConfig(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

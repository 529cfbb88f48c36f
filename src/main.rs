#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use agentry::cli::{Cli, Commands};
use agentry::config::Config;
use agentry::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // config subcommands validate the files themselves; everything else
    // needs the merged config up front.
    if let Commands::Config { command } = &cli.command {
        return Ok(commands::config::execute(command)?);
    }

    let config = Config::load()?.with_verbose(cli.verbose);

    let result = match &cli.command {
        Commands::Install { id, project, force } => {
            commands::install::execute(&config, id, *project, *force)
        }
        Commands::List {
            installed,
            available,
            all,
        } => commands::list::execute(&config, *installed, *available, *all),
        Commands::Enable { id, project } => {
            commands::enable::execute(&config, id, *project, true)
        }
        Commands::Disable { id, project } => {
            commands::enable::execute(&config, id, *project, false)
        }
        Commands::Remove { id, project } => commands::remove::execute(&config, id, *project),
        Commands::Update {
            ids,
            all,
            project,
            force,
            preserve_custom,
        } => commands::update::execute(&config, ids, *all, *project, *force, *preserve_custom),
        Commands::SyncProcesses {
            ids,
            all,
            force_copy,
            project,
        } => commands::sync::execute(&config, ids, *all, *force_copy, *project),
        Commands::Config { .. } => unreachable!(),
    };

    match result {
        Ok(()) => Ok(()),
        // Benign no-ops ("already installed", "not installed", "already
        // enabled") warn and exit zero; they are not destructive.
        Err(e) if e.is_benign() => {
            eprintln!("Warning: {}", e);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

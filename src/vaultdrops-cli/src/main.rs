mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;

use cli::*;

fn main() -> Result<()> {
    let Cli {
        profile,
        catalog,
        command,
    } = Cli::parse();

    match command {
        Commands::Bosses { query } => {
            commands::bosses::handle(catalog.as_deref(), query.as_deref())?;
        }

        Commands::Tally { boss, command } => {
            commands::tally::handle(&profile, catalog.as_deref(), &boss, command)?;
        }

        Commands::Classmods { command } => {
            commands::classmods::handle(&profile, command)?;
        }

        Commands::Publish {
            tracker,
            server,
            dry_run,
        } => {
            let server = config::resolve_server(server.as_deref())?;
            commands::publish::handle(&profile, catalog.as_deref(), &tracker, &server, dry_run)?;
        }

        Commands::Community { tracker, server } => {
            let server = config::resolve_server(server.as_deref())?;
            commands::community::handle(catalog.as_deref(), &tracker, &server)?;
        }

        Commands::ClientId => {
            commands::client_id::handle(&profile)?;
        }

        Commands::Configure { server, show } => {
            commands::configure::handle(server, show)?;
        }
    }

    Ok(())
}

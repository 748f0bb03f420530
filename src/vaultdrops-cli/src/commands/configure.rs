//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up vaultdrops defaults.

use crate::config::{Config, DEFAULT_SERVER};
use anyhow::Result;

/// Handle the configure command
pub fn handle(server: Option<String>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config)?;
        return Ok(());
    }

    if let Some(url) = server {
        set_server(&mut config, url)?;
    } else {
        show_usage();
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) -> Result<()> {
    match config.get_server() {
        Some(url) => println!("Server: {}", url),
        None => println!("No server configured (default: {})", DEFAULT_SERVER),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }

    Ok(())
}

/// Set the server URL in configuration
fn set_server(config: &mut Config, url: String) -> Result<()> {
    config.set_server(url.clone());
    config.save()?;

    println!("Server configured: {}", url);
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: vaultdrops configure --server http://your-server:3030");
    println!("   or: vaultdrops configure --show");
    println!();
    println!("Note: publish and community look up the server from the --server");
    println!("      flag, the VAULTDROPS_SERVER env var, then this config file.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_usage_does_not_panic() {
        show_usage();
    }

    #[test]
    fn test_config_path_exists() {
        let result = Config::config_path();
        assert!(result.is_ok());
    }
}

//! Configuration management for the vaultdrops CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Fallback when no server is configured anywhere.
pub const DEFAULT_SERVER: &str = "http://localhost:3030";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub server: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("vaultdrops");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configured server URL or None if not set
    pub fn get_server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Set the server URL in config
    pub fn set_server(&mut self, server: String) {
        self.server = Some(server);
    }
}

/// Resolve the community server URL. The `--server` flag and the
/// VAULTDROPS_SERVER env var arrive through clap; after that the config
/// file wins, then the local default.
pub fn resolve_server(flag: Option<&str>) -> Result<String> {
    if let Some(server) = flag {
        return Ok(server.to_string());
    }

    let config = Config::load()?;
    Ok(config
        .server
        .unwrap_or_else(|| DEFAULT_SERVER.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_toml() {
        let path = Config::config_path().unwrap();
        assert!(path.ends_with("vaultdrops/config.toml"));
    }

    #[test]
    fn test_resolve_server_prefers_flag() {
        let server = resolve_server(Some("http://example.test:9999")).unwrap();
        assert_eq!(server, "http://example.test:9999");
    }
}

//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::classmods::ClassModsCommand;
use super::tally::TallyCommand;

#[derive(Parser)]
#[command(name = "vaultdrops")]
#[command(about = "Community drop-rate tracker for Borderlands 4", long_about = None)]
pub struct Cli {
    /// Path to the local profile database (can also set VAULTDROPS_PROFILE env var)
    #[arg(
        long,
        global = true,
        env = "VAULTDROPS_PROFILE",
        default_value = vaultdrops_store::DEFAULT_PROFILE_PATH
    )]
    pub profile: PathBuf,

    /// Path to a boss catalog manifest (uses the built-in catalog if not set)
    #[arg(long, global = true, env = "VAULTDROPS_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List or search trackable bosses and their dedicated drops
    #[command(visible_alias = "b")]
    Bosses {
        /// Search term matched against boss names, slugs and group members
        query: Option<String>,
    },

    /// Track kills for a boss (add, undo, show, reset)
    #[command(visible_alias = "t")]
    Tally {
        /// Boss slug or unique name fragment (e.g. "splaszone", "timekeeper")
        boss: String,

        #[command(subcommand)]
        command: TallyCommand,
    },

    /// Track class mod drops per character (4x4 matrix)
    #[command(visible_alias = "cm")]
    Classmods {
        #[command(subcommand)]
        command: ClassModsCommand,
    },

    /// Publish local counts to the community pool
    #[command(visible_alias = "p")]
    Publish {
        /// Boss slug or "classmods"
        tracker: String,

        /// Community server URL (can also set VAULTDROPS_SERVER env var)
        #[arg(long, env = "VAULTDROPS_SERVER")]
        server: Option<String>,

        /// Print the payload without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show community drop-rate estimates for a tracker
    #[command(visible_alias = "stats")]
    Community {
        /// Boss slug or "classmods"
        tracker: String,

        /// Community server URL (can also set VAULTDROPS_SERVER env var)
        #[arg(long, env = "VAULTDROPS_SERVER")]
        server: Option<String>,
    },

    /// Print the anonymous client id used for submissions
    ClientId,

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default community server URL
        #[arg(long)]
        server: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

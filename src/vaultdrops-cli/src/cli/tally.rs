//! CLI definitions for the tally command

use clap::Subcommand;

#[derive(Subcommand)]
pub enum TallyCommand {
    /// Record a kill and what it dropped
    Add {
        /// Column index, drop name, or unique name prefix ("no-drop" or 0 for a blank kill)
        #[arg(required = true, num_args = 1..)]
        drop: Vec<String>,
    },

    /// Take back a mistaken entry (counts never go below zero)
    Undo {
        /// Column index, drop name, or unique name prefix
        #[arg(required = true, num_args = 1..)]
        drop: Vec<String>,
    },

    /// Show local counts with observed rates
    Show,

    /// Clear all local counts for this boss
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

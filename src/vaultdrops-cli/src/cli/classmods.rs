//! CLI definitions for the classmods command

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ClassModsCommand {
    /// Record a class mod drop
    Add {
        /// Character you were playing (Vex, Rafa, Amon, Harlowe)
        played: String,

        /// Character the class mod is for
        dropped: String,
    },

    /// Take back a mistaken entry (counts never go below zero)
    Undo {
        /// Character you were playing
        played: String,

        /// Character the class mod is for
        dropped: String,
    },

    /// Mark the character column you are hunting mods for ("none" to clear)
    Use {
        /// Character name or "none"
        character: String,
    },

    /// Show the drop matrix with per-character rates
    Show,

    /// Clear the whole matrix
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

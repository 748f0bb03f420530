//! CLI argument definitions for vaultdrops
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod classmods;
mod core;
mod tally;

pub use classmods::ClassModsCommand;
pub use core::{Cli, Commands};
pub use tally::TallyCommand;

//! Command handlers for the vaultdrops CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod bosses;
pub mod classmods;
pub mod client_id;
pub mod community;
pub mod configure;
pub mod helpers;
pub mod publish;
pub mod tally;

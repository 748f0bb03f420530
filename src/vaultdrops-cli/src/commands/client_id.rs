//! Anonymous client id handler

use super::helpers;
use anyhow::Result;
use std::path::Path;
use vaultdrops_store::TallyStore;

/// Print the anonymous client id, creating one on first use.
pub fn handle(profile: &Path) -> Result<()> {
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);
    println!("{}", store.client_id());
    Ok(())
}

//! Boss catalog listing and search

use super::helpers;
use anyhow::Result;
use std::path::Path;
use vaultdrops::BossEntry;

/// Handle the bosses command
pub fn handle(catalog_path: Option<&Path>, query: Option<&str>) -> Result<()> {
    let catalog = helpers::load_catalog(catalog_path)?;

    let entries: Vec<&BossEntry> = match query {
        Some(q) => catalog.search(q),
        None => catalog.bosses().collect(),
    };

    if entries.is_empty() {
        println!("No bosses match '{}'", query.unwrap_or_default());
        println!("\nTry a partial name like 'time' or 'vile'");
        return Ok(());
    }

    println!("{:<28} {:<28} {}", "Slug", "Boss", "Dedicated drops");
    println!("{}", "-".repeat(76));

    for entry in entries {
        println!(
            "{:<28} {:<28} {}",
            entry.slug,
            entry.name,
            entry.drops.join(", ")
        );
        if entry.is_group() {
            println!("{:<28} {:<28} members: {}", "", "", entry.members.join(", "));
        }
    }

    Ok(())
}

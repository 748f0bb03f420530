//! Shared helpers for command handlers

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::Path;
use vaultdrops::{character_index, BossEntry, Catalog, TrackerDef, CHARACTERS, NO_DROP_COLUMN};
use vaultdrops_store::ProfileDb;

/// Open (and initialize) the local profile database, creating parent
/// directories as needed.
pub fn open_profile(path: &Path) -> Result<ProfileDb> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create profile directory at {}", parent.display())
            })?;
        }
    }

    let db = ProfileDb::open(path)
        .with_context(|| format!("Failed to open profile at {}", path.display()))?;
    db.init().context("Failed to initialize profile database")?;
    Ok(db)
}

/// Load the boss catalog from `--catalog`, or fall back to the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => Catalog::load(p)
            .with_context(|| format!("Failed to load catalog from {}", p.display())),
        None => Ok(Catalog::embedded().clone()),
    }
}

/// Resolve a boss by slug, exact name, or unique search hit.
pub fn resolve_boss<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a BossEntry> {
    if let Some(entry) = catalog.get(name) {
        return Ok(entry);
    }

    let hits = catalog.search(name);
    match hits.len() {
        1 => Ok(hits[0]),
        0 => bail!(
            "Unknown boss '{}'. Try 'vaultdrops bosses' to list trackable bosses.",
            name
        ),
        _ => {
            let names: Vec<&str> = hits.iter().map(|e| e.slug.as_str()).collect();
            bail!("'{}' matches more than one boss: {}", name, names.join(", "))
        }
    }
}

/// Resolve a tracker name: "classmods" or a boss from the catalog.
pub fn resolve_tracker(catalog: &Catalog, name: &str) -> Result<TrackerDef> {
    if name.eq_ignore_ascii_case(vaultdrops::CLASS_MODS_TRACKER_ID) {
        return Ok(TrackerDef::class_mods());
    }
    Ok(resolve_boss(catalog, name)?.tracker())
}

/// Resolve a drop argument to a column index: a number, "no-drop", an exact
/// column name, or a unique case-insensitive prefix.
pub fn resolve_column(entry: &BossEntry, input: &str) -> Result<usize> {
    let columns = entry.columns();

    if let Ok(index) = input.parse::<usize>() {
        if index < columns.len() {
            return Ok(index);
        }
        bail!(
            "{} has columns 0..{} ({} got {})",
            entry.name,
            columns.len() - 1,
            column_listing(&columns),
            index
        );
    }

    let needle = input.to_lowercase();
    if matches!(needle.as_str(), "no-drop" | "nodrop" | "none") {
        return Ok(NO_DROP_COLUMN);
    }

    if let Some(index) = columns.iter().position(|c| c.to_lowercase() == needle) {
        return Ok(index);
    }

    let hits: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.to_lowercase().starts_with(&needle))
        .map(|(i, _)| i)
        .collect();

    match hits.len() {
        1 => Ok(hits[0]),
        0 => bail!(
            "No drop called '{}' for {}. Columns: {}",
            input,
            entry.name,
            column_listing(&columns)
        ),
        _ => {
            let names: Vec<&str> = hits.iter().map(|&i| columns[i].as_str()).collect();
            bail!("'{}' is ambiguous: {}", input, names.join(", "))
        }
    }
}

/// Resolve a character argument to a matrix index by exact name or unique
/// prefix.
pub fn resolve_character(input: &str) -> Result<usize> {
    if let Some(index) = character_index(input) {
        return Ok(index);
    }

    let needle = input.to_lowercase();
    let hits: Vec<usize> = CHARACTERS
        .iter()
        .enumerate()
        .filter(|(_, c)| c.to_lowercase().starts_with(&needle))
        .map(|(i, _)| i)
        .collect();

    match hits.len() {
        1 => Ok(hits[0]),
        _ => bail!(
            "Unknown character '{}'. Characters: {}",
            input,
            CHARACTERS.join(", ")
        ),
    }
}

fn column_listing(columns: &[String]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}={}", i, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt user for confirmation
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

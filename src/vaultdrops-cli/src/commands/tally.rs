//! Local boss tally handlers

use super::helpers;
use crate::cli::TallyCommand;
use anyhow::Result;
use std::path::Path;
use vaultdrops::{BossEntry, TallyCounts};
use vaultdrops_store::TallyStore;

/// Handle the tally command
pub fn handle(
    profile: &Path,
    catalog_path: Option<&Path>,
    boss: &str,
    command: TallyCommand,
) -> Result<()> {
    let catalog = helpers::load_catalog(catalog_path)?;
    let entry = helpers::resolve_boss(&catalog, boss)?;

    match command {
        TallyCommand::Add { drop } => apply(profile, entry, &drop.join(" "), 1),
        TallyCommand::Undo { drop } => apply(profile, entry, &drop.join(" "), -1),
        TallyCommand::Show => show(profile, entry),
        TallyCommand::Reset { yes } => reset(profile, entry, yes),
    }
}

fn apply(profile: &Path, entry: &BossEntry, drop: &str, delta: i64) -> Result<()> {
    let column = helpers::resolve_column(entry, drop)?;
    let tracker = entry.tracker();

    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);

    let mut counts = store.load_tally(&tracker);
    let before = counts.get(column);
    counts.apply(column, delta);
    store.save_tally(&tracker, &counts);

    let labels = entry.columns();
    if delta < 0 && before == 0 {
        println!("{}: {} was already 0", entry.name, labels[column]);
    } else {
        println!(
            "{}: {} = {} ({} kills total)",
            entry.name,
            labels[column],
            counts.get(column),
            counts.total()
        );
    }

    Ok(())
}

fn show(profile: &Path, entry: &BossEntry) -> Result<()> {
    let tracker = entry.tracker();
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);
    let counts = store.load_tally(&tracker);

    if counts.is_empty() {
        println!("No kills recorded for {} yet", entry.name);
        println!(
            "\nTry 'vaultdrops tally {} add <drop>' after your next kill",
            entry.slug
        );
        return Ok(());
    }

    print_tally(entry, &counts);
    Ok(())
}

fn print_tally(entry: &BossEntry, counts: &TallyCounts) {
    let total = counts.total();
    println!("{} — {} kills recorded\n", entry.name, total);

    println!("{:>3}  {:<28} {:>6} {:>8}", "#", "Drop", "Count", "Rate");
    println!("{}", "-".repeat(50));

    for (index, label) in entry.columns().iter().enumerate() {
        let count = counts.get(index);
        println!(
            "{:>3}  {:<28} {:>6} {:>7.1}%",
            index,
            label,
            count,
            percent(count, total)
        );
    }

    let dedicated = counts.dedicated_total();
    println!("{}", "-".repeat(50));
    println!(
        "{:>3}  {:<28} {:>6} {:>7.1}%",
        "",
        "Any dedicated drop",
        dedicated,
        percent(dedicated, total)
    );
}

fn reset(profile: &Path, entry: &BossEntry, yes: bool) -> Result<()> {
    let tracker = entry.tracker();
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);

    let counts = store.load_tally(&tracker);
    if counts.is_empty() {
        println!("Nothing to reset for {}", entry.name);
        return Ok(());
    }

    if !yes {
        let prompt = format!(
            "Clear {} recorded kills for {}?",
            counts.total(),
            entry.name
        );
        if !helpers::confirm(&prompt)? {
            return Ok(());
        }
    }

    store.clear(&tracker);
    println!("Cleared local tally for {}", entry.name);
    Ok(())
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultdrops::NO_DROP_COLUMN;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(3, 12), 25.0);
    }

    #[test]
    fn test_print_tally_does_not_panic() {
        let entry = BossEntry {
            name: "Splaszone".to_string(),
            slug: "splaszone".to_string(),
            drops: vec!["Jelly".to_string()],
            members: vec![],
        };
        let mut counts = TallyCounts::default();
        counts.increment(NO_DROP_COLUMN);
        counts.increment(1);
        print_tally(&entry, &counts);
    }
}

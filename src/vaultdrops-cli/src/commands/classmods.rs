//! Class-mod matrix handlers

use super::helpers;
use crate::cli::ClassModsCommand;
use anyhow::Result;
use std::path::Path;
use vaultdrops::{MatrixCounts, TrackerDef, CHARACTERS, MATRIX_DIM};
use vaultdrops_store::TallyStore;

/// Handle the classmods command
pub fn handle(profile: &Path, command: ClassModsCommand) -> Result<()> {
    match command {
        ClassModsCommand::Add { played, dropped } => apply(profile, &played, &dropped, 1),
        ClassModsCommand::Undo { played, dropped } => apply(profile, &played, &dropped, -1),
        ClassModsCommand::Use { character } => set_active(profile, &character),
        ClassModsCommand::Show => show(profile),
        ClassModsCommand::Reset { yes } => reset(profile, yes),
    }
}

fn apply(profile: &Path, played: &str, dropped: &str, delta: i64) -> Result<()> {
    let row = helpers::resolve_character(played)?;
    let col = helpers::resolve_character(dropped)?;
    let tracker = TrackerDef::class_mods();

    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);

    let mut matrix = store.load_matrix(&tracker);
    let before = matrix.get(row, col);
    matrix.apply(row, col, delta);
    store.save_matrix(&tracker, &matrix);

    if delta < 0 && before == 0 {
        println!(
            "{} -> {} was already 0",
            CHARACTERS[row], CHARACTERS[col]
        );
    } else {
        println!(
            "Playing {}: {} class mods for {} ({} drops total)",
            CHARACTERS[row],
            matrix.get(row, col),
            CHARACTERS[col],
            matrix.grand_total()
        );
    }

    Ok(())
}

fn set_active(profile: &Path, character: &str) -> Result<()> {
    let column = if character.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(helpers::resolve_character(character)?)
    };

    let tracker = TrackerDef::class_mods();
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);

    let mut matrix = store.load_matrix(&tracker);
    matrix.set_active_column(column);
    store.save_matrix(&tracker, &matrix);

    match column {
        Some(col) => println!("Hunting class mods for {}", CHARACTERS[col]),
        None => println!("Cleared hunted character"),
    }
    Ok(())
}

fn show(profile: &Path) -> Result<()> {
    let tracker = TrackerDef::class_mods();
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);
    let matrix = store.load_matrix(&tracker);

    if matrix.is_empty() {
        println!("No class mod drops recorded yet");
        println!("\nTry 'vaultdrops classmods add <played> <dropped>' after your next drop");
        return Ok(());
    }

    print_matrix(&matrix);
    Ok(())
}

fn print_matrix(matrix: &MatrixCounts) {
    println!("Class mods — {} drops recorded", matrix.grand_total());
    if let Some(col) = matrix.active_column() {
        println!("Hunting mods for {}", CHARACTERS[col]);
    }
    println!();

    print!("{:<10}", "Playing");
    for character in CHARACTERS {
        print!(" {:>9}", character);
    }
    println!(" {:>9}", "Total");
    println!("{}", "-".repeat(10 + 10 * (MATRIX_DIM + 1)));

    for row in 0..MATRIX_DIM {
        print!("{:<10}", CHARACTERS[row]);
        for col in 0..MATRIX_DIM {
            print!(" {:>9}", matrix.get(row, col));
        }
        println!(" {:>9}", matrix.row_total(row));
    }

    // share of each character's drops that matched the character played
    println!();
    for row in 0..MATRIX_DIM {
        let trials = matrix.row_total(row);
        if trials == 0 {
            continue;
        }
        let own = matrix.get(row, row);
        println!(
            "Playing {:<8} {:>4} of {:>4} mods were their own ({:.1}%)",
            CHARACTERS[row],
            own,
            trials,
            own as f64 / trials as f64 * 100.0
        );
    }
}

fn reset(profile: &Path, yes: bool) -> Result<()> {
    let tracker = TrackerDef::class_mods();
    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);

    let matrix = store.load_matrix(&tracker);
    if matrix.is_empty() {
        println!("Nothing to reset");
        return Ok(());
    }

    if !yes {
        let prompt = format!(
            "Clear {} recorded class mod drops?",
            matrix.grand_total()
        );
        if !helpers::confirm(&prompt)? {
            return Ok(());
        }
    }

    // reset() keeps the hunted column; only the cells go
    let mut cleared = matrix;
    cleared.reset();
    store.save_matrix(&tracker, &cleared);
    println!("Cleared class mod matrix");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_matrix_does_not_panic() {
        let mut matrix = MatrixCounts::new();
        matrix.increment(0, 0);
        matrix.increment(0, 3);
        matrix.increment(2, 1);
        matrix.set_active_column(Some(3));
        print_matrix(&matrix);
    }
}

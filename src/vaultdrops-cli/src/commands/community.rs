//! Community aggregate display

use super::helpers;
use anyhow::{bail, Result};
use serde_json::Value;
use std::path::Path;
use vaultdrops::AggregateError;

/// Handle the community command
pub fn handle(catalog_path: Option<&Path>, tracker_name: &str, server: &str) -> Result<()> {
    let catalog = helpers::load_catalog(catalog_path)?;

    // Fall back to the raw name for trackers this catalog does not know;
    // the server may still aggregate them and sends its own labels.
    let tracker_id = match helpers::resolve_tracker(&catalog, tracker_name) {
        Ok(tracker) => tracker
            .community_id
            .unwrap_or_else(|| tracker_name.to_string()),
        Err(_) => tracker_name.to_string(),
    };

    match fetch_aggregate(server, &tracker_id) {
        Ok(aggregate) => {
            print_aggregate(&aggregate);
            Ok(())
        }
        Err(e) => Err(AggregateError::FetchFailed(e.to_string()).into()),
    }
}

/// GET a tracker's aggregate from the community server.
pub fn fetch_aggregate(server: &str, tracker_id: &str) -> Result<Value> {
    let url = format!(
        "{}/trackers/{}/aggregate",
        server.trim_end_matches('/'),
        urlencoding::encode(tracker_id)
    );

    match ureq::get(&url).call() {
        Ok(resp) => Ok(resp.into_json()?),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("server returned {}: {}", code, body)
        }
        Err(e) => bail!("request failed: {}", e),
    }
}

/// Render an aggregate response from the server.
pub fn print_aggregate(aggregate: &Value) {
    if aggregate["shape"].as_str() == Some("matrix") {
        print_matrix_aggregate(aggregate);
    } else {
        print_flat_aggregate(aggregate);
    }
}

fn print_flat_aggregate(aggregate: &Value) {
    let tracker = aggregate["tracker_id"].as_str().unwrap_or("?");
    let trials = aggregate["trials"].as_u64().unwrap_or(0);
    let clients = aggregate["clients"].as_u64().unwrap_or(0);

    println!("Community rates for '{}'", tracker);
    println!("{} kills from {} hunters", trials, clients);
    if let Some(skipped) = aggregate["skipped"].as_u64() {
        if skipped > 0 {
            println!("({} malformed submissions skipped)", skipped);
        }
    }
    println!();

    if trials == 0 {
        println!("No community data yet for this tracker");
        return;
    }

    println!("{:<28} {:>7} {:>8} {:>8}", "Drop", "Count", "Rate", "+/-");
    println!("{}", "-".repeat(54));

    if let Some(outcomes) = aggregate["outcomes"].as_array() {
        for outcome in outcomes {
            print_estimate_row(
                outcome["label"].as_str().unwrap_or("?"),
                outcome["count"].as_u64().unwrap_or(0),
                outcome,
            );
        }
    }

    let dedicated = &aggregate["dedicated"];
    if dedicated.is_object() {
        println!("{}", "-".repeat(54));
        print_estimate_row(
            "Any dedicated drop",
            dedicated["count"].as_u64().unwrap_or(0),
            dedicated,
        );
    }
}

fn print_matrix_aggregate(aggregate: &Value) {
    let trials = aggregate["trials"].as_u64().unwrap_or(0);
    let clients = aggregate["clients"].as_u64().unwrap_or(0);

    println!("Community class mod rates");
    println!("{} drops from {} hunters", trials, clients);
    if let Some(skipped) = aggregate["skipped"].as_u64() {
        if skipped > 0 {
            println!("({} malformed submissions skipped)", skipped);
        }
    }
    println!();

    if trials == 0 {
        println!("No community data yet for class mods");
        return;
    }

    let Some(rows) = aggregate["rows"].as_array() else {
        return;
    };

    for row in rows {
        let character = row["character"].as_str().unwrap_or("?");
        let row_trials = row["trials"].as_u64().unwrap_or(0);
        println!("Playing {} ({} drops):", character, row_trials);

        if let Some(cells) = row["cells"].as_array() {
            for cell in cells {
                print_estimate_row(
                    cell["character"].as_str().unwrap_or("?"),
                    cell["count"].as_u64().unwrap_or(0),
                    cell,
                );
            }
        }
        println!();
    }
}

fn print_estimate_row(label: &str, count: u64, estimate: &Value) {
    let point = estimate["point"].as_f64().unwrap_or(0.0);
    let moe = estimate["moe"].as_f64().unwrap_or(0.0);
    println!(
        "{:<28} {:>7} {:>7.1}% {:>7.1}%",
        label,
        count,
        point * 100.0,
        moe * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_print_flat_aggregate_does_not_panic() {
        let aggregate = json!({
            "tracker_id": "splaszone",
            "shape": "flat",
            "trials": 10,
            "clients": 2,
            "skipped": 1,
            "outcomes": [
                {"column": 0, "label": "No drop", "count": 7,
                 "point": 0.7, "lower": 0.39, "upper": 0.89, "moe": 0.19},
                {"column": 1, "label": "Jelly", "count": 3,
                 "point": 0.3, "lower": 0.10, "upper": 0.60, "moe": 0.30}
            ],
            "dedicated": {"count": 3, "point": 0.3, "lower": 0.10,
                          "upper": 0.60, "moe": 0.30}
        });
        print_aggregate(&aggregate);
    }

    #[test]
    fn test_print_matrix_aggregate_does_not_panic() {
        let aggregate = json!({
            "tracker_id": "classmods",
            "shape": "matrix",
            "trials": 6,
            "clients": 1,
            "skipped": 0,
            "characters": ["Vex", "Rafa", "Amon", "Harlowe"],
            "rows": [
                {"character": "Vex", "trials": 6, "cells": [
                    {"character": "Vex", "count": 3, "point": 0.5,
                     "lower": 0.18, "upper": 0.81, "moe": 0.31},
                    {"character": "Rafa", "count": 3, "point": 0.5,
                     "lower": 0.18, "upper": 0.81, "moe": 0.31},
                    {"character": "Amon", "count": 0, "point": 0.0,
                     "lower": 0.0, "upper": 0.39, "moe": 0.39},
                    {"character": "Harlowe", "count": 0, "point": 0.0,
                     "lower": 0.0, "upper": 0.39, "moe": 0.39}
                ]}
            ]
        });
        print_aggregate(&aggregate);
    }

    #[test]
    fn test_print_aggregate_empty() {
        print_aggregate(&json!({
            "tracker_id": "splaszone", "shape": "flat",
            "trials": 0, "clients": 0, "skipped": 0, "outcomes": []
        }));
    }
}

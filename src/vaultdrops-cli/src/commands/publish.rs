//! Publish local counts to the community pool

use super::{community, helpers};
use anyhow::Result;
use std::path::Path;
use vaultdrops::{PublishError, Submission, TrackerShape};
use vaultdrops_store::TallyStore;

/// Handle the publish command
pub fn handle(
    profile: &Path,
    catalog_path: Option<&Path>,
    tracker_name: &str,
    server: &str,
    dry_run: bool,
) -> Result<()> {
    let catalog = helpers::load_catalog(catalog_path)?;
    let tracker = helpers::resolve_tracker(&catalog, tracker_name)?;

    let db = helpers::open_profile(profile)?;
    let store = TallyStore::new(&db);
    let client_id = store.client_id();

    // Local guards run before any network I/O: an empty tally or an
    // unlinked tracker never produces a request.
    let submission = match tracker.shape {
        TrackerShape::Flat { .. } => {
            let counts = store.load_tally(&tracker);
            Submission::from_tally(&tracker, &client_id, &counts)?
        }
        TrackerShape::Matrix => {
            let counts = store.load_matrix(&tracker);
            Submission::from_matrix(&tracker, &client_id, &counts)?
        }
    };

    if dry_run {
        println!("Would publish to {}:", server);
        println!("{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    println!(
        "Publishing {} trials for '{}' to {}",
        submission.total_trials, submission.tracker_id, server
    );

    send(server, &submission)?;

    // Refresh is best-effort: the publish already succeeded, so a fetch
    // failure only warns.
    println!();
    match community::fetch_aggregate(server, &submission.tracker_id) {
        Ok(aggregate) => community::print_aggregate(&aggregate),
        Err(e) => println!("Warning: could not refresh community stats: {}", e),
    }

    Ok(())
}

fn send(server: &str, submission: &Submission) -> Result<()> {
    let url = format!("{}/submissions", server.trim_end_matches('/'));

    let response = ureq::post(&url)
        .set("Content-Type", "application/json")
        .send_json(submission);

    match response {
        Ok(resp) => {
            let result: serde_json::Value = resp.into_json()?;
            let revision = result["revision"].as_i64().unwrap_or(0);
            if result["created"].as_bool().unwrap_or(false) {
                println!("Submission created (revision {})", revision);
            } else {
                println!("Submission replaced (revision {})", revision);
            }
            Ok(())
        }
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(PublishError::Failed(format!("server returned {}: {}", code, body)).into())
        }
        Err(e) => Err(PublishError::Failed(e.to_string()).into()),
    }
}

//! Community submission records
//!
//! A submission is one client's current snapshot for one tracker. The
//! community store keeps at most one live record per
//! `(tracker_id, client_id)`: re-publishing replaces the previous snapshot
//! outright, it never merges. Local counters are the source of truth and are
//! never mutated by publishing.
//!
//! Validation happens here, before any network or storage I/O, so a doomed
//! publish never leaves the process.

use crate::matrix::MatrixCounts;
use crate::tally::TallyCounts;
use crate::tracker::TrackerDef;
use serde::{Deserialize, Serialize};

/// Why a publish was rejected or failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// Zero recorded kills; there is nothing to share.
    #[error("nothing to publish: no kills recorded yet")]
    EmptySubmission,

    /// The tracker is local-only (no community id), e.g. a custom tracker.
    #[error("tracker is not linked to the community pool")]
    MissingTrackerId,

    /// The snapshot was valid but the remote upsert failed. The message is
    /// surfaced to the user; local counts are untouched.
    #[error("publish failed: {0}")]
    Failed(String),
}

/// One client's live snapshot for one tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub tracker_id: String,
    pub client_id: String,
    /// Canonical counts snapshot: a `{"<col>": n}` object for flat
    /// trackers, a bare 4x4 array for the class-mod matrix.
    pub counts: serde_json::Value,
    /// Sum of all cells at publish time.
    pub total_trials: u64,
    /// RFC 3339 UTC timestamp.
    pub submitted_at: String,
}

impl Submission {
    /// Build a submission from a flat tally. Fails fast on an empty tally
    /// or a tracker with no community id; neither failure touches I/O.
    pub fn from_tally(
        tracker: &TrackerDef,
        client_id: &str,
        counts: &TallyCounts,
    ) -> Result<Self, PublishError> {
        if counts.is_empty() {
            return Err(PublishError::EmptySubmission);
        }
        Self::new_checked(tracker, client_id, counts.to_snapshot(), counts.total())
    }

    /// Build a submission from the class-mod matrix. Same guards as
    /// [`Self::from_tally`]; the snapshot is the full 4x4 matrix.
    pub fn from_matrix(
        tracker: &TrackerDef,
        client_id: &str,
        counts: &MatrixCounts,
    ) -> Result<Self, PublishError> {
        if counts.is_empty() {
            return Err(PublishError::EmptySubmission);
        }
        Self::new_checked(tracker, client_id, counts.to_snapshot(), counts.grand_total())
    }

    fn new_checked(
        tracker: &TrackerDef,
        client_id: &str,
        counts: serde_json::Value,
        total_trials: u64,
    ) -> Result<Self, PublishError> {
        let tracker_id = tracker
            .community_id
            .clone()
            .ok_or(PublishError::MissingTrackerId)?;
        Ok(Self {
            tracker_id,
            client_id: client_id.to_string(),
            counts,
            total_trials,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

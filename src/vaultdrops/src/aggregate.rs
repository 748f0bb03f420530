//! Community aggregation
//!
//! Pure reductions from a set of live submissions to community-wide counts
//! and Wilson estimates. Fetching is someone else's job (the CLI pulls over
//! HTTP, the server reads its own store); these functions just sum whatever
//! live records they are handed and are recomputed on every call, never
//! persisted.
//!
//! Submissions are untrusted input. Each record's snapshot goes through the
//! validating decode of its tracker shape; records that fail are skipped and
//! counted, and can never abort an aggregation.

use crate::matrix::{MatrixCounts, MATRIX_DIM};
use crate::stats::{wilson, Estimate};
use crate::submission::Submission;
use crate::tally::{TallyCounts, NO_DROP_COLUMN};
use crate::tracker::TrackerDef;
use std::collections::BTreeMap;

/// Why a community view could not be refreshed. The previous view, if any,
/// stays valid; callers decide whether to keep showing it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("failed to fetch community records: {0}")]
    FetchFailed(String),
}

/// One labelled outcome column of a flat aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRow {
    pub column: usize,
    pub label: String,
    pub count: u64,
    pub estimate: Estimate,
}

/// Community-wide totals for a flat tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatAggregate {
    /// Sum of every cell of every valid record, labelled or not.
    pub trials: u64,
    /// Valid records that contributed.
    pub clients: usize,
    /// Records dropped by shape validation.
    pub skipped: usize,
    /// One row per tracker column, in column order.
    pub outcomes: Vec<OutcomeRow>,
    /// Kills that dropped anything dedicated (trials minus the baseline).
    pub dedicated_count: u64,
    pub dedicated: Estimate,
}

impl FlatAggregate {
    /// Sum live records for a flat tracker.
    ///
    /// Cells with column indices beyond the tracker's column list still
    /// count toward `trials` and the dedicated total (the catalog may have
    /// shrunk since the record was published); they just get no labelled
    /// row of their own. Counts are untrusted, so cell and trial sums
    /// saturate at `u64::MAX` instead of wrapping or panicking.
    pub fn from_records(tracker: &TrackerDef, records: &[Submission]) -> Self {
        let columns: &[String] = tracker.columns().unwrap_or(&[]);

        let mut summed: BTreeMap<usize, u64> = BTreeMap::new();
        let mut clients = 0usize;
        let mut skipped = 0usize;

        for record in records {
            match TallyCounts::from_snapshot(&record.counts) {
                Some(counts) => {
                    clients += 1;
                    for (col, count) in counts.cells() {
                        let cell = summed.entry(col).or_insert(0);
                        *cell = cell.saturating_add(count);
                    }
                }
                None => skipped += 1,
            }
        }

        let trials = summed
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count));
        let baseline = summed.get(&NO_DROP_COLUMN).copied().unwrap_or(0);
        let dedicated_count = trials.saturating_sub(baseline);

        let outcomes = columns
            .iter()
            .enumerate()
            .map(|(column, label)| {
                let count = summed.get(&column).copied().unwrap_or(0);
                OutcomeRow {
                    column,
                    label: label.clone(),
                    count,
                    estimate: wilson(count, trials),
                }
            })
            .collect();

        Self {
            trials,
            clients,
            skipped,
            outcomes,
            dedicated_count,
            dedicated: wilson(dedicated_count, trials),
        }
    }
}

/// Community-wide totals for the class-mod matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixAggregate {
    pub cells: [[u64; MATRIX_DIM]; MATRIX_DIM],
    pub row_trials: [u64; MATRIX_DIM],
    pub clients: usize,
    pub skipped: usize,
}

impl MatrixAggregate {
    /// Sum live class-mod records. Each row (character played) is its own
    /// binomial family, so trials are tracked per row. Same saturating
    /// arithmetic as the flat shape: untrusted counts cannot abort the
    /// aggregation.
    pub fn from_records(records: &[Submission]) -> Self {
        let mut cells = [[0u64; MATRIX_DIM]; MATRIX_DIM];
        let mut clients = 0usize;
        let mut skipped = 0usize;

        for record in records {
            match MatrixCounts::from_snapshot(&record.counts) {
                Some(counts) => {
                    clients += 1;
                    for (r, row) in cells.iter_mut().enumerate() {
                        for (c, cell) in row.iter_mut().enumerate() {
                            *cell = cell.saturating_add(counts.get(r, c));
                        }
                    }
                }
                None => skipped += 1,
            }
        }

        let mut row_trials = [0u64; MATRIX_DIM];
        for (r, trials) in row_trials.iter_mut().enumerate() {
            *trials = cells[r]
                .iter()
                .fold(0u64, |acc, cell| acc.saturating_add(*cell));
        }

        Self {
            cells,
            row_trials,
            clients,
            skipped,
        }
    }

    pub fn grand_total(&self) -> u64 {
        self.row_trials
            .iter()
            .fold(0u64, |acc, trials| acc.saturating_add(*trials))
    }

    /// Wilson estimate for one cell against its row's trials.
    pub fn estimate(&self, row: usize, col: usize) -> Estimate {
        if row >= MATRIX_DIM || col >= MATRIX_DIM {
            return Estimate::ZERO;
        }
        wilson(self.cells[row][col], self.row_trials[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BossEntry;
    use serde_json::json;

    fn tracker() -> TrackerDef {
        TrackerDef::boss(&BossEntry {
            name: "Splaszone".to_string(),
            slug: "splaszone".to_string(),
            drops: vec!["ItemA".to_string(), "ItemB".to_string()],
            members: vec![],
        })
    }

    fn record(client: &str, counts: serde_json::Value) -> Submission {
        let total = counts
            .as_object()
            .map(|m| {
                m.values()
                    .filter_map(|v| v.as_u64())
                    .fold(0u64, |acc, v| acc.saturating_add(v))
            })
            .unwrap_or(0);
        Submission {
            tracker_id: "splaszone".to_string(),
            client_id: client.to_string(),
            counts,
            total_trials: total,
            submitted_at: "2026-01-10T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_single_client_aggregate() {
        // 10 kills: 7 blanks, 2 ItemA, 1 ItemB
        let records = vec![record("vd_a", json!({"0": 7, "1": 2, "2": 1}))];
        let agg = FlatAggregate::from_records(&tracker(), &records);

        assert_eq!(agg.trials, 10);
        assert_eq!(agg.clients, 1);
        assert_eq!(agg.skipped, 0);
        assert_eq!(agg.outcomes.len(), 3);

        let item_a = &agg.outcomes[1];
        assert_eq!(item_a.label, "ItemA");
        assert_eq!(item_a.count, 2);
        assert!((item_a.estimate.percent() - 20.0).abs() < 1e-9);

        assert_eq!(agg.dedicated_count, 3);
        assert!((agg.dedicated.percent() - 30.0).abs() < 1e-9);
        assert!(agg.dedicated.moe > 0.0);
    }

    #[test]
    fn test_two_clients_summed() {
        let records = vec![
            record("vd_a", json!({"0": 7, "1": 2, "2": 1})),
            record("vd_b", json!({"0": 3, "2": 2})),
        ];
        let agg = FlatAggregate::from_records(&tracker(), &records);

        assert_eq!(agg.trials, 15);
        assert_eq!(agg.clients, 2);

        let item_b = &agg.outcomes[2];
        assert_eq!(item_b.count, 3);
        assert!((item_b.estimate.point - 0.2).abs() < 1e-12);
        assert!(item_b.estimate.moe > 0.0);
    }

    #[test]
    fn test_malformed_record_skipped() {
        let records = vec![
            record("vd_a", json!({"0": 5, "1": 1})),
            record("vd_bad", json!([1, 2, 3])),
            record("vd_worse", json!({"0": -4})),
        ];
        let agg = FlatAggregate::from_records(&tracker(), &records);

        assert_eq!(agg.clients, 1);
        assert_eq!(agg.skipped, 2);
        assert_eq!(agg.trials, 6);
    }

    #[test]
    fn test_unlabelled_columns_still_count() {
        // catalog has 3 columns; an old record has a column 9
        let records = vec![record("vd_a", json!({"0": 5, "9": 5}))];
        let agg = FlatAggregate::from_records(&tracker(), &records);

        assert_eq!(agg.trials, 10);
        assert_eq!(agg.outcomes.len(), 3);
        assert_eq!(agg.dedicated_count, 5);
        assert!((agg.dedicated.point - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_records_is_all_zero() {
        let agg = FlatAggregate::from_records(&tracker(), &[]);
        assert_eq!(agg.trials, 0);
        assert_eq!(agg.clients, 0);
        assert_eq!(agg.dedicated.point, 0.0);
        assert!(agg.outcomes.iter().all(|o| o.estimate == Estimate::ZERO));
    }

    #[test]
    fn test_flat_sums_saturate_on_huge_counts() {
        // Two hostile records whose cells alone reach u64::MAX must not
        // wrap the community totals.
        let records = vec![
            record("vd_a", json!({"0": u64::MAX})),
            record("vd_b", json!({"0": u64::MAX, "1": 9})),
        ];
        let agg = FlatAggregate::from_records(&tracker(), &records);

        assert_eq!(agg.clients, 2);
        assert_eq!(agg.trials, u64::MAX);
        assert_eq!(agg.outcomes[0].count, u64::MAX);
        // Everything landed in the baseline column except the 9.
        assert_eq!(agg.dedicated_count, 0);
    }

    #[test]
    fn test_matrix_sums_saturate_on_huge_counts() {
        let huge = json!([
            [u64::MAX, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0]
        ]);
        let agg = MatrixAggregate::from_records(&[
            record("vd_a", huge.clone()),
            record("vd_b", huge),
        ]);

        assert_eq!(agg.clients, 2);
        assert_eq!(agg.cells[0][0], u64::MAX);
        assert_eq!(agg.row_trials[0], u64::MAX);
        assert_eq!(agg.grand_total(), u64::MAX);
    }

    #[test]
    fn test_matrix_aggregate() {
        let m1 = record(
            "vd_a",
            json!([[2, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 1]]),
        );
        let m2 = record(
            "vd_b",
            json!([[1, 0, 0, 0], [0, 3, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
        );
        let bad = record("vd_c", json!({"0": 1}));

        let agg = MatrixAggregate::from_records(&[m1, m2, bad]);
        assert_eq!(agg.clients, 2);
        assert_eq!(agg.skipped, 1);
        assert_eq!(agg.cells[0][0], 3);
        assert_eq!(agg.cells[1][1], 3);
        assert_eq!(agg.row_trials[0], 4);
        assert_eq!(agg.row_trials[1], 3);
        assert_eq!(agg.grand_total(), 8);

        let est = agg.estimate(1, 1);
        assert!((est.point - 1.0).abs() < 1e-12);
        assert!(est.lower < 1.0);

        assert_eq!(agg.estimate(9, 0), Estimate::ZERO);
    }
}

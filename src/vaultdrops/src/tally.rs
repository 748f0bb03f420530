//! Flat per-boss outcome counters
//!
//! A boss tracker is a row of outcome columns: column 0 is always the
//! implicit "No drop" baseline, columns 1.. are the boss's dedicated drops.
//! Counts are edited one kill at a time (add/undo) and can never go
//! negative; undoing a zero cell is a no-op.
//!
//! Two JSON shapes leave this module:
//!
//! - the *stored* payload `{"counts": {"<col>": n, ...}}` written under the
//!   tracker's local storage key, and
//! - the *snapshot* `{"<col>": n, ...}` embedded in community submissions.
//!
//! [`TallyCounts::from_snapshot`] is the validating decode used when reading
//! counts back from untrusted sources: anything that is not an object of
//! column-index keys to non-negative integers is rejected wholesale.

use serde_json::Value;
use std::collections::BTreeMap;

/// Column index of the "No drop" baseline outcome.
pub const NO_DROP_COLUMN: usize = 0;

/// Highest column index a snapshot may carry. Catalogs top out at a
/// handful of drops per boss; the bound keeps a hostile snapshot from
/// dictating label-vector sizes through its largest key.
pub const MAX_COLUMN: usize = 255;

/// Outcome counters for one flat tracker. Zero cells are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyCounts {
    cells: BTreeMap<usize, u64>,
}

impl TallyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a column; absent columns read as zero.
    pub fn get(&self, column: usize) -> u64 {
        self.cells.get(&column).copied().unwrap_or(0)
    }

    /// Record one more observation of `column`.
    pub fn increment(&mut self, column: usize) {
        self.apply(column, 1);
    }

    /// Undo one observation of `column`. Clamps at zero.
    pub fn decrement(&mut self, column: usize) {
        self.apply(column, -1);
    }

    /// Adjust a column by a signed delta, clamping at zero.
    pub fn apply(&mut self, column: usize, delta: i64) {
        let current = self.get(column);
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u64)
        };
        if next == 0 {
            self.cells.remove(&column);
        } else {
            self.cells.insert(column, next);
        }
    }

    /// Total observations across all columns (the trial count). Saturates
    /// rather than wrapping when decoded cells are absurdly large.
    pub fn total(&self) -> u64 {
        self.cells
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Observations of any dedicated drop, i.e. every column except the
    /// "No drop" baseline.
    pub fn dedicated_total(&self) -> u64 {
        self.cells
            .iter()
            .filter(|(col, _)| **col != NO_DROP_COLUMN)
            .fold(0u64, |acc, (_, count)| acc.saturating_add(*count))
    }

    /// True when nothing has been recorded. Publishing an empty tally is
    /// rejected upstream.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn reset(&mut self) {
        self.cells.clear();
    }

    /// Non-zero cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.cells.iter().map(|(col, count)| (*col, *count))
    }

    /// Snapshot for a community submission: `{"<col>": n, ...}`.
    pub fn to_snapshot(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (col, count) in &self.cells {
            map.insert(col.to_string(), Value::from(*count));
        }
        Value::Object(map)
    }

    /// Validating decode of a snapshot. Returns `None` for anything that is
    /// not an object of integer-keyed, non-negative integer cells, or that
    /// names a column above [`MAX_COLUMN`]; zero cells are dropped so
    /// round-trips are canonical.
    pub fn from_snapshot(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut cells = BTreeMap::new();
        for (key, raw) in map {
            let col: usize = key.parse().ok()?;
            if col > MAX_COLUMN {
                return None;
            }
            let count = raw.as_u64()?;
            if count > 0 {
                cells.insert(col, count);
            }
        }
        Some(Self { cells })
    }

    /// Payload written under the tracker's local storage key.
    pub fn to_stored(&self) -> Value {
        serde_json::json!({ "counts": self.to_snapshot() })
    }

    /// Decode a stored payload. Same validation as [`Self::from_snapshot`].
    pub fn from_stored(value: &Value) -> Option<Self> {
        Self::from_snapshot(value.as_object()?.get("counts")?)
    }
}

//! The class-mod drop matrix
//!
//! Class mods are the one tracker that is not a flat outcome row: every kill
//! is recorded as (character played, character whose class mod dropped),
//! giving a dense 4x4 matrix. Row totals are the trial counts; each row is
//! its own binomial family for estimation.
//!
//! The stored payload keeps the browser-era camelCase shape
//! `{"activeColumn": <int|null>, "matrix": [[..4..] x4]}`; community
//! snapshots carry the bare matrix only (the active column is personal UI
//! state, not community data).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Matrix dimension: one row/column per playable character.
pub const MATRIX_DIM: usize = 4;

/// Playable characters, in matrix row/column order.
pub const CHARACTERS: [&str; MATRIX_DIM] = ["Vex", "Rafa", "Amon", "Harlowe"];

/// Case-insensitive character lookup, returning the matrix index.
pub fn character_index(name: &str) -> Option<usize> {
    CHARACTERS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
}

/// Per-cell counts of class-mod drops, plus the locally tracked character
/// the player is currently running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixCounts {
    cells: [[u64; MATRIX_DIM]; MATRIX_DIM],
    active_column: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMatrix {
    active_column: Option<usize>,
    matrix: Vec<Vec<u64>>,
}

impl MatrixCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for (character played, character dropped). Out-of-range
    /// indices read as zero.
    pub fn get(&self, row: usize, col: usize) -> u64 {
        if row < MATRIX_DIM && col < MATRIX_DIM {
            self.cells[row][col]
        } else {
            0
        }
    }

    pub fn increment(&mut self, row: usize, col: usize) {
        self.apply(row, col, 1);
    }

    /// Clamps at zero, same as the flat tally.
    pub fn decrement(&mut self, row: usize, col: usize) {
        self.apply(row, col, -1);
    }

    /// Adjust a cell by a signed delta. Out-of-range indices are ignored.
    pub fn apply(&mut self, row: usize, col: usize, delta: i64) {
        if row >= MATRIX_DIM || col >= MATRIX_DIM {
            return;
        }
        let cell = &mut self.cells[row][col];
        *cell = if delta.is_negative() {
            cell.saturating_sub(delta.unsigned_abs())
        } else {
            cell.saturating_add(delta as u64)
        };
    }

    /// Kills recorded while playing `row`'s character (that row's trials).
    /// Saturates rather than wrapping when decoded cells are absurdly
    /// large.
    pub fn row_total(&self, row: usize) -> u64 {
        if row < MATRIX_DIM {
            self.cells[row]
                .iter()
                .fold(0u64, |acc, cell| acc.saturating_add(*cell))
        } else {
            0
        }
    }

    pub fn grand_total(&self) -> u64 {
        (0..MATRIX_DIM)
            .fold(0u64, |acc, r| acc.saturating_add(self.row_total(r)))
    }

    pub fn is_empty(&self) -> bool {
        self.grand_total() == 0
    }

    /// Zeroes the counts. The active column is a separate preference and
    /// survives a reset.
    pub fn reset(&mut self) {
        self.cells = [[0; MATRIX_DIM]; MATRIX_DIM];
    }

    pub fn active_column(&self) -> Option<usize> {
        self.active_column
    }

    /// Set (or clear) the currently played character. Returns false and
    /// leaves the value unchanged if the index is out of range.
    pub fn set_active_column(&mut self, column: Option<usize>) -> bool {
        match column {
            Some(c) if c >= MATRIX_DIM => false,
            other => {
                self.active_column = other;
                true
            }
        }
    }

    /// Community snapshot: the bare 4x4 matrix.
    pub fn to_snapshot(&self) -> Value {
        Value::Array(
            self.cells
                .iter()
                .map(|row| Value::Array(row.iter().map(|c| Value::from(*c)).collect()))
                .collect(),
        )
    }

    /// Validating decode of a community snapshot: exactly 4 rows of 4
    /// non-negative integers, anything else is rejected.
    pub fn from_snapshot(value: &Value) -> Option<Self> {
        let rows = value.as_array()?;
        if rows.len() != MATRIX_DIM {
            return None;
        }
        let mut cells = [[0u64; MATRIX_DIM]; MATRIX_DIM];
        for (r, row) in rows.iter().enumerate() {
            let cols = row.as_array()?;
            if cols.len() != MATRIX_DIM {
                return None;
            }
            for (c, cell) in cols.iter().enumerate() {
                cells[r][c] = cell.as_u64()?;
            }
        }
        Some(Self {
            cells,
            active_column: None,
        })
    }

    /// Payload written under the local storage key (camelCase field names).
    pub fn to_stored(&self) -> Value {
        serde_json::json!({
            "activeColumn": self.active_column,
            "matrix": self.to_snapshot(),
        })
    }

    /// Decode a stored payload, validating both the matrix shape and the
    /// active column range.
    pub fn from_stored(value: &Value) -> Option<Self> {
        let stored: StoredMatrix = serde_json::from_value(value.clone()).ok()?;
        let mut counts = Self::from_snapshot(&serde_json::to_value(stored.matrix).ok()?)?;
        if !counts.set_active_column(stored.active_column) {
            return None;
        }
        Some(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_character_index() {
        assert_eq!(character_index("Vex"), Some(0));
        assert_eq!(character_index("harlowe"), Some(3));
        assert_eq!(character_index("Zane"), None);
    }

    #[test]
    fn test_clamp_and_totals() {
        let mut m = MatrixCounts::new();
        m.decrement(1, 2);
        assert_eq!(m.get(1, 2), 0);

        m.increment(1, 2);
        m.increment(1, 3);
        m.increment(0, 0);
        assert_eq!(m.row_total(1), 2);
        assert_eq!(m.row_total(0), 1);
        assert_eq!(m.grand_total(), 3);
    }

    #[test]
    fn test_out_of_range_edits_ignored() {
        let mut m = MatrixCounts::new();
        m.increment(4, 0);
        m.increment(0, 9);
        assert!(m.is_empty());
        assert_eq!(m.row_total(4), 0);
    }

    #[test]
    fn test_reset_keeps_active_column() {
        let mut m = MatrixCounts::new();
        assert!(m.set_active_column(Some(2)));
        m.increment(2, 2);
        m.reset();
        assert!(m.is_empty());
        assert_eq!(m.active_column(), Some(2));
    }

    #[test]
    fn test_active_column_bounds() {
        let mut m = MatrixCounts::new();
        assert!(!m.set_active_column(Some(4)));
        assert_eq!(m.active_column(), None);
        assert!(m.set_active_column(Some(3)));
        assert!(m.set_active_column(None));
        assert_eq!(m.active_column(), None);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut m = MatrixCounts::new();
        m.increment(0, 1);
        m.apply(3, 3, 5);
        let snapshot = m.to_snapshot();
        let decoded = MatrixCounts::from_snapshot(&snapshot).unwrap();
        assert_eq!(decoded.get(0, 1), 1);
        assert_eq!(decoded.get(3, 3), 5);
        assert_eq!(decoded.grand_total(), 6);
    }

    #[test]
    fn test_snapshot_rejects_bad_shapes() {
        // wrong row count
        assert!(MatrixCounts::from_snapshot(&json!([[0, 0, 0, 0]])).is_none());
        // wrong column count
        assert!(MatrixCounts::from_snapshot(&json!([
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0]
        ]))
        .is_none());
        // negative cell
        assert!(MatrixCounts::from_snapshot(&json!([
            [0, 0, 0, -1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0]
        ]))
        .is_none());
        // not an array at all
        assert!(MatrixCounts::from_snapshot(&json!({"matrix": []})).is_none());
    }

    #[test]
    fn test_stored_round_trip() {
        let mut m = MatrixCounts::new();
        m.set_active_column(Some(1));
        m.increment(1, 0);
        let stored = m.to_stored();
        assert_eq!(stored["activeColumn"], json!(1));
        assert_eq!(MatrixCounts::from_stored(&stored), Some(m));
    }

    #[test]
    fn test_stored_rejects_bad_active_column() {
        let stored = json!({
            "activeColumn": 11,
            "matrix": [[0,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]
        });
        assert!(MatrixCounts::from_stored(&stored).is_none());
    }

    #[test]
    fn test_stored_null_active_column() {
        let stored = json!({
            "activeColumn": null,
            "matrix": [[1,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]
        });
        let m = MatrixCounts::from_stored(&stored).unwrap();
        assert_eq!(m.active_column(), None);
        assert_eq!(m.get(0, 0), 1);
    }
}

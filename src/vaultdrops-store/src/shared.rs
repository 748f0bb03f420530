//! Shared SQL for the store implementations.
//!
//! Table definitions and the queries both submission backends run, kept in
//! one place so the SQLite and PostgreSQL flavors only differ in
//! placeholder syntax.

/// Column list for submission SELECTs. Order must match the positional
/// mapping in the row conversion functions.
pub const SUBMISSION_SELECT_COLUMNS: &str =
    "tracker_id, client_id, counts, total_trials, submitted_at";

/// Table definitions
pub mod schema {
    /// Local profile key/value table (SQLite only).
    pub const PROFILE_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS profile (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )
    "#;

    /// Applied-migrations ledger.
    pub const SCHEMA_MIGRATIONS_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
    "#;

    /// Community submissions: one live row per (tracker, client). The
    /// revision counter is bumped on every replacement so callers can tell
    /// a create from an update. Types are the portable subset that means
    /// the same thing to SQLite and PostgreSQL.
    pub const SUBMISSIONS_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS submissions (
            tracker_id   TEXT NOT NULL,
            client_id    TEXT NOT NULL,
            counts       TEXT NOT NULL,
            total_trials BIGINT NOT NULL,
            revision     BIGINT NOT NULL DEFAULT 1,
            submitted_at TEXT NOT NULL,
            PRIMARY KEY (tracker_id, client_id)
        )
    "#;

    /// Lookup index for per-tracker selects.
    pub const SUBMISSIONS_TRACKER_INDEX: &str =
        "CREATE INDEX IF NOT EXISTS idx_submissions_tracker ON submissions(tracker_id)";
}

/// Queries used across implementations
pub mod queries {
    /// Idempotent publish: insert, or replace the client's previous record
    /// in place. RETURNING the revision distinguishes the two (1 = fresh
    /// insert) without a second round trip.
    pub const UPSERT_SUBMISSION: &str = r#"INSERT INTO submissions
        (tracker_id, client_id, counts, total_trials, submitted_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (tracker_id, client_id) DO UPDATE SET
            counts = excluded.counts,
            total_trials = excluded.total_trials,
            revision = submissions.revision + 1,
            submitted_at = excluded.submitted_at
        RETURNING revision"#;
    pub const UPSERT_SUBMISSION_PG: &str = r#"INSERT INTO submissions
        (tracker_id, client_id, counts, total_trials, submitted_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (tracker_id, client_id) DO UPDATE SET
            counts = EXCLUDED.counts,
            total_trials = EXCLUDED.total_trials,
            revision = submissions.revision + 1,
            submitted_at = EXCLUDED.submitted_at
        RETURNING revision"#;

    /// Live records for one tracker.
    pub const SELECT_FOR_TRACKER: &str = r#"SELECT tracker_id, client_id, counts, total_trials, submitted_at
        FROM submissions WHERE tracker_id = ?
        ORDER BY submitted_at DESC"#;
    pub const SELECT_FOR_TRACKER_PG: &str = r#"SELECT tracker_id, client_id, counts, total_trials, submitted_at
        FROM submissions WHERE tracker_id = $1
        ORDER BY submitted_at DESC"#;

    /// One client's live record.
    pub const SELECT_ONE: &str = r#"SELECT tracker_id, client_id, counts, total_trials, submitted_at
        FROM submissions WHERE tracker_id = ? AND client_id = ?"#;
    pub const SELECT_ONE_PG: &str = r#"SELECT tracker_id, client_id, counts, total_trials, submitted_at
        FROM submissions WHERE tracker_id = $1 AND client_id = $2"#;

    /// Retract a client's record.
    pub const DELETE_SUBMISSION: &str =
        "DELETE FROM submissions WHERE tracker_id = ? AND client_id = ?";
    pub const DELETE_SUBMISSION_PG: &str =
        "DELETE FROM submissions WHERE tracker_id = $1 AND client_id = $2";

    /// Per-tracker rollup for the trackers listing.
    pub const TRACKER_SUMMARIES: &str = r#"SELECT tracker_id,
            COUNT(*) as submissions,
            CAST(COALESCE(SUM(total_trials), 0) AS BIGINT) as total_trials
        FROM submissions
        GROUP BY tracker_id
        ORDER BY tracker_id"#;

    /// Whole-store totals.
    pub const STORE_STATS: &str = r#"SELECT
            COUNT(*) as submissions,
            COUNT(DISTINCT tracker_id) as trackers,
            CAST(COALESCE(SUM(total_trials), 0) AS BIGINT) as total_trials
        FROM submissions"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavors_differ_only_in_placeholders() {
        let sqlite = queries::UPSERT_SUBMISSION.replace('?', "$");
        // same statement shape: identical length of clauses around binds
        assert_eq!(
            sqlite.matches('$').count(),
            queries::UPSERT_SUBMISSION_PG.matches('$').count()
        );
        assert!(queries::UPSERT_SUBMISSION.contains("RETURNING revision"));
        assert!(queries::UPSERT_SUBMISSION_PG.contains("RETURNING revision"));
    }

    #[test]
    fn test_select_columns_match_constant() {
        assert!(queries::SELECT_FOR_TRACKER.contains(SUBMISSION_SELECT_COLUMNS));
        assert!(queries::SELECT_ONE_PG.contains(SUBMISSION_SELECT_COLUMNS));
    }
}

//! SQLite implementation of the local profile store (synchronous).
//!
//! One small key/value table per player profile, used by the CLI. Values
//! are JSON payloads; this layer neither knows nor cares what is in them.

use crate::repository::{ProfileStore, StoreError, StoreResult};
use crate::shared::schema;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Default profile location
pub const DEFAULT_PROFILE_PATH: &str = "share/profile.db";

/// SQLite-backed profile store
pub struct ProfileDb {
    conn: Connection,
}

impl ProfileDb {
    /// Open or create the profile database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize the schema, applying any pending migrations.
    pub fn init(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(schema::SCHEMA_MIGRATIONS_TABLE)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        self.run_migrations()
    }

    /// Check if a migration has been applied
    fn is_migration_applied(&self, version: &str) -> StoreResult<bool> {
        let result: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM schema_migrations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(result.is_some())
    }

    /// Mark a migration as applied
    fn mark_migration_applied(&self, version: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO schema_migrations (version) VALUES (?1)",
                params![version],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Run pending migrations
    fn run_migrations(&self) -> StoreResult<()> {
        if !self.is_migration_applied("0001_profile")? {
            self.conn
                .execute_batch(schema::PROFILE_TABLE)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            self.mark_migration_applied("0001_profile")?;
        }
        Ok(())
    }
}

impl ProfileStore for ProfileDb {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM profile WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO profile (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM profile WHERE key = ?1", params![key])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{TallyStore, CLIENT_ID_KEY};
    use vaultdrops::TrackerDef;

    fn setup_db() -> ProfileDb {
        let db = ProfileDb::open_in_memory().expect("Failed to open in-memory db");
        db.init().expect("Failed to init db");
        db
    }

    #[test]
    fn test_get_set_remove() {
        let db = setup_db();
        assert_eq!(db.get("missing").unwrap(), None);

        db.set("vd-test", "one").unwrap();
        assert_eq!(db.get("vd-test").unwrap(), Some("one".to_string()));

        db.set("vd-test", "two").unwrap();
        assert_eq!(db.get("vd-test").unwrap(), Some("two".to_string()));

        assert!(db.remove("vd-test").unwrap());
        assert!(!db.remove("vd-test").unwrap());
        assert_eq!(db.get("vd-test").unwrap(), None);
    }

    #[test]
    fn test_init_is_idempotent() {
        let db = setup_db();
        db.set("k", "v").unwrap();
        db.init().unwrap();
        assert_eq!(db.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_tally_store_over_sqlite() {
        let db = setup_db();
        let store = TallyStore::new(&db);
        let tracker = TrackerDef::custom("Timekeeper", &["Plasma Coil".to_string()]);

        let mut counts = store.load_tally(&tracker);
        counts.increment(0);
        counts.increment(1);
        store.save_tally(&tracker, &counts);

        assert_eq!(store.load_tally(&tracker), counts);

        store.clear(&tracker);
        assert!(store.load_tally(&tracker).is_empty());
    }

    #[test]
    fn test_client_id_persisted() {
        let db = setup_db();
        let store = TallyStore::new(&db);

        let token = store.client_id();
        assert!(token.starts_with("vd_"));
        assert_eq!(db.get(CLIENT_ID_KEY).unwrap(), Some(token.clone()));
        assert_eq!(store.client_id(), token);
    }
}

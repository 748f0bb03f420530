//! Store errors, the profile-store trait, and the best-effort tally layer.

use vaultdrops::{MatrixCounts, TallyCounts, TrackerDef};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Profile key the anonymous client token is stored under.
pub const CLIENT_ID_KEY: &str = "vd-client-id";

/// Synchronous key/value store backing the local profile: tally payloads
/// and the client token. The one real implementation is rusqlite-backed
/// ([`crate::sqlite::ProfileDb`]); the trait exists so the best-effort
/// layer above it can be exercised against failing and in-memory stores.
pub trait ProfileStore {
    /// Read a value by key.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key. Returns whether it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// Best-effort tally persistence over any [`ProfileStore`].
///
/// Counting must keep working when the disk does not: every read failure or
/// corrupt payload degrades to empty counts, every write failure is
/// swallowed. Callers treat the in-memory counts as the source of truth and
/// call [`TallyStore::save_tally`] after each edit; losing a write costs at
/// worst the session's counts, never a crash mid-farm.
pub struct TallyStore<'a, S: ProfileStore> {
    store: &'a S,
}

impl<'a, S: ProfileStore> TallyStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load a flat tracker's counts. Missing, unreadable, or corrupt
    /// payloads all come back as empty counts.
    pub fn load_tally(&self, tracker: &TrackerDef) -> TallyCounts {
        self.load_raw(&tracker.storage_key())
            .and_then(|value| TallyCounts::from_stored(&value))
            .unwrap_or_default()
    }

    /// Persist a flat tracker's counts, ignoring write failures.
    pub fn save_tally(&self, tracker: &TrackerDef, counts: &TallyCounts) {
        self.save_raw(&tracker.storage_key(), &counts.to_stored());
    }

    /// Load the class-mod matrix. Same degradation rules as
    /// [`Self::load_tally`].
    pub fn load_matrix(&self, tracker: &TrackerDef) -> MatrixCounts {
        self.load_raw(&tracker.storage_key())
            .and_then(|value| MatrixCounts::from_stored(&value))
            .unwrap_or_default()
    }

    /// Persist the class-mod matrix, ignoring write failures.
    pub fn save_matrix(&self, tracker: &TrackerDef, counts: &MatrixCounts) {
        self.save_raw(&tracker.storage_key(), &counts.to_stored());
    }

    /// Drop a tracker's stored payload (reset). Best-effort.
    pub fn clear(&self, tracker: &TrackerDef) {
        let _ = self.store.remove(&tracker.storage_key());
    }

    /// The stable anonymous client token: read it, or create and persist
    /// one. If the store cannot be written the fresh token is still
    /// returned, so the session publishes under a consistent (if
    /// ephemeral) identity.
    pub fn client_id(&self) -> String {
        if let Ok(Some(token)) = self.store.get(CLIENT_ID_KEY) {
            if !token.is_empty() {
                return token;
            }
        }
        let token = crate::generate_client_token();
        let _ = self.store.set(CLIENT_ID_KEY, &token);
        token
    }

    fn load_raw(&self, key: &str) -> Option<serde_json::Value> {
        let raw = self.store.get(key).ok()??;
        serde_json::from_str(&raw).ok()
    }

    fn save_raw(&self, key: &str, value: &serde_json::Value) {
        if let Ok(raw) = serde_json::to_string(value) {
            let _ = self.store.set(key, &raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store for exercising the best-effort layer.
    #[derive(Default)]
    struct MemStore {
        map: RefCell<HashMap<String, String>>,
    }

    impl ProfileStore for MemStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            Ok(self.map.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.map.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> StoreResult<bool> {
            Ok(self.map.borrow_mut().remove(key).is_some())
        }
    }

    /// Store where every operation fails.
    struct BrokenStore;

    impl ProfileStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Database("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Database("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Database("disk on fire".to_string()))
        }
    }

    fn tracker() -> TrackerDef {
        TrackerDef::custom("Test Boss", &["Drop".to_string()])
    }

    #[test]
    fn test_tally_round_trip() {
        let mem = MemStore::default();
        let store = TallyStore::new(&mem);
        let tracker = tracker();

        let mut counts = store.load_tally(&tracker);
        assert!(counts.is_empty());

        counts.increment(0);
        counts.increment(1);
        store.save_tally(&tracker, &counts);

        let reloaded = store.load_tally(&tracker);
        assert_eq!(reloaded, counts);
    }

    #[test]
    fn test_corrupt_payload_degrades_to_empty() {
        let mem = MemStore::default();
        let tracker = tracker();
        mem.set(&tracker.storage_key(), "{not json").unwrap();

        let store = TallyStore::new(&mem);
        assert!(store.load_tally(&tracker).is_empty());

        // wrong shape, valid JSON
        mem.set(&tracker.storage_key(), r#"{"counts": [1, 2]}"#).unwrap();
        assert!(store.load_tally(&tracker).is_empty());
    }

    #[test]
    fn test_broken_store_never_panics() {
        let store = TallyStore::new(&BrokenStore);
        let tracker = tracker();

        let mut counts = store.load_tally(&tracker);
        assert!(counts.is_empty());
        counts.increment(1);
        store.save_tally(&tracker, &counts);
        store.clear(&tracker);

        // token is ephemeral but still usable
        let token = store.client_id();
        assert!(token.starts_with("vd_"));
    }

    #[test]
    fn test_clear_removes_payload() {
        let mem = MemStore::default();
        let store = TallyStore::new(&mem);
        let tracker = tracker();

        let mut counts = TallyCounts::new();
        counts.increment(1);
        store.save_tally(&tracker, &counts);
        store.clear(&tracker);
        assert!(store.load_tally(&tracker).is_empty());
    }

    #[test]
    fn test_client_id_stable_across_calls() {
        let mem = MemStore::default();
        let store = TallyStore::new(&mem);

        let first = store.client_id();
        let second = store.client_id();
        assert_eq!(first, second);
        assert_eq!(mem.get(CLIENT_ID_KEY).unwrap(), Some(first));
    }

    #[test]
    fn test_matrix_round_trip_keeps_active_column() {
        let mem = MemStore::default();
        let store = TallyStore::new(&mem);
        let tracker = TrackerDef::class_mods();

        let mut matrix = store.load_matrix(&tracker);
        matrix.set_active_column(Some(2));
        matrix.increment(2, 1);
        store.save_matrix(&tracker, &matrix);

        let reloaded = store.load_matrix(&tracker);
        assert_eq!(reloaded.active_column(), Some(2));
        assert_eq!(reloaded.get(2, 1), 1);
    }
}

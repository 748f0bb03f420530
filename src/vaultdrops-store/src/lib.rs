//! Persistence for VaultDrops
//!
//! Two very different stores live behind this crate's features:
//!
//! - the **local profile store** (`sqlite-sync`), a synchronous key/value
//!   table playing the role browser localStorage played for the tracker:
//!   per-tracker tally payloads and the anonymous client token, written
//!   best-effort;
//! - the **community submissions repository** (`sqlx-sqlite` /
//!   `sqlx-postgres`), the async store the community service keeps one live
//!   record per (tracker, client) in.
//!
//! # Features
//!
//! - `sqlite-sync` (default) - Synchronous SQLite using rusqlite (for CLI)
//! - `sqlx-sqlite` - Async SQLite using SQLx (for server)
//! - `sqlx-postgres` - Async PostgreSQL using SQLx (for server)
//!
//! # Example (Sync)
//!
//! ```no_run
//! use vaultdrops::TrackerDef;
//! use vaultdrops_store::{ProfileDb, TallyStore};
//!
//! let db = ProfileDb::open("profile.db").unwrap();
//! db.init().unwrap();
//!
//! let store = TallyStore::new(&db);
//! let tracker = TrackerDef::class_mods();
//! let matrix = store.load_matrix(&tracker);
//! ```
//!
//! # Example (Async with SQLx SQLite)
//!
//! ```ignore
//! // Requires feature "sqlx-sqlite"
//! use vaultdrops_store::sqlx_impl::sqlite::SqlxSqliteDb;
//! use vaultdrops_store::SubmissionsRepository;
//!
//! async fn example() {
//!     let db = SqlxSqliteDb::connect("sqlite:community.db?mode=rwc").await.unwrap();
//!     db.init().await.unwrap();
//!
//!     let records = db.submissions_for_tracker("splaszone").await.unwrap();
//! }
//! ```

pub mod repository;
pub mod shared;

#[cfg(feature = "sqlite-sync")]
pub mod sqlite;

#[cfg(any(feature = "sqlx-sqlite", feature = "sqlx-postgres"))]
pub mod sqlx_impl;

// Re-export the shared surface
pub use repository::{ProfileStore, StoreError, StoreResult, TallyStore, CLIENT_ID_KEY};

// Re-export implementations
#[cfg(feature = "sqlite-sync")]
pub use sqlite::{ProfileDb, DEFAULT_PROFILE_PATH};

#[cfg(any(feature = "sqlx-sqlite", feature = "sqlx-postgres"))]
pub use sqlx_impl::{StoreStats, SubmissionsRepository, TrackerSummary, UpsertOutcome};

#[cfg(feature = "sqlx-sqlite")]
pub use sqlx_impl::sqlite::SqlxSqliteDb;

#[cfg(feature = "sqlx-postgres")]
pub use sqlx_impl::postgres::SqlxPgDb;

use rand::Rng;

/// Generate a fresh anonymous client token: `vd_` plus 18 lowercase
/// alphanumerics. Tokens identify an installation, never a person.
pub fn generate_client_token() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let tail: String = (0..18)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("vd_{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_token_shape() {
        let token = generate_client_token();
        assert!(token.starts_with("vd_"));
        assert_eq!(token.len(), 21);
        assert!(token[3..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_client_tokens_differ() {
        assert_ne!(generate_client_token(), generate_client_token());
    }
}

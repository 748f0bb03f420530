//! Core drop-tracking domain for VaultDrops
//!
//! Everything a tracker needs that is not storage or transport lives here:
//!
//! - [`stats`] - Wilson score confidence intervals over binomial counts
//! - [`tally`] - flat per-boss outcome counters with clamp-at-zero edits
//! - [`matrix`] - the 4x4 class-mod matrix (character played x character dropped)
//! - [`catalog`] - the normalized boss/drop manifest
//! - [`tracker`] - tracker definitions tying catalog entries to storage and
//!   community identifiers
//! - [`submission`] - community submission records and publish-time validation
//! - [`aggregate`] - summing live submissions into community-wide estimates
//!
//! The crate is deliberately I/O-free apart from [`catalog::Catalog::load`];
//! persistence and HTTP live in `vaultdrops-store` and the binaries.
//!
//! # Example
//!
//! ```
//! use vaultdrops::{stats::wilson, tally::TallyCounts};
//!
//! let mut counts = TallyCounts::new();
//! counts.increment(0); // a kill with no dedicated drop
//! counts.increment(1); // a kill that dropped column 1
//!
//! let est = wilson(counts.get(1), counts.total());
//! assert!(est.lower <= est.point && est.point <= est.upper);
//! ```

pub mod aggregate;
pub mod catalog;
pub mod matrix;
pub mod stats;
pub mod submission;
pub mod tally;
pub mod tracker;

// Re-export the types almost every consumer touches
pub use aggregate::{AggregateError, FlatAggregate, MatrixAggregate, OutcomeRow};
pub use catalog::{slugify, BossEntry, Catalog, CatalogError};
pub use matrix::{character_index, MatrixCounts, CHARACTERS, MATRIX_DIM};
pub use stats::{wilson, wilson_with_z, Estimate, DEFAULT_Z};
pub use submission::{PublishError, Submission};
pub use tally::{TallyCounts, MAX_COLUMN, NO_DROP_COLUMN};
pub use tracker::{TrackerDef, TrackerShape, CLASS_MODS_TRACKER_ID};

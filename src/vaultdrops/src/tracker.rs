//! Tracker definitions
//!
//! A [`TrackerDef`] ties together the three identities one tracked thing
//! has: a display name, a local storage key, and (when the tracker
//! participates in the community pool) the id its submissions are filed
//! under. Boss trackers come from the catalog; the class-mod matrix is a
//! fixed singleton; custom trackers are local-only and cannot publish.

use crate::catalog::{slugify, BossEntry};

/// Community id of the class-mod matrix tracker.
pub const CLASS_MODS_TRACKER_ID: &str = "classmods";

/// Storage key of the class-mod tracker. The version suffix is bumped when
/// the stored payload shape changes, abandoning stale local data.
const CLASS_MODS_STORAGE_KEY: &str = "vd-classmods-v2";

/// Prefix for per-boss storage keys.
const BOSS_KEY_PREFIX: &str = "vd-bosstracker-";

/// What a tracker counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerShape {
    /// A row of outcome columns; index 0 is the "No drop" baseline.
    Flat { columns: Vec<String> },
    /// The 4x4 class-mod matrix.
    Matrix,
}

/// One trackable thing: a catalog boss, the class-mod matrix, or an ad hoc
/// local tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerDef {
    pub name: String,
    pub slug: String,
    /// Id submissions are filed under; `None` means the tracker is
    /// local-only and publishing fails before any network traffic.
    pub community_id: Option<String>,
    pub shape: TrackerShape,
}

impl TrackerDef {
    /// Tracker for a catalog boss. Submissions are filed under the slug.
    pub fn boss(entry: &BossEntry) -> Self {
        Self {
            name: entry.name.clone(),
            slug: entry.slug.clone(),
            community_id: Some(entry.slug.clone()),
            shape: TrackerShape::Flat {
                columns: entry.columns(),
            },
        }
    }

    /// The class-mod matrix tracker.
    pub fn class_mods() -> Self {
        Self {
            name: "Class Mods".to_string(),
            slug: CLASS_MODS_TRACKER_ID.to_string(),
            community_id: Some(CLASS_MODS_TRACKER_ID.to_string()),
            shape: TrackerShape::Matrix,
        }
    }

    /// An ad hoc tracker for a boss not in the catalog. Local-only: it has
    /// no community id, so publish is rejected up front.
    pub fn custom(name: &str, drops: &[String]) -> Self {
        let columns = std::iter::once(crate::catalog::NO_DROP_LABEL.to_string())
            .chain(drops.iter().cloned())
            .collect();
        Self {
            name: name.to_string(),
            slug: slugify(name),
            community_id: None,
            shape: TrackerShape::Flat { columns },
        }
    }

    /// Key the tracker's local payload is stored under.
    pub fn storage_key(&self) -> String {
        match self.shape {
            TrackerShape::Flat { .. } => format!("{BOSS_KEY_PREFIX}{}", self.slug),
            TrackerShape::Matrix => CLASS_MODS_STORAGE_KEY.to_string(),
        }
    }

    /// Outcome columns for flat trackers, `None` for the matrix.
    pub fn columns(&self) -> Option<&[String]> {
        match &self.shape {
            TrackerShape::Flat { columns } => Some(columns),
            TrackerShape::Matrix => None,
        }
    }
}

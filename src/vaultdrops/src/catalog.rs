//! Boss and dedicated-drop catalog
//!
//! The catalog is a read-only lookup table produced by a normalization step
//! over community drop data: one entry per farmable encounter, each with its
//! dedicated drops and, for merged encounters ("Pango & Bango"), the member
//! bosses folded into it. Entries are already deduplicated, drop lists
//! sorted, and slugs assigned; this module only loads and queries.
//!
//! A copy of the manifest is embedded at compile time from
//! `share/bosses.json`, so the binaries work with no data file on disk; a
//! newer manifest can still be loaded from a path at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Display label of the implicit baseline column.
pub const NO_DROP_LABEL: &str = "No drop";

const BOSSES_JSON: &str = include_str!("../../../share/bosses.json");

static EMBEDDED: Lazy<Catalog> = Lazy::new(|| {
    let manifest: CatalogManifest =
        serde_json::from_str(BOSSES_JSON).expect("Failed to parse bosses.json");
    Catalog::from_manifest(manifest).expect("Embedded catalog is invalid")
});

/// Errors from loading a catalog manifest.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate boss slug: {0}")]
    DuplicateSlug(String),
}

/// On-disk manifest shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub version: u32,
    pub bosses: Vec<BossEntry>,
}

/// One farmable encounter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BossEntry {
    /// Display name, e.g. "Voraxis / Quake Thresher".
    pub name: String,
    /// URL/storage-safe identifier, e.g. "voraxis-quake-thresher".
    pub slug: String,
    /// Dedicated drops, sorted, without the baseline column.
    pub drops: Vec<String>,
    /// Member bosses for merged encounters; empty for solo bosses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl BossEntry {
    /// Outcome columns for this boss's tracker: the "No drop" baseline at
    /// index 0, then the dedicated drops.
    pub fn columns(&self) -> Vec<String> {
        std::iter::once(NO_DROP_LABEL.to_string())
            .chain(self.drops.iter().cloned())
            .collect()
    }

    /// True for merged encounters that track several bosses as one card.
    pub fn is_group(&self) -> bool {
        !self.members.is_empty()
    }

    /// Tracker definition for this boss; submissions are filed under the
    /// slug.
    pub fn tracker(&self) -> crate::tracker::TrackerDef {
        crate::tracker::TrackerDef::boss(self)
    }
}

/// Loaded catalog with a slug index.
#[derive(Debug, Clone)]
pub struct Catalog {
    bosses: Vec<BossEntry>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// Load a catalog manifest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: CatalogManifest = serde_json::from_str(&content)?;
        Self::from_manifest(manifest)
    }

    /// The compile-time embedded manifest.
    pub fn embedded() -> &'static Catalog {
        &EMBEDDED
    }

    /// Build the slug index, rejecting duplicate slugs.
    pub fn from_manifest(manifest: CatalogManifest) -> Result<Self, CatalogError> {
        let mut by_slug = HashMap::with_capacity(manifest.bosses.len());
        for (idx, boss) in manifest.bosses.iter().enumerate() {
            if by_slug.insert(boss.slug.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateSlug(boss.slug.clone()));
            }
        }
        Ok(Self {
            bosses: manifest.bosses,
            by_slug,
        })
    }

    /// Look up a boss by its exact slug.
    pub fn get(&self, slug: &str) -> Option<&BossEntry> {
        self.by_slug.get(slug).map(|idx| &self.bosses[*idx])
    }

    /// All bosses in manifest order (sorted by display name upstream).
    pub fn bosses(&self) -> impl Iterator<Item = &BossEntry> {
        self.bosses.iter()
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }

    /// Case-insensitive substring search over names, slugs, and member
    /// bosses. Results keep manifest order.
    pub fn search(&self, query: &str) -> Vec<&BossEntry> {
        let query = query.to_lowercase();
        self.bosses
            .iter()
            .filter(|b| {
                b.name.to_lowercase().contains(&query)
                    || b.slug.contains(&query)
                    || b.members.iter().any(|m| m.to_lowercase().contains(&query))
            })
            .collect()
    }
}

/// Slug derivation used by the normalization step: lowercase, quote
/// characters stripped, every other non-alphanumeric run collapsed to a
/// single `-`, no leading or trailing dashes.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else if !matches!(ch, '"' | '“' | '”' | '‘' | '’') {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_manifest() -> CatalogManifest {
        CatalogManifest {
            version: 1,
            bosses: vec![
                BossEntry {
                    name: "Splaszone".to_string(),
                    slug: "splaszone".to_string(),
                    drops: vec!["Fireworks".to_string(), "Jelly".to_string()],
                    members: vec![],
                },
                BossEntry {
                    name: "Meathead Riders".to_string(),
                    slug: "meathead-riders".to_string(),
                    drops: vec!["Hellwalker".to_string()],
                    members: vec!["Saddleback".to_string(), "Immortal Boneface".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Splaszone"), "splaszone");
        assert_eq!(slugify("Pango & Bango"), "pango-bango");
        assert_eq!(slugify("Voraxis / Quake Thresher"), "voraxis-quake-thresher");
        assert_eq!(slugify("Experiment 1709 (Vile Ted)"), "experiment-1709-vile-ted");
        assert_eq!(slugify("\"Quake Thresher\""), "quake-thresher");
        assert_eq!(slugify("  "), "");
    }

    #[test]
    fn test_get_by_slug() {
        let catalog = Catalog::from_manifest(test_manifest()).unwrap();
        assert_eq!(catalog.get("splaszone").unwrap().name, "Splaszone");
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut manifest = test_manifest();
        let mut dupe = manifest.bosses[0].clone();
        dupe.name = "Splaszone Again".to_string();
        manifest.bosses.push(dupe);
        assert!(matches!(
            Catalog::from_manifest(manifest),
            Err(CatalogError::DuplicateSlug(slug)) if slug == "splaszone"
        ));
    }

    #[test]
    fn test_columns_prepend_baseline() {
        let catalog = Catalog::from_manifest(test_manifest()).unwrap();
        let columns = catalog.get("splaszone").unwrap().columns();
        assert_eq!(columns, vec!["No drop", "Fireworks", "Jelly"]);
    }

    #[test]
    fn test_search_matches_members() {
        let catalog = Catalog::from_manifest(test_manifest()).unwrap();
        let hits = catalog.search("saddleback");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "meathead-riders");
        assert!(hits[0].is_group());

        assert!(catalog.search("zzz").is_empty());
        assert_eq!(catalog.search("SPLAS")[0].slug, "splaszone");
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded();
        assert!(!catalog.is_empty());
        let splaszone = catalog.get("splaszone").unwrap();
        assert!(splaszone.drops.contains(&"Lead Balloon".to_string()));
        // every entry's slug matches its derived slug
        for boss in catalog.bosses() {
            assert_eq!(boss.slug, slugify(&boss.name), "bad slug for {}", boss.name);
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&test_manifest()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("meathead-riders").is_some());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(matches!(
            Catalog::load(file.path()),
            Err(CatalogError::Parse(_))
        ));
    }
}

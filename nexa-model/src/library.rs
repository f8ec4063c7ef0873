use crate::ids::LibrarySectionId;
use crate::metadata_type::{LibraryType, MetadataType};
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A root path owned by a `LibrarySection`. Overlap between two sections'
/// locations is rejected at section-create time (see
/// `nexa_contracts::catalog::LibrarySectionRepository::create`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct SectionLocation {
    pub id: i64,
    #[graphql(skip)]
    pub path: PathBuf,
}

impl SectionLocation {
    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

/// A named bucket of root paths scanned as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct LibrarySection {
    pub id: LibrarySectionId,
    pub name: String,
    pub library_type: LibraryType,
    pub locations: Vec<SectionLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

#[async_graphql::ComplexObject]
impl LibrarySection {
    /// The root `MetadataType`s this section's library kind may classify
    /// at scan time; a pure function of `library_type`, so it needs no
    /// repository access the way `children`/`letterIndex` do.
    async fn available_root_item_types(&self) -> Vec<MetadataType> {
        self.library_type.root_item_types().to_vec()
    }
}

impl LibrarySection {
    /// Invariant check used before persisting a new/updated section: no
    /// two sections may claim overlapping root paths.
    pub fn overlaps(&self, other_paths: &[PathBuf]) -> bool {
        self.locations
            .iter()
            .any(|loc| other_paths.iter().any(|p| paths_overlap(&loc.path, p)))
    }
}

fn paths_overlap(a: &std::path::Path, b: &std::path::Path) -> bool {
    a == b || a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(paths: &[&str]) -> LibrarySection {
        LibrarySection {
            id: LibrarySectionId::new(),
            name: "Movies".into(),
            library_type: LibraryType::Movies,
            locations: paths
                .iter()
                .enumerate()
                .map(|(i, p)| SectionLocation {
                    id: i as i64,
                    path: PathBuf::from(p),
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_scanned_at: None,
        }
    }

    #[test]
    fn disjoint_roots_do_not_overlap() {
        let s = section(&["/media/movies"]);
        assert!(!s.overlaps(&[PathBuf::from("/media/shows")]));
    }

    #[test]
    fn nested_roots_overlap() {
        let s = section(&["/media/movies"]);
        assert!(s.overlaps(&[PathBuf::from("/media/movies/kids")]));
        assert!(s.overlaps(&[PathBuf::from("/media")]));
    }
}

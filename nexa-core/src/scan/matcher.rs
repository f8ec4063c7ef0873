use crate::scan::discover::CandidateFile;
use nexa_contracts::agent::ScanUnit;
use nexa_model::metadata_type::{LibraryType, MetadataType};
use std::collections::BTreeMap;

/// Groups classified candidates into units of work whose aggregate becomes
/// one item graph — e.g. all files of a single movie, or all tracks of an
/// album medium, per spec.md §4.B step 4.
///
/// Movies and standalone items group one file per unit. Episodic and
/// track-based types group by parent directory, since a season/album
/// medium's files live together on disk.
pub fn group(
    library_type: LibraryType,
    classified: Vec<(CandidateFile, MetadataType)>,
) -> Vec<ScanUnit> {
    let groups_by_dir = matches!(
        classified.first().map(|(_, t)| *t),
        Some(MetadataType::Episode) | Some(MetadataType::Track)
    );

    if !groups_by_dir {
        return classified
            .into_iter()
            .map(|(candidate, item_type)| ScanUnit {
                library_type,
                intended_type: item_type,
                paths: vec![candidate.path],
                path_hints: BTreeMap::new(),
            })
            .collect();
    }

    let mut by_dir: BTreeMap<std::path::PathBuf, (MetadataType, Vec<std::path::PathBuf>)> = BTreeMap::new();
    for (candidate, item_type) in classified {
        let dir = candidate.path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        by_dir.entry(dir).or_insert_with(|| (item_type, Vec::new())).1.push(candidate.path);
    }

    by_dir
        .into_iter()
        .map(|(dir, (item_type, paths))| {
            let mut hints = BTreeMap::new();
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                hints.insert("directory_name".to_string(), name.to_string());
            }
            ScanUnit { library_type, intended_type: item_type, paths, path_hints: hints }
        })
        .collect()
}

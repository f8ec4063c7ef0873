use crate::scan::discover::CandidateFile;
use nexa_contracts::catalog::MediaPartRepository;
use std::sync::Arc;

/// Outcome of comparing a candidate against the persisted `MediaPart`
/// fingerprint for its path.
pub enum FilterOutcome {
    /// Path+size+mtime matches a persisted part; skip re-extraction.
    Known(CandidateFile),
    /// New path, or changed size/mtime; continue through the pipeline.
    Changed(CandidateFile),
}

/// Drops files whose path+mtime+size matches an existing persisted
/// `MediaPart`, unless `force_rehash` is set, per spec.md §4.B step 2.
pub async fn filter(
    candidates: Vec<CandidateFile>,
    media_parts: &Arc<dyn MediaPartRepository>,
    force_rehash: bool,
) -> Vec<FilterOutcome> {
    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if force_rehash {
            out.push(FilterOutcome::Changed(candidate));
            continue;
        }
        match media_parts.find_by_path(&candidate.path).await {
            Ok(Some(part)) if part.matches_candidate(&candidate.path, candidate.size, candidate.mtime) => {
                out.push(FilterOutcome::Known(candidate));
            }
            _ => out.push(FilterOutcome::Changed(candidate)),
        }
    }
    out
}

use crate::scan::discover::{discover, CandidateFile};
use crate::scan::extract::extract;
use crate::scan::filter::{filter, FilterOutcome};
use crate::scan::matcher::group;
use crate::scan::persist::{persist, reconcile_vanished};
use crate::scan::{classify::classify, normalize::normalize};
use async_trait::async_trait;
use nexa_contracts::agent::MetadataAgent;
use nexa_contracts::catalog::{LibrarySectionRepository, MediaPartRepository, MetadataItemRepository};
use nexa_contracts::error::CoreResult;
use nexa_contracts::jobs::{JobSubmitter, JobWorker, ProgressSink};
use nexa_model::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Drives discover → filter → classify → match → extract → normalize →
/// persist across one library section's roots, reporting progress at the
/// unit granularity, per spec.md §4.B.
///
/// A failure classifying or extracting a single unit is logged and that
/// unit is skipped; a failure reading a root path aborts the whole run as
/// failed; a persist failure is retried once before the unit is dropped.
pub struct LibraryScanWorker {
    sections: Arc<dyn LibrarySectionRepository>,
    items: Arc<dyn MetadataItemRepository>,
    media_parts: Arc<dyn MediaPartRepository>,
    agents: Vec<Arc<dyn MetadataAgent>>,
    genre_map: GenreMappingSettings,
    tag_moderation: TagModerationSettings,
    downstream: Arc<dyn JobSubmitter>,
}

impl LibraryScanWorker {
    pub fn new(
        sections: Arc<dyn LibrarySectionRepository>,
        items: Arc<dyn MetadataItemRepository>,
        media_parts: Arc<dyn MediaPartRepository>,
        agents: Vec<Arc<dyn MetadataAgent>>,
        genre_map: GenreMappingSettings,
        tag_moderation: TagModerationSettings,
        downstream: Arc<dyn JobSubmitter>,
    ) -> Self {
        Self { sections, items, media_parts, agents, genre_map, tag_moderation, downstream }
    }
}

#[async_trait]
impl JobWorker for LibraryScanWorker {
    fn job_type(&self) -> JobType {
        JobType::LibraryScan
    }

    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()> {
        let library_section_id = match scope {
            JobScope::LibrarySection(id) => id,
            JobScope::Item(_) => {
                sink.fail("library scan requires a library section scope".into());
                return Ok(());
            }
        };

        let section = match self.sections.get(library_section_id).await {
            Ok(s) => s,
            Err(e) => {
                sink.fail(format!("failed to load library section: {e}"));
                return Ok(());
            }
        };

        let roots: Vec<std::path::PathBuf> = section.locations.iter().map(|l| l.path.clone()).collect();
        let candidates = discover(roots).await;
        let by_path: HashMap<std::path::PathBuf, CandidateFile> =
            candidates.iter().map(|c| (c.path.clone(), c.clone())).collect();

        let outcomes = filter(candidates, &self.media_parts, false).await;
        let mut seen_item_ids: Vec<MetadataItemId> = Vec::new();
        let mut classified = Vec::new();
        for outcome in outcomes {
            match outcome {
                FilterOutcome::Known(candidate) => {
                    if let Ok(Some(part)) = self.media_parts.find_by_path(&candidate.path).await {
                        seen_item_ids.push(part.item_id);
                    }
                }
                FilterOutcome::Changed(candidate) => {
                    match classify(section.library_type, &candidate) {
                        Some(item_type) => classified.push((candidate, item_type)),
                        None => tracing::debug!(path = %candidate.path.display(), "no classifier matched, skipping"),
                    }
                }
            }
        }

        let units = group(section.library_type, classified);
        let total = units.len() as i64;
        sink.report(0, Some(total));

        for (processed, unit) in units.into_iter().enumerate() {
            let existing = match unit.paths.first() {
                Some(path) => self.items.find_by_path(path).await.unwrap_or(None),
                None => None,
            };
            let is_new = existing.is_none();

            let hints = match extract(&self.agents, &unit).await {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(error = %e, "metadata extraction failed for unit, skipping");
                    sink.report(processed as i64 + 1, Some(total));
                    continue;
                }
            };

            let item = normalize(library_section_id, &unit, &hints, existing, &self.genre_map, &self.tag_moderation);
            let item_id = item.id;
            let unit_candidates: Vec<CandidateFile> = unit
                .paths
                .iter()
                .filter_map(|p| by_path.get(p).cloned())
                .collect();

            let mut attempt = persist(self.items.clone(), vec![(item.clone(), is_new, unit_candidates.clone())]).await;
            if attempt.is_err() {
                tracing::warn!(item_id = %item_id, "persist failed, retrying once");
                attempt = persist(self.items.clone(), vec![(item, is_new, unit_candidates)]).await;
            }

            match attempt {
                Ok(_) => {
                    seen_item_ids.push(item_id);
                    if is_new {
                        let _ = self
                            .downstream
                            .submit(JobScope::Item(item_id), JobType::ImageGeneration)
                            .await;
                        if matches!(unit.intended_type, MetadataType::Movie | MetadataType::Episode) {
                            let _ = self
                                .downstream
                                .submit(JobScope::Item(item_id), JobType::TrickplayGeneration)
                                .await;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(item_id = %item_id, error = %e, "persist failed twice, dropping unit");
                }
            }

            sink.report(processed as i64 + 1, Some(total));
        }

        if let Err(e) = reconcile_vanished(self.items.clone(), library_section_id, &seen_item_ids).await {
            tracing::warn!(error = %e, "failed to reconcile vanished items after scan");
        }

        let _ = self.sections.mark_scanned(library_section_id).await;
        Ok(())
    }
}

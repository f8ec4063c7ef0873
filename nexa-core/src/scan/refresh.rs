//! Re-running Extract/Normalize against already-discovered media, without
//! a filesystem walk, for job type `MetadataRefresh` (spec.md §4.B step 6,
//! §6 mutations `refreshLibraryMetadata`/`refreshItemMetadata`).

use crate::scan::extract::extract;
use crate::scan::normalize::normalize;
use async_trait::async_trait;
use nexa_contracts::agent::{MetadataAgent, ScanUnit};
use nexa_contracts::catalog::{
    LibrarySectionRepository, MediaPartRepository, MetadataItemFilter, MetadataItemRepository, MetadataSortField,
    SortOrder,
};
use nexa_contracts::error::CoreResult;
use nexa_contracts::jobs::{JobWorker, ProgressSink};
use nexa_model::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct MetadataRefreshWorker {
    sections: Arc<dyn LibrarySectionRepository>,
    items: Arc<dyn MetadataItemRepository>,
    media_parts: Arc<dyn MediaPartRepository>,
    agents: Vec<Arc<dyn MetadataAgent>>,
    genre_map: GenreMappingSettings,
    tag_moderation: TagModerationSettings,
}

impl MetadataRefreshWorker {
    pub fn new(
        sections: Arc<dyn LibrarySectionRepository>,
        items: Arc<dyn MetadataItemRepository>,
        media_parts: Arc<dyn MediaPartRepository>,
        agents: Vec<Arc<dyn MetadataAgent>>,
        genre_map: GenreMappingSettings,
        tag_moderation: TagModerationSettings,
    ) -> Self {
        Self { sections, items, media_parts, agents, genre_map, tag_moderation }
    }

    async fn refresh_one(&self, library_type: LibraryType, item: MetadataItem) -> CoreResult<()> {
        let parts = self.media_parts.for_item(item.id).await?;
        let unit = ScanUnit {
            library_type,
            intended_type: item.item_type,
            paths: parts.into_iter().map(|p| p.path).collect(),
            path_hints: BTreeMap::new(),
        };

        let hints = extract(&self.agents, &unit).await?;
        let section_id = item.library_section_id;
        let updated = normalize(section_id, &unit, &hints, Some(item), &self.genre_map, &self.tag_moderation);
        self.items.update(updated).await?;
        Ok(())
    }
}

#[async_trait]
impl JobWorker for MetadataRefreshWorker {
    fn job_type(&self) -> JobType {
        JobType::MetadataRefresh
    }

    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()> {
        match scope {
            JobScope::Item(item_id) => {
                let item = self.items.get(item_id).await?;
                let section = self.sections.get(item.library_section_id).await?;
                sink.report(0, Some(1));
                if let Err(e) = self.refresh_one(section.library_type, item).await {
                    sink.fail(format!("metadata refresh failed: {e}"));
                    return Ok(());
                }
                sink.report(1, Some(1));
                Ok(())
            }
            JobScope::LibrarySection(section_id) => {
                let section = self.sections.get(section_id).await?;
                let filter = MetadataItemFilter { library_section_id: Some(section_id), ..Default::default() };
                let page = self
                    .items
                    .query(&filter, MetadataSortField::AddedAt, SortOrder::Asc, &Pagination::offset(0, u32::MAX))
                    .await?;

                let total = page.items.len() as i64;
                sink.report(0, Some(total));
                for (i, item) in page.items.into_iter().enumerate() {
                    if let Err(e) = self.refresh_one(section.library_type, item).await {
                        tracing::warn!(error = %e, "metadata refresh failed for item, continuing");
                    }
                    sink.report(i as i64 + 1, Some(total));
                }
                Ok(())
            }
        }
    }
}

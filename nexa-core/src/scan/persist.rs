use crate::scan::discover::CandidateFile;
use chrono::Utc;
use nexa_contracts::catalog::{ItemBatch, MetadataItemRepository, MetadataItemFilter};
use nexa_contracts::error::CoreResult;
use nexa_model::prelude::*;
use std::sync::Arc;

pub struct PersistedUnit {
    pub item: MetadataItem,
    pub media_parts: Vec<MediaPart>,
    pub is_new: bool,
}

/// Bulk-inserts new items and their parts in one transaction; updates
/// mutable fields on items that already existed. Per spec.md §4.B step 7,
/// this is the one stage serialized per library section.
pub async fn persist(
    items: Arc<dyn MetadataItemRepository>,
    units: Vec<(MetadataItem, bool, Vec<CandidateFile>)>,
) -> CoreResult<Vec<PersistedUnit>> {
    let mut to_insert = ItemBatch::default();
    let mut updates = Vec::new();
    let mut results = Vec::with_capacity(units.len());

    for (item, is_new, candidates) in units {
        let parts: Vec<MediaPart> = candidates
            .into_iter()
            .map(|c| MediaPart {
                id: MediaPartId::new(),
                item_id: item.id,
                path: c.path,
                size_bytes: c.size,
                mtime: c.mtime,
                container: c.extension.clone().into(),
                video_codec: None,
                audio_codec: None,
                width: None,
                height: None,
                duration_ms: None,
                language: None,
                created_at: Utc::now(),
            })
            .collect();

        if is_new {
            to_insert.items.push(item.clone());
            to_insert.media_parts.extend(parts.clone());
            results.push(PersistedUnit { item, media_parts: parts, is_new: true });
        } else {
            updates.push(item.clone());
            results.push(PersistedUnit { item, media_parts: parts, is_new: false });
        }
    }

    if !to_insert.items.is_empty() {
        items.bulk_insert(to_insert).await?;
    }
    for item in updates {
        items.update(item).await?;
    }

    Ok(results)
}

/// Items in `library_section_id` whose media parts have all vanished
/// during this scan should be soft-deleted; a later rescan that finds the
/// path again revives them (spec.md §3 "Lifecycles").
pub async fn reconcile_vanished(
    items: Arc<dyn MetadataItemRepository>,
    library_section_id: LibrarySectionId,
    seen_item_ids: &[MetadataItemId],
) -> CoreResult<u64> {
    let filter = MetadataItemFilter { library_section_id: Some(library_section_id), ..Default::default() };
    let existing = items
        .query(
            &filter,
            nexa_contracts::catalog::MetadataSortField::AddedAt,
            nexa_contracts::catalog::SortOrder::Asc,
            &Pagination::offset(0, u32::MAX),
        )
        .await?;
    let mut purged = 0;
    for item in existing.items {
        if !seen_item_ids.contains(&item.id) {
            items.soft_delete(item.id).await?;
            purged += 1;
        }
    }
    Ok(purged)
}

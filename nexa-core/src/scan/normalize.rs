use crate::catalog::sort_name;
use nexa_contracts::agent::{HintValue, Hints, ScanUnit};
use nexa_model::prelude::*;

/// Maps merged agent hints onto the typed data model, per spec.md §4.B
/// step 6. Locked fields on an existing item are never touched by agent
/// hints; a brand-new item (no `existing`) starts with nothing locked, so
/// every hint applies.
pub fn normalize(
    library_section_id: LibrarySectionId,
    unit: &ScanUnit,
    hints_list: &[Hints],
    existing: Option<MetadataItem>,
    genre_map: &GenreMappingSettings,
    tag_moderation: &TagModerationSettings,
) -> MetadataItem {
    let mut item = existing.unwrap_or_else(|| blank_item(library_section_id, unit));
    let mut genres_raw = Vec::new();
    let mut tags_raw = Vec::new();

    for hints in hints_list {
        for (key, value) in &hints.values {
            match (key.as_str(), value) {
                ("title", HintValue::Text(t)) => {
                    if item.apply_agent_title(t.clone()) {
                        item.sort_title = sort_name::generate(&item.title, "");
                    }
                }
                ("original_title", HintValue::Text(t)) if !item.locked_fields.contains("original_title") => {
                    item.original_title = Some(t.clone());
                }
                ("summary", HintValue::Text(t)) if !item.locked_fields.contains("summary") => {
                    item.summary = Some(t.clone());
                }
                ("tagline", HintValue::Text(t)) if !item.locked_fields.contains("tagline") => {
                    item.tagline = Some(t.clone());
                }
                ("content_rating", HintValue::Text(t)) if !item.locked_fields.contains("content_rating") => {
                    item.content_rating = Some(t.clone());
                }
                ("year", HintValue::Number(n)) if !item.locked_fields.contains("year") => {
                    item.year = Some(*n as i32);
                }
                ("length_ms", HintValue::Number(n)) if !item.locked_fields.contains("length_ms") => {
                    item.length_ms = Some(*n as i64);
                }
                ("genres", HintValue::StringList(list)) if !item.locked_fields.contains("genres") => {
                    genres_raw.extend(list.iter().cloned());
                }
                ("tags", HintValue::StringList(list)) if !item.locked_fields.contains("tags") => {
                    tags_raw.extend(list.iter().cloned());
                }
                (_, HintValue::ExternalId { provider, value }) if !item.locked_fields.contains("external_ids") => {
                    item.external_ids.insert(provider.clone(), value.clone());
                }
                (key @ ("season_number" | "episode_number"), HintValue::Number(n))
                    if !item.locked_fields.contains(key) =>
                {
                    item.extra_fields.insert(key.to_string(), serde_json::json!(*n as i64));
                }
                _ => {}
            }
        }
    }

    if !genres_raw.is_empty() {
        item.genres = genre_map.canonicalize(&genres_raw);
    }
    if !tags_raw.is_empty() {
        item.tags = tag_moderation.filter(&tags_raw);
    }

    item
}

fn blank_item(library_section_id: LibrarySectionId, unit: &ScanUnit) -> MetadataItem {
    let title = unit
        .path_hints
        .get("directory_name")
        .cloned()
        .or_else(|| {
            unit.paths
                .first()
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Untitled".to_string());
    let sort_title = sort_name::generate(&title, "");

    MetadataItem {
        id: MetadataItemId::new(),
        library_section_id,
        item_type: unit.intended_type,
        title,
        sort_title,
        original_title: None,
        summary: None,
        tagline: None,
        content_rating: None,
        year: None,
        originally_available_at: None,
        genres: Vec::new(),
        tags: Vec::new(),
        locked_fields: Default::default(),
        thumb_uri: None,
        art_uri: None,
        logo_uri: None,
        thumb_blurhash: None,
        art_blurhash: None,
        length_ms: None,
        primary_person_id: None,
        external_ids: Default::default(),
        extra_fields: Default::default(),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
        deleted_at: None,
    }
}

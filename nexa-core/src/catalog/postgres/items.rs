use super::{map_tx_error, not_found};
use crate::catalog::natural_sort;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use nexa_contracts::catalog::{
    BulkInsertResult, ItemBatch, MetadataItemFilter, MetadataItemRepository, MetadataSortField,
    Page, SortOrder,
};
use nexa_contracts::error::CoreResult;
use nexa_model::prelude::*;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub struct PgMetadataItemRepository {
    pool: PgPool,
}

impl PgMetadataItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    library_section_id: Uuid,
    item_type: String,
    title: String,
    sort_title: String,
    original_title: Option<String>,
    summary: Option<String>,
    tagline: Option<String>,
    content_rating: Option<String>,
    year: Option<i32>,
    originally_available_at: Option<NaiveDate>,
    genres: JsonValue,
    tags: JsonValue,
    locked_fields: JsonValue,
    thumb_uri: Option<String>,
    art_uri: Option<String>,
    logo_uri: Option<String>,
    thumb_blurhash: Option<String>,
    art_blurhash: Option<String>,
    length_ms: Option<i64>,
    primary_person_id: Option<Uuid>,
    external_ids: JsonValue,
    extra_fields: JsonValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// The `sort_key` half of a `query` result's cursor: the same field the
/// in-process sort above orders by, rendered as a comparable string.
fn sort_key(item: &MetadataItem, sort: MetadataSortField) -> String {
    match sort {
        MetadataSortField::SortTitle => item.sort_title.clone(),
        MetadataSortField::Year => item.year.unwrap_or(0).to_string(),
        MetadataSortField::OriginallyAvailableAt => item.originally_available_at.map(|d| d.to_string()).unwrap_or_default(),
        MetadataSortField::AddedAt => item.created_at.to_rfc3339(),
    }
}

fn item_type_key(t: MetadataType) -> String {
    format!("{:?}", t).to_uppercase()
}

fn parse_item_type(s: &str) -> MetadataType {
    // Best-effort: mirrors the Debug-derived uppercase keys written by
    // `item_type_key`; unrecognized values fall back to the catch-all
    // extra bucket rather than panicking on unfamiliar rows.
    let normalized = s.replace('_', "");
    let variants = [
        MetadataType::Movie,
        MetadataType::Show,
        MetadataType::Season,
        MetadataType::Episode,
        MetadataType::AlbumReleaseGroup,
        MetadataType::AlbumRelease,
        MetadataType::AlbumMedium,
        MetadataType::Track,
        MetadataType::AudioWork,
        MetadataType::BookSeries,
        MetadataType::EditionGroup,
        MetadataType::Edition,
        MetadataType::EditionItem,
        MetadataType::LiteraryWork,
        MetadataType::LiteraryWorkPart,
        MetadataType::Game,
        MetadataType::GameRelease,
        MetadataType::Person,
        MetadataType::Group,
        MetadataType::Playlist,
        MetadataType::Photo,
        MetadataType::Picture,
        MetadataType::PhotoAlbum,
        MetadataType::PictureSet,
        MetadataType::Collection,
        MetadataType::Trailer,
        MetadataType::Featurette,
        MetadataType::DeletedScene,
        MetadataType::BehindTheScenes,
        MetadataType::Interview,
        MetadataType::Short,
        MetadataType::Scene,
        MetadataType::ExtraOther,
    ];
    variants
        .into_iter()
        .find(|v| format!("{:?}", v).to_uppercase().replace('_', "") == normalized)
        .unwrap_or(MetadataType::ExtraOther)
}

impl From<ItemRow> for MetadataItem {
    fn from(row: ItemRow) -> Self {
        MetadataItem {
            id: row.id.into(),
            library_section_id: row.library_section_id.into(),
            item_type: parse_item_type(&row.item_type),
            title: row.title,
            sort_title: row.sort_title,
            original_title: row.original_title,
            summary: row.summary,
            tagline: row.tagline,
            content_rating: row.content_rating,
            year: row.year,
            originally_available_at: row.originally_available_at,
            genres: serde_json::from_value(row.genres).unwrap_or_default(),
            tags: serde_json::from_value(row.tags).unwrap_or_default(),
            locked_fields: serde_json::from_value::<BTreeSet<String>>(row.locked_fields)
                .unwrap_or_default(),
            thumb_uri: row.thumb_uri,
            art_uri: row.art_uri,
            logo_uri: row.logo_uri,
            thumb_blurhash: row.thumb_blurhash,
            art_blurhash: row.art_blurhash,
            length_ms: row.length_ms,
            primary_person_id: row.primary_person_id.map(Into::into),
            external_ids: serde_json::from_value::<BTreeMap<String, String>>(row.external_ids)
                .unwrap_or_default(),
            extra_fields: serde_json::from_value(row.extra_fields).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const SELECT: &str = "select id, library_section_id, item_type, title, sort_title, original_title, \
    summary, tagline, content_rating, year, originally_available_at, genres, tags, locked_fields, \
    thumb_uri, art_uri, logo_uri, thumb_blurhash, art_blurhash, length_ms, primary_person_id, \
    external_ids, extra_fields, created_at, updated_at, deleted_at from metadata_items";

#[async_trait]
impl MetadataItemRepository for PgMetadataItemRepository {
    async fn get(&self, id: MetadataItemId) -> CoreResult<MetadataItem> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("{SELECT} where id = $1 and deleted_at is null"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_tx_error)?;
        row.map(Into::into).ok_or_else(|| not_found("metadata item not found"))
    }

    async fn find_by_path(&self, path: &std::path::Path) -> CoreResult<Option<MetadataItem>> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "{SELECT} where id = (select item_id from media_parts where path = $1) and deleted_at is null"
        ))
        .bind(path.display().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(row.map(Into::into))
    }

    async fn query(
        &self,
        filter: &MetadataItemFilter,
        sort: MetadataSortField,
        order: SortOrder,
        pagination: &Pagination,
    ) -> CoreResult<Page<MetadataItem>> {
        // Fetch candidates with the straightforward SQL-expressible
        // filters, then apply natural-sort and genre filtering in-process:
        // natural order over text cannot be expressed portably in SQL, and
        // genre membership lives inside a JSON array.
        let mut sql = SELECT.to_string();
        let mut clauses = Vec::new();
        if !filter.include_deleted {
            clauses.push("deleted_at is null".to_string());
        }
        if let Some(lib) = filter.library_section_id {
            clauses.push(format!("library_section_id = '{}'", lib.as_uuid()));
        }
        if !clauses.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&clauses.join(" and "));
        }

        let rows: Vec<ItemRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_tx_error)?;

        let mut items: Vec<MetadataItem> = rows.into_iter().map(Into::into).collect();

        if !filter.item_types.is_empty() {
            items.retain(|i| filter.item_types.contains(&i.item_type));
        }
        if let Some(genre) = &filter.genre {
            items.retain(|i| i.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)));
        }
        if let Some(q) = &filter.text_query {
            let q = q.to_lowercase();
            items.retain(|i| i.title.to_lowercase().contains(&q));
        }

        items.sort_by(|a, b| {
            let ord = match sort {
                MetadataSortField::SortTitle => natural_sort::compare(&a.sort_title, &b.sort_title),
                MetadataSortField::Year => a.year.cmp(&b.year),
                MetadataSortField::OriginallyAvailableAt => {
                    a.originally_available_at.cmp(&b.originally_available_at)
                }
                MetadataSortField::AddedAt => a.created_at.cmp(&b.created_at),
            }
            // Tiebreak on row id so the sort is a total order: a cursor
            // re-locating its position needs an unambiguous successor.
            .then_with(|| row_id_from_uuid(a.id.as_uuid()).cmp(&row_id_from_uuid(b.id.as_uuid())));
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let (page, start, total) = paginate(items, pagination, |item| (sort_key(item, sort), row_id_from_uuid(item.id.as_uuid())));

        let has_next = (start + page.len() as u64) < total;
        let start_cursor = page
            .first()
            .map(|item| Cursor { sort_key: sort_key(item, sort), row_id: row_id_from_uuid(item.id.as_uuid()) }.encode());
        let end_cursor = page
            .last()
            .map(|item| Cursor { sort_key: sort_key(item, sort), row_id: row_id_from_uuid(item.id.as_uuid()) }.encode());
        Ok(Page {
            items: page,
            total: Some(total),
            page_info: PageInfo {
                has_next_page: has_next,
                has_previous_page: start > 0,
                start_cursor,
                end_cursor,
            },
        })
    }

    async fn create(&self, item: MetadataItem) -> CoreResult<MetadataItem> {
        insert_item(&self.pool, &item).await.map_err(map_tx_error)?;
        self.get(item.id).await
    }

    async fn update(&self, item: MetadataItem) -> CoreResult<MetadataItem> {
        sqlx::query(
            "update metadata_items set title = $2, sort_title = $3, original_title = $4, \
             summary = $5, tagline = $6, content_rating = $7, year = $8, \
             originally_available_at = $9, genres = $10, tags = $11, locked_fields = $12, \
             thumb_uri = $13, art_uri = $14, logo_uri = $15, thumb_blurhash = $16, \
             art_blurhash = $17, length_ms = $18, primary_person_id = $19, external_ids = $20, \
             extra_fields = $21, updated_at = now() where id = $1",
        )
        .bind(item.id.as_uuid())
        .bind(&item.title)
        .bind(&item.sort_title)
        .bind(&item.original_title)
        .bind(&item.summary)
        .bind(&item.tagline)
        .bind(&item.content_rating)
        .bind(item.year)
        .bind(item.originally_available_at)
        .bind(serde_json::to_value(&item.genres).unwrap())
        .bind(serde_json::to_value(&item.tags).unwrap())
        .bind(serde_json::to_value(&item.locked_fields).unwrap())
        .bind(&item.thumb_uri)
        .bind(&item.art_uri)
        .bind(&item.logo_uri)
        .bind(&item.thumb_blurhash)
        .bind(&item.art_blurhash)
        .bind(item.length_ms)
        .bind(item.primary_person_id.map(|p| p.as_uuid()))
        .bind(serde_json::to_value(&item.external_ids).unwrap())
        .bind(serde_json::to_value(&item.extra_fields).unwrap())
        .execute(&self.pool)
        .await
        .map_err(map_tx_error)?;
        self.get(item.id).await
    }

    async fn soft_delete(&self, id: MetadataItemId) -> CoreResult<()> {
        sqlx::query("update metadata_items set deleted_at = now() where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(())
    }

    async fn revive(&self, id: MetadataItemId) -> CoreResult<()> {
        sqlx::query("update metadata_items set deleted_at = null where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(())
    }

    async fn bulk_insert(&self, batch: ItemBatch) -> CoreResult<BulkInsertResult> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;
        let mut ids = Vec::with_capacity(batch.items.len());
        for item in &batch.items {
            insert_item_tx(&mut tx, item).await.map_err(map_tx_error)?;
            ids.push(item.id);
        }
        for part in &batch.media_parts {
            sqlx::query(
                "insert into media_parts (id, item_id, path, size_bytes, mtime, container, \
                 video_codec, audio_codec, width, height, duration_ms, language) \
                 values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12) \
                 on conflict (path) do update set item_id = excluded.item_id, \
                 size_bytes = excluded.size_bytes, mtime = excluded.mtime",
            )
            .bind(part.id.as_uuid())
            .bind(part.item_id.as_uuid())
            .bind(part.path.display().to_string())
            .bind(part.size_bytes)
            .bind(part.mtime)
            .bind(&part.container)
            .bind(&part.video_codec)
            .bind(&part.audio_codec)
            .bind(part.width)
            .bind(part.height)
            .bind(part.duration_ms)
            .bind(&part.language)
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        }
        for rel in &batch.relations {
            sqlx::query(
                "insert into relations (kind, parent_item_id, child_item_id, person_id, \
                 subject_item_id, role, sort_order) values ($1,$2,$3,$4,$5,$6,$7)",
            )
            .bind(format!("{:?}", rel.kind).to_uppercase())
            .bind(rel.parent_item_id.map(|i| i.as_uuid()))
            .bind(rel.child_item_id.map(|i| i.as_uuid()))
            .bind(rel.person_id.map(|p| p.as_uuid()))
            .bind(rel.subject_item_id.map(|i| i.as_uuid()))
            .bind(&rel.role)
            .bind(rel.sort_order)
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        }
        tx.commit().await.map_err(map_tx_error)?;
        Ok(BulkInsertResult { item_ids: ids })
    }

    async fn lock_fields(&self, id: MetadataItemId, fields: Vec<String>) -> CoreResult<MetadataItem> {
        let mut item = self.get(id).await?;
        item.lock(fields);
        self.update(item).await
    }

    async fn unlock_fields(&self, id: MetadataItemId, fields: Vec<String>) -> CoreResult<MetadataItem> {
        let mut item = self.get(id).await?;
        item.unlock(fields);
        self.update(item).await
    }
}

/// Fetches items by id, preserving the caller's ordering of `ids` — used by
/// `RelationRepository::children_of` where `relations.sort_order` already
/// fixed the order before this lookup.
pub(crate) async fn select_items_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<MetadataItem>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<ItemRow> = sqlx::query_as(&format!("{SELECT} where id = any($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await?;
    let mut by_id: std::collections::HashMap<Uuid, MetadataItem> = rows
        .into_iter()
        .map(|r| (r.id, MetadataItem::from(r)))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

async fn insert_item(pool: &PgPool, item: &MetadataItem) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    insert_item_tx(&mut tx, item).await?;
    tx.commit().await
}

async fn insert_item_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    item: &MetadataItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "insert into metadata_items (id, library_section_id, item_type, title, sort_title, \
         original_title, summary, tagline, content_rating, year, originally_available_at, \
         genres, tags, locked_fields, thumb_uri, art_uri, logo_uri, thumb_blurhash, \
         art_blurhash, length_ms, primary_person_id, external_ids, extra_fields) \
         values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23) \
         on conflict (id) do nothing",
    )
    .bind(item.id.as_uuid())
    .bind(item.library_section_id.as_uuid())
    .bind(item_type_key(item.item_type))
    .bind(&item.title)
    .bind(&item.sort_title)
    .bind(&item.original_title)
    .bind(&item.summary)
    .bind(&item.tagline)
    .bind(&item.content_rating)
    .bind(item.year)
    .bind(item.originally_available_at)
    .bind(serde_json::to_value(&item.genres).unwrap())
    .bind(serde_json::to_value(&item.tags).unwrap())
    .bind(serde_json::to_value(&item.locked_fields).unwrap())
    .bind(&item.thumb_uri)
    .bind(&item.art_uri)
    .bind(&item.logo_uri)
    .bind(&item.thumb_blurhash)
    .bind(&item.art_blurhash)
    .bind(item.length_ms)
    .bind(item.primary_person_id.map(|p| p.as_uuid()))
    .bind(serde_json::to_value(&item.external_ids).unwrap())
    .bind(serde_json::to_value(&item.extra_fields).unwrap())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

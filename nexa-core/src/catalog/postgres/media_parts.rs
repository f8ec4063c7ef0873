use super::map_tx_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexa_contracts::catalog::MediaPartRepository;
use nexa_contracts::error::CoreResult;
use nexa_model::prelude::*;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct PgMediaPartRepository {
    pool: PgPool,
}

impl PgMediaPartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PartRow {
    id: Uuid,
    item_id: Uuid,
    path: String,
    size_bytes: i64,
    mtime: DateTime<Utc>,
    container: Option<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    duration_ms: Option<i64>,
    language: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PartRow> for MediaPart {
    fn from(row: PartRow) -> Self {
        MediaPart {
            id: row.id.into(),
            item_id: row.item_id.into(),
            path: PathBuf::from(row.path),
            size_bytes: row.size_bytes,
            mtime: row.mtime,
            container: row.container,
            video_codec: row.video_codec,
            audio_codec: row.audio_codec,
            width: row.width,
            height: row.height,
            duration_ms: row.duration_ms,
            language: row.language,
            created_at: row.created_at,
        }
    }
}

const SELECT: &str = "select id, item_id, path, size_bytes, mtime, container, video_codec, \
    audio_codec, width, height, duration_ms, language, created_at from media_parts";

#[async_trait]
impl MediaPartRepository for PgMediaPartRepository {
    async fn find_by_path(&self, path: &Path) -> CoreResult<Option<MediaPart>> {
        let row: Option<PartRow> = sqlx::query_as(&format!("{SELECT} where path = $1"))
            .bind(path.display().to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(row.map(Into::into))
    }

    async fn for_item(&self, item_id: MetadataItemId) -> CoreResult<Vec<MediaPart>> {
        let rows: Vec<PartRow> = sqlx::query_as(&format!("{SELECT} where item_id = $1 order by path"))
            .bind(item_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert(&self, part: MediaPart) -> CoreResult<MediaPart> {
        sqlx::query(
            "insert into media_parts (id, item_id, path, size_bytes, mtime, container, \
             video_codec, audio_codec, width, height, duration_ms, language) \
             values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12) \
             on conflict (path) do update set item_id = excluded.item_id, \
             size_bytes = excluded.size_bytes, mtime = excluded.mtime, \
             container = excluded.container, video_codec = excluded.video_codec, \
             audio_codec = excluded.audio_codec, width = excluded.width, \
             height = excluded.height, duration_ms = excluded.duration_ms, \
             language = excluded.language",
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
        .execute(&self.pool)
        .await
        .map_err(map_tx_error)?;

        self.find_by_path(&part.path)
            .await?
            .ok_or_else(|| nexa_contracts::error::CoreError::not_found("media part not found after upsert"))
    }

    async fn delete_missing(&self, item_id: MetadataItemId, keep_paths: &[PathBuf]) -> CoreResult<u64> {
        let keep: Vec<String> = keep_paths.iter().map(|p| p.display().to_string()).collect();
        let result = sqlx::query("delete from media_parts where item_id = $1 and not (path = any($2))")
            .bind(item_id.as_uuid())
            .bind(&keep)
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(result.rows_affected())
    }
}

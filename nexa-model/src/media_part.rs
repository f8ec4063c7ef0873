use crate::ids::{MediaPartId, MetadataItemId};
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A concrete file on disk linked to an item. `path` is globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct MediaPart {
    pub id: MediaPartId,
    pub item_id: MetadataItemId,
    #[graphql(skip)]
    pub path: std::path::PathBuf,
    pub size_bytes: i64,
    pub mtime: DateTime<Utc>,
    pub container: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_ms: Option<i64>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MediaPart {
    /// Fast-path fingerprint used by the scan pipeline's Filter stage to
    /// decide whether a candidate file has already been fully persisted.
    pub fn fingerprint(&self) -> (String, i64, DateTime<Utc>) {
        (self.path.display().to_string(), self.size_bytes, self.mtime)
    }

    pub fn matches_candidate(&self, path: &std::path::Path, size: i64, mtime: DateTime<Utc>) -> bool {
        self.path == path && self.size_bytes == size && self.mtime == mtime
    }
}

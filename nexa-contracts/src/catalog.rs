use crate::error::CoreResult;
use async_trait::async_trait;
use nexa_model::prelude::*;
use std::path::PathBuf;

/// Ordering direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, async_graphql::Enum)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A composable filter predicate over `MetadataItem` queries. Repository
/// implementations translate this into a `WHERE` clause; in-memory fakes
/// translate it into a closure.
#[derive(Debug, Clone, Default)]
pub struct MetadataItemFilter {
    pub library_section_id: Option<LibrarySectionId>,
    pub item_types: Vec<MetadataType>,
    pub genre: Option<String>,
    pub text_query: Option<String>,
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, async_graphql::Enum)]
pub enum MetadataSortField {
    SortTitle,
    Year,
    OriginallyAvailableAt,
    AddedAt,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub page_info: PageInfo,
}

/// A batch of items plus their child collections, persisted in one
/// transaction by the scan pipeline's Persist stage.
#[derive(Debug, Clone, Default)]
pub struct ItemBatch {
    pub items: Vec<MetadataItem>,
    pub media_parts: Vec<MediaPart>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default)]
pub struct BulkInsertResult {
    pub item_ids: Vec<MetadataItemId>,
}

/// A composable filter predicate over `LibrarySection` queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibrarySectionFilter {
    pub library_type: Option<LibraryType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, async_graphql::Enum)]
pub enum LibrarySectionSortField {
    Name,
    CreatedAt,
}

#[async_trait]
pub trait LibrarySectionRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<LibrarySection>>;
    async fn query(
        &self,
        filter: &LibrarySectionFilter,
        sort: LibrarySectionSortField,
        order: SortOrder,
        pagination: &Pagination,
    ) -> CoreResult<Page<LibrarySection>>;
    async fn get(&self, id: LibrarySectionId) -> CoreResult<LibrarySection>;
    async fn create(&self, name: String, library_type: LibraryType, roots: Vec<PathBuf>) -> CoreResult<LibrarySection>;
    async fn update_roots(&self, id: LibrarySectionId, roots: Vec<PathBuf>) -> CoreResult<LibrarySection>;
    /// Cascades: deletes every `MetadataItem` attributed to this section.
    async fn delete(&self, id: LibrarySectionId) -> CoreResult<()>;
    async fn mark_scanned(&self, id: LibrarySectionId) -> CoreResult<()>;
}

#[async_trait]
pub trait MetadataItemRepository: Send + Sync {
    async fn get(&self, id: MetadataItemId) -> CoreResult<MetadataItem>;
    async fn find_by_path(&self, path: &std::path::Path) -> CoreResult<Option<MetadataItem>>;
    async fn query(
        &self,
        filter: &MetadataItemFilter,
        sort: MetadataSortField,
        order: SortOrder,
        pagination: &Pagination,
    ) -> CoreResult<Page<MetadataItem>>;
    async fn create(&self, item: MetadataItem) -> CoreResult<MetadataItem>;
    async fn update(&self, item: MetadataItem) -> CoreResult<MetadataItem>;
    /// Soft-deletable: sets `deleted_at` rather than removing the row.
    async fn soft_delete(&self, id: MetadataItemId) -> CoreResult<()>;
    async fn revive(&self, id: MetadataItemId) -> CoreResult<()>;
    async fn bulk_insert(&self, batch: ItemBatch) -> CoreResult<BulkInsertResult>;
    async fn lock_fields(&self, id: MetadataItemId, fields: Vec<String>) -> CoreResult<MetadataItem>;
    async fn unlock_fields(&self, id: MetadataItemId, fields: Vec<String>) -> CoreResult<MetadataItem>;
}

#[async_trait]
pub trait MediaPartRepository: Send + Sync {
    async fn find_by_path(&self, path: &std::path::Path) -> CoreResult<Option<MediaPart>>;
    async fn for_item(&self, item_id: MetadataItemId) -> CoreResult<Vec<MediaPart>>;
    async fn upsert(&self, part: MediaPart) -> CoreResult<MediaPart>;
    async fn delete_missing(&self, item_id: MetadataItemId, keep_paths: &[PathBuf]) -> CoreResult<u64>;
}

#[async_trait]
pub trait RelationRepository: Send + Sync {
    async fn children_of(&self, parent_id: MetadataItemId) -> CoreResult<Vec<MetadataItem>>;
    async fn credits_for(&self, item_id: MetadataItemId, kind: CreditKind) -> CoreResult<Vec<Relation>>;
    async fn insert(&self, relation: Relation) -> CoreResult<Relation>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_raw(&self, key: &str) -> CoreResult<Option<String>>;
    async fn set_raw(&self, key: &str, value: &str) -> CoreResult<()>;
    async fn all_raw(&self) -> CoreResult<Vec<ServerSettingRow>>;
}

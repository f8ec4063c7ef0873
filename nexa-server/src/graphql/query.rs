//! Read side of the schema: catalog browsing, hub rows, search, the
//! filesystem browser backing library-root configuration, and active job
//! notifications (spec.md §4.A-§4.E).

use crate::context::Viewer;
use crate::graphql::types::{
    DirectoryEntry, FileSystemRoot, HubItemsInput, ItemSearchHit, PersonSearchHit, SearchHit, SearchPivot, ServerInfo,
};
use crate::graphql::gql;
use crate::state::AppState;
use async_graphql::{Context, Object, Result};
use nexa_contracts::catalog::{LibrarySectionFilter, LibrarySectionSortField, MetadataItemFilter, MetadataSortField, SortOrder};
use nexa_contracts::error::CoreError;
use nexa_contracts::hub::HubQuery;
use nexa_model::prelude::*;

/// Maps a filesystem I/O failure onto `ErrorKind::FileSystemBrowse`, the
/// kind spec.md §7 names for a denied or missing `browseDirectory` path.
fn fs_browse_error(path: &str, e: std::io::Error) -> async_graphql::Error {
    use async_graphql::ErrorExtensions;
    let kind = match e.kind() {
        std::io::ErrorKind::NotFound => "not found",
        std::io::ErrorKind::PermissionDenied => "permission denied",
        _ => "io error",
    };
    CoreError::new(ErrorKind::FileSystemBrowse, format!("cannot browse {path}: {kind}: {e}")).extend()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn server_info(&self, ctx: &Context<'_>) -> Result<ServerInfo> {
        let state = ctx.data::<AppState>()?;
        Ok(ServerInfo { version: env!("CARGO_PKG_VERSION").to_string(), dev_mode: state.config.dev_mode })
    }

    async fn library_sections(
        &self,
        ctx: &Context<'_>,
        library_type: Option<LibraryType>,
        sort: Option<LibrarySectionSortField>,
        order: Option<SortOrder>,
        after: Option<String>,
        take: Option<u32>,
    ) -> Result<Vec<LibrarySection>> {
        let state = ctx.data::<AppState>()?;
        let filter = LibrarySectionFilter { library_type };
        let after = match after {
            Some(raw) => Some(gql(Cursor::decode(&raw).ok_or_else(|| CoreError::invalid_argument("invalid cursor")))?),
            None => None,
        };
        let pagination = Pagination::Cursor { after, take: take.unwrap_or(50) };
        let page = gql(state
            .sections
            .query(&filter, sort.unwrap_or(LibrarySectionSortField::Name), order.unwrap_or(SortOrder::Asc), &pagination)
            .await)?;
        Ok(page.items)
    }

    async fn library_section(&self, ctx: &Context<'_>, id: LibrarySectionId) -> Result<LibrarySection> {
        let state = ctx.data::<AppState>()?;
        gql(state.sections.get(id).await)
    }

    /// Flattened equivalent of `librarySection.children` — see the note on
    /// `LibrarySection` in `nexa-model` for why this can't be a nested
    /// resolver there.
    async fn library_children(
        &self,
        ctx: &Context<'_>,
        library_section_id: LibrarySectionId,
        skip: u32,
        take: u32,
    ) -> Result<Vec<MetadataItem>> {
        let state = ctx.data::<AppState>()?;
        let filter = MetadataItemFilter { library_section_id: Some(library_section_id), ..Default::default() };
        let page = gql(state
            .items
            .query(&filter, MetadataSortField::SortTitle, SortOrder::Asc, &Pagination::offset(skip, take))
            .await)?;
        Ok(page.items)
    }

    async fn library_letter_index(&self, ctx: &Context<'_>, library_section_id: LibrarySectionId) -> Result<Vec<String>> {
        let state = ctx.data::<AppState>()?;
        let filter = MetadataItemFilter { library_section_id: Some(library_section_id), ..Default::default() };
        let page = gql(state
            .items
            .query(&filter, MetadataSortField::SortTitle, SortOrder::Asc, &Pagination::offset(0, u32::MAX))
            .await)?;
        let mut letters: Vec<String> = page
            .items
            .iter()
            .filter_map(|item| item.sort_title.chars().next())
            .map(|c| c.to_uppercase().to_string())
            .collect();
        letters.sort();
        letters.dedup();
        Ok(letters)
    }

    async fn metadata_item(&self, ctx: &Context<'_>, id: MetadataItemId) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        gql(state.items.get(id).await)
    }

    async fn metadata_item_children(&self, ctx: &Context<'_>, parent_id: MetadataItemId) -> Result<Vec<MetadataItem>> {
        let state = ctx.data::<AppState>()?;
        gql(state.relations.children_of(parent_id).await)
    }

    async fn home_hub_definitions(&self, ctx: &Context<'_>) -> Result<Vec<HubDefinition>> {
        let state = ctx.data::<AppState>()?;
        gql(state.hub.get_hub_definitions(HubContext::Home).await)
    }

    async fn library_discover_hub_definitions(&self, ctx: &Context<'_>) -> Result<Vec<HubDefinition>> {
        let state = ctx.data::<AppState>()?;
        gql(state.hub.get_hub_definitions(HubContext::LibraryDiscover).await)
    }

    async fn item_detail_hub_definitions(&self, ctx: &Context<'_>) -> Result<Vec<HubDefinition>> {
        let state = ctx.data::<AppState>()?;
        gql(state.hub.get_hub_definitions(HubContext::ItemDetail).await)
    }

    async fn hub_items(&self, ctx: &Context<'_>, input: HubItemsInput) -> Result<Vec<HubItem>> {
        let state = ctx.data::<AppState>()?;
        let viewer = Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
        let query = HubQuery {
            hub_type: input.hub_type,
            context: input.hub_context,
            user_id: viewer.user.id,
            library_section_id: input.library_section_id,
            item_id: input.item_id,
            filter_value: input.filter_value,
            count: input.count.unwrap_or(20),
        };
        gql(state.hub.get_hub_items(&query).await)
    }

    async fn hub_people(&self, ctx: &Context<'_>, input: HubItemsInput) -> Result<Vec<HubPerson>> {
        let state = ctx.data::<AppState>()?;
        let viewer = Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
        let query = HubQuery {
            hub_type: input.hub_type,
            context: input.hub_context,
            user_id: viewer.user.id,
            library_section_id: input.library_section_id,
            item_id: input.item_id,
            filter_value: input.filter_value,
            count: input.count.unwrap_or(20),
        };
        gql(state.hub.get_hub_people(&query).await)
    }

    /// Title search over items, person search over cast/crew credits,
    /// flattened into one result list the way the Plex-shaped clients this
    /// server targets expect a mixed results feed.
    async fn search(&self, ctx: &Context<'_>, query: String, pivot: SearchPivot, limit: u32) -> Result<Vec<SearchHit>> {
        let state = ctx.data::<AppState>()?;
        match pivot {
            SearchPivot::Title => {
                let filter = MetadataItemFilter { text_query: Some(query), ..Default::default() };
                let page = gql(state
                    .items
                    .query(&filter, MetadataSortField::SortTitle, SortOrder::Asc, &Pagination::offset(0, limit))
                    .await)?;
                Ok(page.items.into_iter().map(|item| SearchHit::Item(ItemSearchHit { item })).collect())
            }
            SearchPivot::Person => {
                let viewer = Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
                let people = gql(state
                    .hub
                    .get_hub_people(&HubQuery {
                        hub_type: HubType::Cast,
                        context: HubContext::ItemDetail,
                        user_id: viewer.user.id,
                        library_section_id: None,
                        item_id: None,
                        filter_value: Some(query),
                        count: limit,
                    })
                    .await)?;
                Ok(people.into_iter().map(|person| SearchHit::Person(PersonSearchHit { person })).collect())
            }
        }
    }

    /// Filesystem roots a library section's locations may be chosen from —
    /// just the platform's mount points, since this server runs on a single
    /// host rather than brokering remote filesystems.
    async fn file_system_roots(&self) -> Result<Vec<FileSystemRoot>> {
        Ok(vec![FileSystemRoot { path: "/".to_string(), label: "Root".to_string() }])
    }

    async fn browse_directory(&self, path: String) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| fs_browse_error(&path, e))?;
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| fs_browse_error(&path, e))? {
            let file_type = entry.file_type().await.map_err(|e| fs_browse_error(&path, e))?;
            entries.push(DirectoryEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_string_lossy().into_owned(),
                is_directory: file_type.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn active_job_notifications(&self, ctx: &Context<'_>) -> Result<Vec<JobNotificationEntry>> {
        let state = ctx.data::<AppState>()?;
        let viewer = Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
        gql(state.jobs.active_for_user(viewer.user.id).await)
    }
}

//! Write side of the schema: scan/refresh job submission, metadata edits
//! and field locking, promotion, and admin settings (spec.md §4.A-§4.E,
//! §6). Administrator-gated mutations call `Viewer::require` with
//! `AuthorizationPolicy::Administrator`.

use crate::context::Viewer;
use crate::graphql::gql;
use crate::graphql::types::HubConfigurationInput;
use crate::state::AppState;
use async_graphql::{Context, Object, Result};
use nexa_model::prelude::*;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn start_library_scan(&self, ctx: &Context<'_>, library_section_id: LibrarySectionId) -> Result<JobNotificationEntry> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.scheduler.submit(JobScope::LibrarySection(library_section_id), JobType::LibraryScan).await)
    }

    async fn refresh_library_metadata(&self, ctx: &Context<'_>, library_section_id: LibrarySectionId) -> Result<JobNotificationEntry> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.scheduler.submit(JobScope::LibrarySection(library_section_id), JobType::MetadataRefresh).await)
    }

    async fn refresh_item_metadata(
        &self,
        ctx: &Context<'_>,
        item_id: MetadataItemId,
        include_children: bool,
    ) -> Result<Vec<JobNotificationEntry>> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;

        let mut entries = vec![gql(state.scheduler.submit(JobScope::Item(item_id), JobType::MetadataRefresh).await)?];
        if include_children {
            let children = gql(state.relations.children_of(item_id).await)?;
            for child in children {
                entries.push(gql(state.scheduler.submit(JobScope::Item(child.id), JobType::MetadataRefresh).await)?);
            }
        }
        Ok(entries)
    }

    async fn analyze_item(&self, ctx: &Context<'_>, item_id: MetadataItemId) -> Result<JobNotificationEntry> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.scheduler.submit(JobScope::Item(item_id), JobType::FileAnalysis).await)
    }

    async fn update_metadata_item(
        &self,
        ctx: &Context<'_>,
        item_id: MetadataItemId,
        input: crate::graphql::types::UpdateMetadataItemInput,
    ) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;

        let mut item = gql(state.items.get(item_id).await)?;
        let mut touched = Vec::new();
        if let Some(title) = input.title {
            item.title = title;
            touched.push("title");
        }
        if let Some(sort_title) = input.sort_title {
            item.sort_title = sort_title;
            touched.push("sort_title");
        }
        if let Some(summary) = input.summary {
            item.summary = Some(summary);
            touched.push("summary");
        }
        if let Some(tagline) = input.tagline {
            item.tagline = Some(tagline);
            touched.push("tagline");
        }
        if let Some(year) = input.year {
            item.year = Some(year);
            touched.push("year");
        }
        if let Some(date) = input.originally_available_at {
            item.originally_available_at = Some(date);
            touched.push("originally_available_at");
        }
        if let Some(genres) = input.genres {
            item.genres = genres;
            touched.push("genres");
        }

        for field in &touched {
            item.locked_fields.insert(field.to_string());
        }

        gql(state.items.update(item).await)
    }

    async fn lock_metadata_fields(&self, ctx: &Context<'_>, item_id: MetadataItemId, fields: Vec<String>) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.items.lock_fields(item_id, fields).await)
    }

    async fn unlock_metadata_fields(&self, ctx: &Context<'_>, item_id: MetadataItemId, fields: Vec<String>) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.items.unlock_fields(item_id, fields).await)
    }

    /// Promotion is a tag, not a dedicated column — "promoted" items are
    /// simply tagged `_promoted`, so it rides the same repository path as
    /// every other tag edit rather than needing its own column/migration.
    async fn promote_item(&self, ctx: &Context<'_>, item_id: MetadataItemId) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        let mut item = gql(state.items.get(item_id).await)?;
        if !item.tags.iter().any(|t| t == "_promoted") {
            item.tags.push("_promoted".to_string());
        }
        gql(state.items.update(item).await)
    }

    async fn unpromote_item(&self, ctx: &Context<'_>, item_id: MetadataItemId) -> Result<MetadataItem> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        let mut item = gql(state.items.get(item_id).await)?;
        item.tags.retain(|t| t != "_promoted");
        gql(state.items.update(item).await)
    }

    async fn update_server_settings(&self, ctx: &Context<'_>, key: String, value: String) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        gql(state.settings.set_raw(&key, &value).await)?;
        Ok(true)
    }

    async fn update_hub_configuration(&self, ctx: &Context<'_>, input: HubConfigurationInput) -> Result<HubConfiguration> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        let scope = HubConfigScope {
            context: input.context,
            library_section_id: input.library_section_id,
            metadata_type: input.metadata_type,
        };
        gql(state.hub.set_configuration(HubConfiguration { scope, enabled: input.enabled, disabled: input.disabled }).await)
    }

    /// Admin detail field visibility is persisted the same way hub
    /// configuration is: a JSON blob under one settings key per item type,
    /// rather than a dedicated table.
    async fn update_admin_detail_field_configuration(
        &self,
        ctx: &Context<'_>,
        item_type: MetadataType,
        visible_fields: Vec<String>,
    ) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        Viewer::require(ctx, AuthorizationPolicy::Administrator)?;
        let key = format!("admin_detail_fields:{item_type:?}");
        let value = gql(serde_json::to_string(&visible_fields).map_err(|e| {
            nexa_contracts::error::CoreError::internal(format!("failed to serialize field list: {e}"))
        }))?;
        gql(state.settings.set_raw(&key, &value).await)?;
        Ok(true)
    }
}

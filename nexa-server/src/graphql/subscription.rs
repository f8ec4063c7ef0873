//! Live feeds: job progress and metadata edits (spec.md §4.E, §6).

use crate::context::Viewer;
use crate::state::AppState;
use async_graphql::{Context, Result, Subscription};
use futures_util::Stream;
use nexa_model::prelude::*;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Bootstraps with every currently-active entry for the caller, then
    /// forwards live updates; see `nexa_core::jobs::subscribe`.
    async fn on_job_notification(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = JobNotificationEntry>> {
        let state = ctx.data::<AppState>()?.clone();
        let viewer = Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
        let receiver = state.scheduler.subscribe();
        Ok(nexa_core::jobs::subscribe(state.jobs.clone(), viewer.user.id, receiver))
    }

    async fn on_metadata_item_updated(&self, ctx: &Context<'_>, item_id: MetadataItemId) -> Result<impl Stream<Item = MetadataItem>> {
        let state = ctx.data::<AppState>()?.clone();
        Viewer::require(ctx, AuthorizationPolicy::Authenticated)?;
        Ok(async_stream::stream! {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(5));
            let mut last_updated_at = None;
            loop {
                ticker.tick().await;
                if let Ok(item) = state.items.get(item_id).await {
                    if Some(item.updated_at) != last_updated_at {
                        last_updated_at = Some(item.updated_at);
                        yield item;
                    }
                }
            }
        })
    }
}

//! Catalog/hub/job query and mutation surface (spec.md §6), mounted under
//! `/graphql`. Plain HTTP handles auth, images, and streaming instead —
//! see `crate::routes`.

mod mutation;
mod query;
mod subscription;
mod types;

use crate::state::AppState;
use async_graphql::Schema;
use mutation::MutationRoot;
use nexa_contracts::error::CoreResult;
use query::QueryRoot;
use subscription::SubscriptionRoot;

pub type NexaSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

pub fn build_schema(state: AppState) -> NexaSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot).data(state).finish()
}

/// Maps a repository/service error onto a GraphQL error carrying the
/// `extensions.code` the HTTP side's `ApiError` also sets, via
/// `CoreError`'s `ErrorExtensions` impl.
pub fn gql<T>(result: CoreResult<T>) -> async_graphql::Result<T> {
    use async_graphql::ErrorExtensions;
    result.map_err(|e| e.extend())
}

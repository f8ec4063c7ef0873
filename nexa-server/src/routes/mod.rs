//! Plain HTTP surface (spec.md §6): auth, image transcoding/trickplay, and
//! media streaming. Catalog/hub/job queries and mutations live in the
//! GraphQL schema instead.

mod auth;
mod images;
mod manage;
mod streaming;

use crate::state::AppState;
use axum::Router;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/images", images::router())
        .nest("/manage", manage::router())
        .merge(streaming::router())
}

//! `GET /api/v1/manage/info` (spec.md §6): resolves the caller's identity
//! from the bearer token, mirroring `AuthService::authenticate`'s use in
//! the GraphQL context extractor.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::http::header;
use axum::routing::get;
use axum::{Json, Router};
use nexa_contracts::error::CoreError;
use nexa_model::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ManageInfo {
    pub user_id: UserId,
    pub email: String,
    pub is_administrator: bool,
    pub session_id: SessionId,
    pub device_id: DeviceId,
}

fn bearer_token(headers: &axum::http::HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(CoreError::unauthenticated("missing Authorization header")))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError(CoreError::unauthenticated("Authorization header is not a bearer token")))
}

async fn info(State(state): State<AppState>, headers: axum::http::HeaderMap) -> ApiResult<Json<ManageInfo>> {
    let token = bearer_token(&headers)?;
    let (user, session) = state.auth.authenticate(token).await?;
    Ok(Json(ManageInfo {
        user_id: user.id,
        email: user.email,
        is_administrator: user.is_administrator,
        session_id: session.id,
        device_id: session.device_id,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

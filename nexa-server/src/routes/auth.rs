//! `POST /api/v1/login`, `/refresh`, `/logout` (spec.md §6).

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use nexa_model::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device: DeviceRegistration,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_id: SessionId,
}

async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<Json<SessionResponse>> {
    let result = state.auth.login(&body.email, &body.password, body.device).await?;
    Ok(Json(SessionResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        user_id: result.user.id,
        session_id: result.session.id,
        expires_at: result.session.expires_at,
    }))
}

async fn refresh(State(state): State<AppState>, Json(body): Json<RefreshRequest>) -> ApiResult<Json<SessionResponse>> {
    let result = state.auth.refresh(&body.refresh_token).await?;
    Ok(Json(SessionResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        user_id: result.user.id,
        session_id: result.session.id,
        expires_at: result.session.expires_at,
    }))
}

async fn logout(State(state): State<AppState>, Json(body): Json<LogoutRequest>) -> ApiResult<Json<serde_json::Value>> {
    state.auth.logout(body.session_id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

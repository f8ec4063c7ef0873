//! `GET /api/v1/images/transcode`, `GET /api/v1/images/trickplay/{item}/bif`
//! (spec.md §4.H, §6).

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use nexa_contracts::error::CoreError;
use nexa_core::image::ImageFormat;
use nexa_model::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TranscodeParams {
    uri: String,
    width: u32,
    height: u32,
    #[serde(default = "default_quality")]
    quality: u8,
    format: Option<String>,
}

fn default_quality() -> u8 {
    85
}

async fn transcode(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Query(params): Query<TranscodeParams>,
) -> ApiResult<impl IntoResponse> {
    let format = params
        .format
        .as_deref()
        .and_then(ImageFormat::from_query_param)
        .unwrap_or_else(|| ImageFormat::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())));

    let bytes = state
        .images
        .transcode(&params.uri, params.width, params.height, params.quality, format)
        .await?;

    Ok(([(header::CONTENT_TYPE, format.mime_type())], bytes))
}

async fn trickplay_bif(State(state): State<AppState>, Path(item_id): Path<MetadataItemId>) -> ApiResult<impl IntoResponse> {
    let parts = state.media_parts.for_item(item_id).await?;
    let part = parts.first().ok_or_else(|| CoreError::not_found("item has no media parts"))?;
    let bif_path = state.config.cache.trickplay.join(format!("{}.bif", part.id));
    let bytes = tokio::fs::read(&bif_path)
        .await
        .map_err(|_| ApiError(CoreError::not_found("trickplay sprite sheet has not been generated yet")))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transcode", get(transcode))
        .route("/trickplay/{item}/bif", get(trickplay_bif))
}

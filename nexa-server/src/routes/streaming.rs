//! `media/{id}` direct play and DASH/HLS segment delivery (spec.md §4.G,
//! §6). Segment production shells out to `ffmpeg`, matching the trickplay
//! worker's pattern of driving the external transcoder binary via
//! `tokio::process` rather than re-encoding in-process.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use nexa_contracts::error::CoreError;
use nexa_contracts::streaming::{CapabilityProfile, DeliveryMode};
use nexa_model::prelude::*;
use nexa_model::settings::{HardwareAcceleration, TranscodeSettings};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

const TRANSCODE_SETTINGS_KEY: &str = "transcode_settings";

async fn transcode_settings(state: &AppState) -> TranscodeSettings {
    match state.settings.get_raw(TRANSCODE_SETTINGS_KEY).await {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
        _ => TranscodeSettings::default(),
    }
}

/// ffmpeg's hwaccel backend name for a given acceleration mode, or `None`
/// for software decode.
fn hwaccel_flag(accel: HardwareAcceleration) -> Option<&'static str> {
    match accel {
        HardwareAcceleration::None => None,
        HardwareAcceleration::Vaapi => Some("vaapi"),
        HardwareAcceleration::Nvenc => Some("cuda"),
        HardwareAcceleration::Qsv => Some("qsv"),
        HardwareAcceleration::VideoToolbox => Some("videotoolbox"),
    }
}

/// ffmpeg H.264 encoder matching the acceleration mode. Transcode targets
/// are always H.264/AAC, matching `capability::resolve_plan`.
fn video_encoder(accel: HardwareAcceleration) -> &'static str {
    match accel {
        HardwareAcceleration::None => "libx264",
        HardwareAcceleration::Vaapi => "h264_vaapi",
        HardwareAcceleration::Nvenc => "h264_nvenc",
        HardwareAcceleration::Qsv => "h264_qsv",
        HardwareAcceleration::VideoToolbox => "h264_videotoolbox",
    }
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub item_id: MetadataItemId,
    pub capability: CapabilityProfile,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub segment_duration_secs: u32,
    pub requires_reload_on_seek: bool,
    pub capability_version_mismatch: bool,
}

async fn start_session(
    State(state): State<AppState>,
    Json(body): Json<StartSessionRequest>,
) -> ApiResult<Json<StartSessionResponse>> {
    let session = state.streaming.start_session(body.item_id, body.capability).await?;
    Ok(Json(StartSessionResponse {
        session_id: session.id,
        container: session.plan.container.clone(),
        video_codec: session.plan.video_codec.clone(),
        audio_codec: session.plan.audio_codec.clone(),
        segment_duration_secs: session.plan.segment_duration_secs,
        requires_reload_on_seek: session.plan.requires_reload_on_seek,
        capability_version_mismatch: session.plan.capability_version_mismatch,
    }))
}

/// Direct-play path: serves the first media part of an item verbatim.
/// Remux/transcode delivery modes are served through the DASH/HLS segment
/// routes instead, since they require a running session.
async fn direct_play(State(state): State<AppState>, Path(item_id): Path<MetadataItemId>) -> ApiResult<impl IntoResponse> {
    let parts = state.media_parts.for_item(item_id).await?;
    let part = parts.first().ok_or_else(|| CoreError::not_found("item has no media parts"))?;
    let bytes = tokio::fs::read(&part.path)
        .await
        .map_err(|e| ApiError(CoreError::new(nexa_model::error::ErrorKind::Unavailable, format!("failed to read media file: {e}"))))?;
    let mime = part.container.as_deref().map(container_mime).unwrap_or("application/octet-stream");
    Ok(([(header::CONTENT_TYPE, mime)], bytes))
}

fn container_mime(container: &str) -> &'static str {
    match container.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" | "mov" => "video/mp4",
        "mkv" | "matroska" | "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

async fn dash_manifest(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> ApiResult<impl IntoResponse> {
    let session = state.streaming.session(session_id)?;
    let duration_ms = session.part.duration_ms.unwrap_or(0);
    let seg_secs = session.plan.segment_duration_secs;
    let segment_count = if seg_secs == 0 { 0 } else { (duration_ms / 1000 / seg_secs as i64).max(1) };

    let manifest = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT{total_secs}S" minBufferTime="PT{seg}S">
  <Period>
    <AdaptationSet mimeType="video/mp4" codecs="{video_codec}" segmentAlignment="true">
      <SegmentTemplate media="seg-$Number$.m4s" duration="{seg}" startNumber="0"/>
      <Representation id="0" bandwidth="4000000">
        <BaseURL>./</BaseURL>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#,
        total_secs = duration_ms / 1000,
        seg = seg_secs,
        video_codec = session.plan.video_codec,
    );
    let _ = segment_count;
    Ok(([(header::CONTENT_TYPE, "application/dash+xml")], manifest))
}

async fn dash_segment(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(Uuid, u32)>,
) -> ApiResult<impl IntoResponse> {
    let bytes = produce_segment(&state, session_id, index, SegmentFormat::Fmp4).await?;
    Ok(([(header::CONTENT_TYPE, "video/iso.segment")], bytes))
}

async fn hls_playlist(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> ApiResult<impl IntoResponse> {
    let session = state.streaming.session(session_id)?;
    let duration_ms = session.part.duration_ms.unwrap_or(0);
    let seg_secs = session.plan.segment_duration_secs;
    let segment_count = if seg_secs == 0 { 0 } else { (duration_ms / 1000 / seg_secs as i64).max(1) };

    let mut playlist = format!(
        "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:{seg_secs}\n#EXT-X-PLAYLIST-TYPE:VOD\n"
    );
    for i in 0..segment_count {
        playlist.push_str(&format!("#EXTINF:{seg_secs}.0,\nseg-{i}.ts\n"));
    }
    playlist.push_str("#EXT-X-ENDLIST\n");
    Ok(([(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")], playlist))
}

async fn hls_segment(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(Uuid, u32)>,
) -> ApiResult<impl IntoResponse> {
    let bytes = produce_segment(&state, session_id, index, SegmentFormat::MpegTs).await?;
    Ok(([(header::CONTENT_TYPE, "video/mp2t")], bytes))
}

#[derive(Clone, Copy)]
enum SegmentFormat {
    Fmp4,
    MpegTs,
}

async fn produce_segment(state: &AppState, session_id: Uuid, index: u32, format: SegmentFormat) -> ApiResult<Vec<u8>> {
    if let Some(cached) = state.streaming.cached_segment(session_id, index) {
        return Ok((*cached).clone());
    }

    let session = state.streaming.session(session_id)?;
    let seg_secs = session.plan.segment_duration_secs;
    let start_secs = seg_secs as f64 * index as f64;

    let scratch = state.config.cache.transcode.join(format!("{session_id}-{index}.tmp"));
    if let Some(parent) = scratch.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError(CoreError::internal(format!("failed to create transcode scratch directory: {e}"))))?;
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y");

    if session.plan.delivery_mode == DeliveryMode::Transcode {
        let settings = transcode_settings(state).await;
        if let Some(hwaccel) = hwaccel_flag(settings.hardware_acceleration) {
            cmd.args(["-hwaccel", hwaccel]);
        }
        cmd.args(["-ss", &start_secs.to_string()])
            .arg("-i")
            .arg(&session.part.path)
            .args(["-t", &seg_secs.to_string()])
            .args(["-c:v", video_encoder(settings.hardware_acceleration), "-c:a", "aac"]);
    } else {
        // DirectPlay/Remux: stream-copy, no re-encode.
        cmd.args(["-ss", &start_secs.to_string()])
            .arg("-i")
            .arg(&session.part.path)
            .args(["-t", &seg_secs.to_string()])
            .args(["-c:v", "copy", "-c:a", "copy"]);
    }

    match format {
        SegmentFormat::Fmp4 => {
            cmd.args(["-f", "mp4", "-movflags", "frag_keyframe+empty_moov"]);
        }
        SegmentFormat::MpegTs => {
            cmd.args(["-f", "mpegts"]);
        }
    }
    cmd.arg(&scratch).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    let status = cmd
        .status()
        .await
        .map_err(|e| ApiError(CoreError::internal(format!("failed to spawn ffmpeg: {e}"))))?;
    if !status.success() {
        let _ = tokio::fs::remove_file(&scratch).await;
        return Err(ApiError(CoreError::internal(format!("ffmpeg exited with {status}"))));
    }

    let bytes = tokio::fs::read(&scratch)
        .await
        .map_err(|e| ApiError(CoreError::internal(format!("failed to read produced segment: {e}"))))?;
    let _ = tokio::fs::remove_file(&scratch).await;

    state.streaming.cache_segment(session_id, index, bytes.clone());
    Ok(bytes)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stream/sessions", post(start_session))
        .route("/media/{id}", get(direct_play))
        .route("/playback/dash/{session}/manifest.mpd", get(dash_manifest))
        .route("/playback/dash/{session}/seg-{index}.m4s", get(dash_segment))
        .route("/playback/hls/{session}/master.m3u8", get(hls_playlist))
        .route("/playback/hls/{session}/seg-{index}.ts", get(hls_segment))
}

//! Resolves a client capability profile against a `MediaPart` into a
//! `StreamPlan` (spec.md §4.G steps 1-3).

use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::streaming::{CapabilityProfile, DeliveryMode, StreamPlan};
use nexa_model::prelude::*;

/// Protocol version this server speaks. A mismatch against the client's
/// declared `CapabilityProfile.version` always forces a transcode re-plan
/// and sets `capability_version_mismatch`.
pub const CAPABILITY_PROTOCOL_VERSION: u32 = 1;

/// Picks the `MediaPart` matching the client's declared profile; for now
/// the first part is authoritative since multi-part quality/language
/// variants are not yet modeled as distinct catalog rows.
pub fn select_part<'a>(parts: &'a [MediaPart], _profile: &CapabilityProfile) -> CoreResult<&'a MediaPart> {
    parts.first().ok_or_else(|| CoreError::not_found("item has no media parts to stream"))
}

pub fn resolve_plan(item_id: MetadataItemId, part: &MediaPart, profile: &CapabilityProfile) -> StreamPlan {
    let version_mismatch = profile.version != CAPABILITY_PROTOCOL_VERSION;

    let container_ok = part
        .container
        .as_deref()
        .is_some_and(|c| profile.supported_containers.iter().any(|s| s.eq_ignore_ascii_case(c)));
    let video_ok = part
        .video_codec
        .as_deref()
        .is_some_and(|c| profile.supported_video_codecs.iter().any(|s| s.eq_ignore_ascii_case(c)));
    let audio_ok = part
        .audio_codec
        .as_deref()
        .is_some_and(|c| profile.supported_audio_codecs.iter().any(|s| s.eq_ignore_ascii_case(c)));

    let delivery_mode = if !version_mismatch && container_ok && video_ok && audio_ok {
        DeliveryMode::DirectPlay
    } else if !version_mismatch && video_ok && audio_ok {
        DeliveryMode::Remux
    } else {
        DeliveryMode::Transcode
    };

    let (container, video_codec, audio_codec) = match delivery_mode {
        DeliveryMode::DirectPlay => (
            part.container.clone().unwrap_or_else(|| "mp4".to_string()),
            part.video_codec.clone().unwrap_or_else(|| "h264".to_string()),
            part.audio_codec.clone().unwrap_or_else(|| "aac".to_string()),
        ),
        DeliveryMode::Remux => (
            "mp4".to_string(),
            part.video_codec.clone().unwrap_or_else(|| "h264".to_string()),
            part.audio_codec.clone().unwrap_or_else(|| "aac".to_string()),
        ),
        DeliveryMode::Transcode => ("mp4".to_string(), "h264".to_string(), "aac".to_string()),
    };

    StreamPlan {
        item_id,
        delivery_mode,
        container,
        video_codec,
        audio_codec,
        segment_duration_secs: 6,
        requires_reload_on_seek: matches!(delivery_mode, DeliveryMode::DirectPlay),
        capability_version_mismatch: version_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn part(container: &str, video: &str, audio: &str) -> MediaPart {
        MediaPart {
            id: MediaPartId::new(),
            item_id: MetadataItemId::new(),
            path: "/movies/a.mkv".into(),
            size_bytes: 1_000,
            mtime: Utc::now(),
            container: Some(container.to_string()),
            video_codec: Some(video.to_string()),
            audio_codec: Some(audio.to_string()),
            width: Some(1920),
            height: Some(1080),
            duration_ms: Some(5_400_000),
            language: None,
            created_at: Utc::now(),
        }
    }

    fn profile() -> CapabilityProfile {
        CapabilityProfile {
            version: CAPABILITY_PROTOCOL_VERSION,
            supported_containers: vec!["mkv".into(), "mp4".into()],
            supported_video_codecs: vec!["h264".into()],
            supported_audio_codecs: vec!["aac".into()],
            max_bitrate_kbps: 20_000,
            supports_hdr: false,
        }
    }

    #[test]
    fn fully_compatible_part_direct_plays() {
        let plan = resolve_plan(MetadataItemId::new(), &part("mkv", "h264", "aac"), &profile());
        assert_eq!(plan.delivery_mode, DeliveryMode::DirectPlay);
        assert!(!plan.capability_version_mismatch);
    }

    #[test]
    fn unsupported_container_remuxes() {
        let plan = resolve_plan(MetadataItemId::new(), &part("avi", "h264", "aac"), &profile());
        assert_eq!(plan.delivery_mode, DeliveryMode::Remux);
    }

    #[test]
    fn unsupported_codec_transcodes() {
        let plan = resolve_plan(MetadataItemId::new(), &part("mkv", "hevc", "aac"), &profile());
        assert_eq!(plan.delivery_mode, DeliveryMode::Transcode);
    }

    #[test]
    fn version_mismatch_forces_transcode_and_sets_flag() {
        let mut p = profile();
        p.version = CAPABILITY_PROTOCOL_VERSION + 1;
        let plan = resolve_plan(MetadataItemId::new(), &part("mkv", "h264", "aac"), &p);
        assert_eq!(plan.delivery_mode, DeliveryMode::Transcode);
        assert!(plan.capability_version_mismatch);
    }
}

use nexa_model::ids::MetadataItemId;
use serde::{Deserialize, Serialize};

/// A client's declared codec/container/bitrate abilities, submitted with a
/// play request and matched against the resolved `MediaPart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub version: u32,
    pub supported_containers: Vec<String>,
    pub supported_video_codecs: Vec<String>,
    pub supported_audio_codecs: Vec<String>,
    pub max_bitrate_kbps: u32,
    pub supports_hdr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    DirectPlay,
    Remux,
    Transcode,
}

/// The server's chosen container + codecs + delivery mode for a playback
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamPlan {
    pub item_id: MetadataItemId,
    pub delivery_mode: DeliveryMode,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub segment_duration_secs: u32,
    pub requires_reload_on_seek: bool,
    pub capability_version_mismatch: bool,
}

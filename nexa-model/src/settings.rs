use serde::{Deserialize, Serialize};

/// A raw `(key, value)` row. Typed option structs below are late-bound
/// views over a set of these rows, following the spec's `ServerSetting`
/// design: the table stays simple, validation happens at the typed layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettingRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscodeSettings {
    pub allowed_video_codecs: Vec<String>,
    pub allowed_audio_codecs: Vec<String>,
    pub segment_duration_secs: u32,
    pub hardware_acceleration: HardwareAcceleration,
    pub tone_mapping_enabled: bool,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            allowed_video_codecs: vec!["h264".into(), "hevc".into()],
            allowed_audio_codecs: vec!["aac".into(), "ac3".into()],
            segment_duration_secs: 6,
            hardware_acceleration: HardwareAcceleration::None,
            tone_mapping_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareAcceleration {
    None,
    Vaapi,
    Nvenc,
    Qsv,
    VideoToolbox,
}

impl HardwareAcceleration {
    pub fn is_effective(self) -> bool {
        !matches!(self, HardwareAcceleration::None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrickplaySettings {
    pub snapshot_interval_ms: u32,
    pub max_snapshot_width: u32,
    pub jpeg_quality: u8,
    pub skip_existing: bool,
}

impl Default for TrickplaySettings {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 2000,
            max_snapshot_width: 320,
            jpeg_quality: 85,
            skip_existing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TagModerationSettings {
    pub allowed: Vec<String>,
    pub blocked: Vec<String>,
}

impl TagModerationSettings {
    /// Applies the moderation policy described in spec.md §4.B step 6:
    /// if `allowed` is non-empty, only those tags pass; else `blocked`
    /// removes matches; else all pass.
    pub fn filter(&self, tags: &[String]) -> Vec<String> {
        if !self.allowed.is_empty() {
            tags.iter()
                .filter(|t| self.allowed.iter().any(|a| a.eq_ignore_ascii_case(t)))
                .cloned()
                .collect()
        } else if !self.blocked.is_empty() {
            tags.iter()
                .filter(|t| !self.blocked.iter().any(|b| b.eq_ignore_ascii_case(t)))
                .cloned()
                .collect()
        } else {
            tags.to_vec()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenreMappingSettings {
    pub mapping: std::collections::BTreeMap<String, String>,
}

impl GenreMappingSettings {
    pub fn canonicalize(&self, genres: &[String]) -> Vec<String> {
        genres
            .iter()
            .map(|g| self.mapping.get(g).cloned().unwrap_or_else(|| g.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    pub lifetime_days: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { lifetime_days: 30 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JobNotificationSettings {
    pub flush_interval_ms: u64,
    pub history_retention_days: i64,
}

impl Default for JobNotificationSettings {
    fn default() -> Self {
        Self {
            flush_interval_ms: 500,
            history_retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RemoteMetadataHttpSettings {
    pub timeout_secs: u64,
    pub max_requests_per_window: Option<u32>,
    pub window_secs: u64,
    pub accept_insecure_tls: bool,
}

impl Default for RemoteMetadataHttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_requests_per_window: Some(10),
            window_secs: 1,
            accept_insecure_tls: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StreamingSettings {
    pub idle_timeout_secs: u64,
    pub max_concurrent_transcodes: usize,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 60,
            max_concurrent_transcodes: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_moderation_allowed_list_wins_over_blocked() {
        let s = TagModerationSettings {
            allowed: vec!["cool".into()],
            blocked: vec!["cool".into(), "spoiler".into()],
        };
        assert_eq!(s.filter(&["cool".into(), "spoiler".into()]), vec!["cool".to_string()]);
    }

    #[test]
    fn tag_moderation_blocked_only() {
        let s = TagModerationSettings {
            allowed: vec![],
            blocked: vec!["spoiler".into()],
        };
        assert_eq!(
            s.filter(&["cool".into(), "spoiler".into()]),
            vec!["cool".to_string()]
        );
    }

    #[test]
    fn genre_mapping_canonicalizes_known_and_passes_through_unknown() {
        let mut mapping = std::collections::BTreeMap::new();
        mapping.insert("Sci-Fi".to_string(), "Science Fiction".to_string());
        let s = GenreMappingSettings { mapping };
        assert_eq!(
            s.canonicalize(&["Sci-Fi".into(), "Drama".into()]),
            vec!["Science Fiction".to_string(), "Drama".to_string()]
        );
    }
}

use async_trait::async_trait;
use nexa_contracts::agent::{AgentCategory, HintValue, Hints, MetadataAgent, ScanUnit};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::metadata_type::LibraryType;

const SUPPORTED: &[LibraryType] =
    &[LibraryType::Movies, LibraryType::TvShows, LibraryType::HomeVideos, LibraryType::Music, LibraryType::MusicVideos];

/// Reads container/tag metadata embedded in the media file itself (ID3,
/// Vorbis comments, MP4 atoms, ...) via `ffmpeg-next`'s format probing.
/// Builds behind the `ffmpeg-probe` feature; without it this agent always
/// reports nothing found, so the pipeline falls through to filename-based
/// inference.
#[derive(Debug, Default)]
pub struct EmbeddedAgent;

#[async_trait]
impl MetadataAgent for EmbeddedAgent {
    fn agent_name(&self) -> &'static str {
        "embedded_tags"
    }

    fn category(&self) -> AgentCategory {
        AgentCategory::Embedded
    }

    fn default_order(&self) -> i32 {
        0
    }

    fn supported_library_types(&self) -> &'static [LibraryType] {
        SUPPORTED
    }

    async fn extract(&self, unit: &ScanUnit) -> CoreResult<Hints> {
        let Some(path) = unit.paths.first().cloned() else {
            return Err(CoreError::not_found("unit has no paths to probe"));
        };
        tokio::task::spawn_blocking(move || probe(&path))
            .await
            .map_err(|e| CoreError::internal(format!("embedded tag probe task panicked: {e}")))?
    }
}

#[cfg(feature = "ffmpeg-probe")]
fn probe(path: &std::path::Path) -> CoreResult<Hints> {
    let ctx = ffmpeg_next::format::input(path)
        .map_err(|e| CoreError::not_found(format!("could not open container: {e}")))?;

    let mut hints = Hints::default();
    for (key, value) in ctx.metadata().iter() {
        let value = value.to_string();
        match key.to_ascii_lowercase().as_str() {
            "title" => hints.push("title", HintValue::Text(value)),
            "album" | "album_artist" => hints.push("original_title", HintValue::Text(value)),
            "genre" => hints.push("genres", HintValue::StringList(vec![value])),
            "date" | "year" => {
                if let Ok(year) = value.chars().take(4).collect::<String>().parse::<f64>() {
                    hints.push("year", HintValue::Number(year));
                }
            }
            _ => {}
        }
    }

    if let Some(stream) = ctx.streams().best(ffmpeg_next::media::Type::Video) {
        let duration_ms = (stream.duration() as f64 * f64::from(stream.time_base()) * 1000.0) as i64;
        if duration_ms > 0 {
            hints.push("length_ms", HintValue::Number(duration_ms as f64));
        }
    }

    if hints.values.is_empty() {
        return Err(CoreError::not_found("container carried no usable tags"));
    }
    Ok(hints)
}

#[cfg(not(feature = "ffmpeg-probe"))]
fn probe(_path: &std::path::Path) -> CoreResult<Hints> {
    Err(CoreError::not_found("ffmpeg-probe feature disabled"))
}

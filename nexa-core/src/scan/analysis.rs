//! Technical media probing (spec.md §4.B step 8, job type
//! `FileAnalysis`). Populates the codec/resolution/duration fields on a
//! `MediaPart` that the Persist stage leaves blank, by decoding container
//! headers with `ffmpeg-next`.

use async_trait::async_trait;
use nexa_contracts::catalog::MediaPartRepository;
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::jobs::{JobWorker, ProgressSink};
use nexa_model::prelude::*;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TechnicalProbe {
    pub container: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_ms: Option<i64>,
}

#[cfg(feature = "ffmpeg-probe")]
fn probe_blocking(path: &std::path::Path) -> CoreResult<TechnicalProbe> {
    use ffmpeg_next as ffmpeg;

    ffmpeg::init().map_err(|e| CoreError::internal(format!("ffmpeg init failed: {e}")))?;
    let input = ffmpeg::format::input(path).map_err(|e| {
        CoreError::new(nexa_model::error::ErrorKind::Unavailable, format!("failed to open media file: {e}"))
    })?;

    let mut probe = TechnicalProbe { container: Some(input.format().name().to_string()), ..Default::default() };

    if input.duration() != ffmpeg::ffi::AV_NOPTS_VALUE {
        probe.duration_ms = Some((input.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64 * 1000.0) as i64);
    }

    let mut best_width = 0;
    for stream in input.streams() {
        let codec = match ffmpeg::codec::context::Context::from_parameters(stream.parameters()) {
            Ok(c) => c,
            Err(_) => continue,
        };
        match codec.medium() {
            ffmpeg::media::Type::Video => {
                if let Ok(video) = codec.decoder().video() {
                    let is_attached_pic = stream.disposition().contains(ffmpeg::format::stream::Disposition::ATTACHED_PIC);
                    if !is_attached_pic && video.width() > best_width {
                        best_width = video.width();
                        probe.width = Some(video.width() as i32);
                        probe.height = Some(video.height() as i32);
                        probe.video_codec = video.codec().map(|c| c.name().to_string());
                    }
                }
            }
            ffmpeg::media::Type::Audio => {
                if probe.audio_codec.is_none()
                    && let Ok(audio) = codec.decoder().audio()
                {
                    probe.audio_codec = audio.codec().map(|c| c.name().to_string());
                }
            }
            _ => {}
        }
    }

    Ok(probe)
}

#[cfg(not(feature = "ffmpeg-probe"))]
fn probe_blocking(_path: &std::path::Path) -> CoreResult<TechnicalProbe> {
    Err(CoreError::new(nexa_model::error::ErrorKind::FailedPrecondition, "ffmpeg probing disabled in this build"))
}

async fn probe(path: std::path::PathBuf) -> CoreResult<TechnicalProbe> {
    tokio::task::spawn_blocking(move || probe_blocking(&path))
        .await
        .map_err(|e| CoreError::internal(format!("probe task panicked: {e}")))?
}

/// Re-probes every media part attached to an item, replacing its
/// technical fields with what the container actually reports. A part the
/// probe fails to open (corrupt file, transient mount issue) keeps its
/// previous values and the failure is logged; the job itself does not
/// fail unless every part failed.
pub struct FileAnalysisWorker {
    media_parts: Arc<dyn MediaPartRepository>,
}

impl FileAnalysisWorker {
    pub fn new(media_parts: Arc<dyn MediaPartRepository>) -> Self {
        Self { media_parts }
    }
}

#[async_trait]
impl JobWorker for FileAnalysisWorker {
    fn job_type(&self) -> JobType {
        JobType::FileAnalysis
    }

    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()> {
        let item_id = match scope {
            JobScope::Item(id) => id,
            JobScope::LibrarySection(_) => {
                sink.fail("file analysis requires an item scope".into());
                return Ok(());
            }
        };

        let parts = self.media_parts.for_item(item_id).await?;
        let total = parts.len() as i64;
        sink.report(0, Some(total));

        let mut failures = 0;
        for (i, mut part) in parts.into_iter().enumerate() {
            match probe(part.path.clone()).await {
                Ok(result) => {
                    part.container = result.container.or(part.container);
                    part.video_codec = result.video_codec;
                    part.audio_codec = result.audio_codec;
                    part.width = result.width;
                    part.height = result.height;
                    part.duration_ms = result.duration_ms;
                    if let Err(e) = self.media_parts.upsert(part).await {
                        tracing::warn!(item_id = %item_id, error = %e, "failed to persist probed media part");
                        failures += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(item_id = %item_id, path = %part.path.display(), error = %e, "technical probe failed");
                    failures += 1;
                }
            }
            sink.report(i as i64 + 1, Some(total));
        }

        if total > 0 && failures == total {
            sink.fail("technical probing failed for every media part".into());
        }
        Ok(())
    }
}

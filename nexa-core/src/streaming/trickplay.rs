//! Background generation of BIF trickplay sprites for a `MetadataItem`'s
//! media parts (spec.md §4.G, job type `TrickplayGeneration`).

use crate::streaming::bif::{Bif, BifEntry};
use async_trait::async_trait;
use nexa_contracts::catalog::{MediaPartRepository, MetadataItemRepository};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::jobs::{JobWorker, ProgressSink};
use nexa_model::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

pub struct TrickplayWorker {
    media_parts: Arc<dyn MediaPartRepository>,
    items: Arc<dyn MetadataItemRepository>,
    cache_root: PathBuf,
    settings: TrickplaySettings,
}

impl TrickplayWorker {
    pub fn new(
        media_parts: Arc<dyn MediaPartRepository>,
        items: Arc<dyn MetadataItemRepository>,
        cache_root: PathBuf,
        settings: TrickplaySettings,
    ) -> Self {
        Self { media_parts, items, cache_root, settings }
    }

    fn bif_path(&self, part_id: MediaPartId) -> PathBuf {
        self.cache_root.join("trickplay").join(format!("{part_id}.bif"))
    }

    async fn generate_for_part(&self, part: &MediaPart) -> CoreResult<()> {
        let out_path = self.bif_path(part.id);
        if self.settings.skip_existing && tokio::fs::metadata(&out_path).await.is_ok() {
            return Ok(());
        }

        let duration_ms = part
            .duration_ms
            .ok_or_else(|| CoreError::failed_precondition("media part has no known duration, cannot plan trickplay snapshots"))?;

        let interval_ms = i64::from(self.settings.snapshot_interval_ms.max(1));
        let mut timestamps = Vec::new();
        let mut t = 0i64;
        while t < duration_ms {
            timestamps.push(t);
            t += interval_ms;
        }

        let scratch_dir = self.cache_root.join("trickplay-scratch").join(part.id.to_string());
        tokio::fs::create_dir_all(&scratch_dir)
            .await
            .map_err(|e| CoreError::internal(format!("failed to create trickplay scratch directory: {e}")))?;

        let mut entries = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let frame_path = scratch_dir.join(format!("frame-{i:06}.jpg"));
            if let Err(e) = capture_frame(&part.path, *ts, self.settings.max_snapshot_width, self.settings.jpeg_quality, &frame_path).await {
                tracing::warn!(path = %part.path.display(), timestamp_ms = ts, error = %e, "trickplay frame capture failed, skipping frame");
                continue;
            }
            match tokio::fs::read(&frame_path).await {
                Ok(jpeg) => entries.push(BifEntry { timestamp_ms: *ts as u32, jpeg }),
                Err(e) => tracing::warn!(path = %frame_path.display(), error = %e, "failed to read captured trickplay frame"),
            }
        }
        let _ = tokio::fs::remove_dir_all(&scratch_dir).await;

        let bif = Bif { version: 0, entries };
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::internal(format!("failed to create trickplay cache directory: {e}")))?;
        }
        tokio::fs::write(&out_path, bif.encode())
            .await
            .map_err(|e| CoreError::internal(format!("failed to write BIF file: {e}")))
    }
}

/// Shells out to `ffmpeg` for one snapshot, matching the teacher's pattern
/// of driving the external transcoder binary via `tokio::process` rather
/// than re-encoding in-process (spec.md Non-goals: "the bundled transcoder
/// binary" is external).
async fn capture_frame(source: &Path, timestamp_ms: i64, max_width: u32, quality: u8, out_path: &Path) -> CoreResult<()> {
    let timestamp_secs = timestamp_ms as f64 / 1000.0;
    // ffmpeg's mjpeg qscale runs 2 (best) .. 31 (worst); invert our 0-100 scale onto it.
    let qscale = 2 + (100u32.saturating_sub(u32::from(quality.min(100))) * 29 / 100);

    let status = Command::new("ffmpeg")
        .arg("-y")
        .args(["-ss", &timestamp_secs.to_string()])
        .arg("-i")
        .arg(source)
        .args(["-frames:v", "1", "-vf", &format!("scale={max_width}:-1"), "-q:v", &qscale.to_string()])
        .arg(out_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| CoreError::internal(format!("failed to spawn ffmpeg: {e}")))?;

    if !status.success() {
        return Err(CoreError::internal(format!("ffmpeg exited with {status}")));
    }
    Ok(())
}

#[async_trait]
impl JobWorker for TrickplayWorker {
    fn job_type(&self) -> JobType {
        JobType::TrickplayGeneration
    }

    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()> {
        let item_id = match scope {
            JobScope::Item(id) => id,
            JobScope::LibrarySection(_) => {
                sink.fail("trickplay generation requires an item scope".into());
                return Ok(());
            }
        };

        // Ensures the item still exists before doing any work; a failure
        // here is a root-cause failure for this job, not a per-part one.
        self.items.get(item_id).await?;

        let parts = self.media_parts.for_item(item_id).await?;
        let total = parts.len() as i64;
        sink.report(0, Some(total));
        for (i, part) in parts.iter().enumerate() {
            if let Err(e) = self.generate_for_part(part).await {
                tracing::warn!(item_id = %item_id, part_id = %part.id, error = %e, "trickplay generation failed for media part");
            }
            sink.report(i as i64 + 1, Some(total));
        }
        Ok(())
    }
}

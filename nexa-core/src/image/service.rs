//! Source resolution, decode/resize/encode pipeline, and background
//! pre-warming (spec.md §4.H, job type `ImageGeneration`).

use crate::image::cache::ImageCache;
use crate::image::format::ImageFormat;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;
use nexa_contracts::catalog::MetadataItemRepository;
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::jobs::{JobWorker, ProgressSink};
use nexa_model::error::ErrorKind;
use nexa_model::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Thumbnail/art sizes pre-generated for a newly persisted item, so the
/// first client request for a card or detail view hits a warm cache.
const PREWARM_SIZES: [(u32, u32); 2] = [(300, 450), (1280, 720)];

pub struct ImageService {
    cache: ImageCache,
    http: reqwest::Client,
}

impl ImageService {
    pub fn new(cache_root: PathBuf) -> Arc<Self> {
        Arc::new(Self { cache: ImageCache::new(cache_root), http: reqwest::Client::new() })
    }

    async fn load_source(&self, uri: &str) -> CoreResult<Vec<u8>> {
        if let Some(path) = uri.strip_prefix("file://") {
            return tokio::fs::read(path).await.map_err(|e| CoreError::not_found(format!("image source not found: {e}")));
        }
        if uri.starts_with('/') || uri.starts_with("./") {
            return tokio::fs::read(uri).await.map_err(|e| CoreError::not_found(format!("image source not found: {e}")));
        }

        let response = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| CoreError::new(ErrorKind::Unavailable, format!("image source fetch failed: {e}")))?;
        if !response.status().is_success() {
            return Err(CoreError::new(ErrorKind::Unavailable, format!("image source returned {}", response.status())));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| CoreError::internal(format!("failed to read image source body: {e}")))
    }

    fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> CoreResult<Vec<u8>> {
        match format {
            ImageFormat::Jpeg => {
                let mut buf = Vec::new();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
                image.write_with_encoder(encoder).map_err(|e| CoreError::internal(format!("jpeg encode failed: {e}")))?;
                Ok(buf)
            }
            ImageFormat::WebP => {
                let rgba = image.to_rgba8();
                let encoder = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height());
                Ok(encoder.encode(quality as f32).to_vec())
            }
            ImageFormat::Avif => {
                let mut buf = Vec::new();
                let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut buf, 6, quality.clamp(1, 100));
                image.write_with_encoder(encoder).map_err(|e| CoreError::internal(format!("avif encode failed: {e}")))?;
                Ok(buf)
            }
        }
    }

    /// Resolves a source URI to a cached transcode, producing it on a
    /// cache miss: decode, resize preserving aspect ratio to fit within
    /// `(width, height)`, encode, cache, return.
    pub async fn transcode(&self, source_uri: &str, width: u32, height: u32, quality: u8, format: ImageFormat) -> CoreResult<Vec<u8>> {
        let key = ImageCache::key(source_uri, width, height, quality, format);
        let source = source_uri.to_string();
        self.cache
            .single_flight(&key, move || async move {
                let raw = self.load_source(&source).await.map_err(|e| std::io::Error::other(e.to_string()))?;
                let decoded = image::load_from_memory(&raw).map_err(|e| std::io::Error::other(e.to_string()))?;
                let resized = decoded.resize(width, height, FilterType::Lanczos3);
                Self::encode(&resized, format, quality).map_err(|e| std::io::Error::other(e.to_string()))
            })
            .await
            .map_err(|e| CoreError::internal(format!("image transcode failed: {e}")))
    }
}

pub struct ImageGenerationWorker {
    items: Arc<dyn MetadataItemRepository>,
    service: Arc<ImageService>,
}

impl ImageGenerationWorker {
    pub fn new(items: Arc<dyn MetadataItemRepository>, service: Arc<ImageService>) -> Self {
        Self { items, service }
    }
}

#[async_trait]
impl JobWorker for ImageGenerationWorker {
    fn job_type(&self) -> JobType {
        JobType::ImageGeneration
    }

    async fn run(&self, scope: JobScope, sink: &dyn ProgressSink) -> CoreResult<()> {
        let item_id = match scope {
            JobScope::Item(id) => id,
            JobScope::LibrarySection(_) => {
                sink.fail("image generation requires an item scope".into());
                return Ok(());
            }
        };

        let item = self.items.get(item_id).await?;
        let sources: Vec<(String, u32, u32)> = [
            item.thumb_uri.map(|u| (u, PREWARM_SIZES[0])),
            item.art_uri.map(|u| (u, PREWARM_SIZES[1])),
        ]
        .into_iter()
        .flatten()
        .map(|(uri, (w, h))| (uri, w, h))
        .collect();

        let total = sources.len() as i64;
        sink.report(0, Some(total));
        for (i, (uri, w, h)) in sources.iter().enumerate() {
            if let Err(e) = self.service.transcode(uri, *w, *h, 85, ImageFormat::Jpeg).await {
                tracing::warn!(item_id = %item_id, uri = %uri, error = %e, "failed to pre-warm image cache");
            }
            sink.report(i as i64 + 1, Some(total));
        }
        Ok(())
    }
}

//! On-disk derivative-image cache, keyed by `(source hash, width, height,
//! quality, format)`, with per-key single-flight (spec.md §4.H, §5).

use crate::image::format::ImageFormat;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ImageCache {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ImageCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root, locks: DashMap::new() }
    }

    pub fn key(source: &str, width: u32, height: u32, quality: u8, format: ImageFormat) -> String {
        let digest = Sha256::digest(source.as_bytes());
        let source_hash: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        format!("{source_hash}-{width}x{height}-q{quality}.{}", format.extension())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub async fn read(&self, key: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.path_for(key)).await.ok()
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path_for(key).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(self.path_for(key), bytes).await
    }

    /// Runs `produce` under a per-key lock: concurrent callers for the
    /// same key block on, rather than duplicate, the one in-flight
    /// encode. The lock table is never pruned — the key space is bounded
    /// by distinct `(source, size, format)` combinations actually
    /// requested, which is small in practice.
    pub async fn single_flight<F, Fut>(&self, key: &str, produce: F) -> std::io::Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = std::io::Result<Vec<u8>>>,
    {
        let lock = self.locks.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let _guard = lock.lock().await;
        if let Some(cached) = self.read(key).await {
            return Ok(cached);
        }
        let bytes = produce().await?;
        self.write(key, &bytes).await?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_varies_with_every_dimension() {
        let a = ImageCache::key("http://x/a.jpg", 100, 100, 80, ImageFormat::Jpeg);
        let b = ImageCache::key("http://x/a.jpg", 200, 100, 80, ImageFormat::Jpeg);
        let c = ImageCache::key("http://x/a.jpg", 100, 100, 80, ImageFormat::WebP);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn single_flight_reuses_cached_bytes_on_second_call() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        let key = "k";

        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let calls2 = calls.clone();
        let bytes = cache
            .single_flight(key, || async move {
                calls2.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![1, 2, 3])
            })
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let calls3 = calls.clone();
        let bytes_again = cache
            .single_flight(key, || async move {
                calls3.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![9, 9, 9])
            })
            .await
            .unwrap();
        assert_eq!(bytes_again, vec![1, 2, 3]);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

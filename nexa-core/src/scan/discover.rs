use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One filesystem entity surfaced by [`discover`], before classification.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: i64,
    pub mtime: DateTime<Utc>,
    pub extension: String,
}

/// Walks every root breadth-first, yielding [`CandidateFile`]s. Symlinked
/// directories are followed once; a visited-inode set breaks cycles,
/// per spec.md §4.B step 1.
pub async fn discover(roots: Vec<PathBuf>) -> Vec<CandidateFile> {
    let mut out = Vec::new();
    let mut visited_inodes: HashSet<u64> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = roots.into_iter().collect();

    while let Some(dir) = queue.pop_front() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "failed to read directory during scan");
                continue;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to stat entry during scan");
                    continue;
                }
            };

            if metadata.is_dir() {
                if let Some(inode) = inode_of(&metadata) {
                    if !visited_inodes.insert(inode) {
                        continue;
                    }
                }
                queue.push_back(path);
                continue;
            }

            if !metadata.is_file() {
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_lowercase();
            let mtime = metadata
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH)
                .into();

            out.push(CandidateFile {
                path,
                size: metadata.len() as i64,
                mtime,
                extension,
            });
        }
    }

    out
}

#[cfg(unix)]
fn inode_of(metadata: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode_of(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}

/// Frozen extension sets per media family, used by the Classify stage.
pub mod families {
    pub const VIDEO: &[&str] = &["mkv", "mp4", "avi", "mov", "webm", "m4v", "ts"];
    pub const AUDIO: &[&str] = &["flac", "mp3", "m4a", "ogg", "opus", "wav"];
    pub const IMAGE: &[&str] = &["jpg", "jpeg", "png", "webp", "avif", "heic"];
    pub const BOOK: &[&str] = &["epub", "mobi", "azw3", "pdf"];
    pub const COMIC: &[&str] = &["cbz", "cbr"];
    pub const GAME: &[&str] = &["iso", "rom", "chd"];
}

pub fn extension_path(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase()
}

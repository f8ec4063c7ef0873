use crate::scan::discover::{families, CandidateFile};
use nexa_model::metadata_type::{LibraryType, MetadataType};

/// Chooses an intended `MetadataType` from path layout + extension, e.g.
/// "Show Name/Season 02/S02E03.mkv" → Episode, per spec.md §4.B step 3.
pub fn classify(library_type: LibraryType, candidate: &CandidateFile) -> Option<MetadataType> {
    let ext = candidate.extension.as_str();
    let path = candidate.path.to_string_lossy().to_lowercase();

    match library_type {
        LibraryType::Movies | LibraryType::HomeVideos => {
            families::VIDEO.contains(&ext).then_some(MetadataType::Movie)
        }
        LibraryType::TvShows => {
            if !families::VIDEO.contains(&ext) {
                return None;
            }
            Some(if looks_like_episode(&path) {
                MetadataType::Episode
            } else {
                MetadataType::Movie
            })
        }
        LibraryType::Music => families::AUDIO.contains(&ext).then_some(MetadataType::Track),
        LibraryType::MusicVideos => families::VIDEO.contains(&ext).then_some(MetadataType::Track),
        LibraryType::Audiobooks | LibraryType::Podcasts => {
            families::AUDIO.contains(&ext).then_some(MetadataType::AudioWork)
        }
        LibraryType::Photos => families::IMAGE.contains(&ext).then_some(MetadataType::Photo),
        LibraryType::Pictures => families::IMAGE.contains(&ext).then_some(MetadataType::Picture),
        LibraryType::Books | LibraryType::Magazines => {
            families::BOOK.contains(&ext).then_some(MetadataType::Edition)
        }
        LibraryType::Comics | LibraryType::Manga => {
            families::COMIC.contains(&ext).then_some(MetadataType::Edition)
        }
        LibraryType::Games => families::GAME.contains(&ext).then_some(MetadataType::GameRelease),
    }
}

/// Recognizes `sNNeNN` / `NxNN` season-episode markers anywhere in the path.
fn looks_like_episode(lowercase_path: &str) -> bool {
    let bytes = lowercase_path.as_bytes();
    for i in 0..bytes.len().saturating_sub(5) {
        if bytes[i] == b's' && bytes[i + 1].is_ascii_digit() {
            if let Some(e_pos) = lowercase_path[i..].find('e') {
                let after = i + e_pos + 1;
                if after < bytes.len() && bytes[after].is_ascii_digit() {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str) -> CandidateFile {
        CandidateFile {
            path: path.into(),
            size: 100,
            mtime: chrono::Utc::now(),
            extension: "mkv".into(),
        }
    }

    #[test]
    fn tv_library_detects_episode_marker() {
        let c = candidate("/media/Show Name/Season 02/S02E03.mkv");
        assert_eq!(classify(LibraryType::TvShows, &c), Some(MetadataType::Episode));
    }

    #[test]
    fn tv_library_without_marker_falls_back_to_movie() {
        let c = candidate("/media/Show Name/special.mkv");
        assert_eq!(classify(LibraryType::TvShows, &c), Some(MetadataType::Movie));
    }

    #[test]
    fn unsupported_extension_yields_none() {
        let mut c = candidate("/media/readme.txt");
        c.extension = "txt".into();
        assert_eq!(classify(LibraryType::Movies, &c), None);
    }
}

use async_trait::async_trait;
use nexa_contracts::agent::{AgentCategory, HintValue, Hints, MetadataAgent, ScanUnit};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::metadata_type::LibraryType;
use regex::Regex;
use std::sync::LazyLock;

const SUPPORTED: &[LibraryType] = &[
    LibraryType::Movies,
    LibraryType::TvShows,
    LibraryType::HomeVideos,
    LibraryType::Music,
    LibraryType::MusicVideos,
    LibraryType::Audiobooks,
    LibraryType::Podcasts,
    LibraryType::Books,
    LibraryType::Comics,
    LibraryType::Manga,
    LibraryType::Magazines,
    LibraryType::Games,
];

static YEAR_IN_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").unwrap());
static RELEASE_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\.\-_ ](1080p|720p|2160p|4k|bluray|brrip|webrip|web-dl|hdtv|x264|x265|h264|h265|hevc|remux|proper|repack|extended|dts|aac|ddp5.1).*$").unwrap()
});
static SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)[Ss](\d{1,2})[Ee](\d{1,3})").unwrap());
static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\.\-_ ](19\d{2}|20\d{2})(?:[\.\-_ ]|$)").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\._\s]+").unwrap());

/// Infers title/year/season/episode purely from the file and directory
/// names, with no external network calls or sidecar files. Last resort
/// before a remote lookup agent, since filenames are the noisiest source.
#[derive(Debug, Default)]
pub struct LocalAgent;

#[async_trait]
impl MetadataAgent for LocalAgent {
    fn agent_name(&self) -> &'static str {
        "local_filename"
    }

    fn category(&self) -> AgentCategory {
        AgentCategory::Local
    }

    fn default_order(&self) -> i32 {
        0
    }

    fn supported_library_types(&self) -> &'static [LibraryType] {
        SUPPORTED
    }

    async fn extract(&self, unit: &ScanUnit) -> CoreResult<Hints> {
        let Some(path) = unit.paths.first() else {
            return Err(CoreError::not_found("unit has no paths"));
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CoreError::invalid_argument("path has no usable file stem"))?;

        let mut hints = Hints::default();
        let year = YEAR_IN_PARENS.captures(stem).and_then(|c| c[1].parse::<f64>().ok());
        if let Some(year) = year {
            hints.push("year", HintValue::Number(year));
        }

        if let Some(caps) = SEASON_EPISODE.captures(stem) {
            if let (Ok(season), Ok(episode)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
                hints.push("season_number", HintValue::Number(season));
                hints.push("episode_number", HintValue::Number(episode));
            }
        }

        let title = clean_title(stem);
        if !title.is_empty() {
            hints.push("title", HintValue::Text(title));
        }

        if hints.values.is_empty() {
            return Err(CoreError::not_found("filename carried no usable signal"));
        }
        Ok(hints)
    }
}

fn clean_title(stem: &str) -> String {
    let without_junk = RELEASE_JUNK.replace(stem, "");
    let without_bare_year = BARE_YEAR.replace(&without_junk, " ");
    let without_year = YEAR_IN_PARENS.replace(&without_bare_year, "");
    let without_marker = SEASON_EPISODE.replace(&without_year, "");
    let spaced = SEPARATORS.replace_all(&without_marker, " ");
    spaced.trim().trim_matches('-').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_release_group_and_resolution_tags() {
        assert_eq!(clean_title("The.Movie.Title.2020.1080p.BluRay.x264-GROUP"), "The Movie Title");
    }

    #[test]
    fn strips_season_episode_marker() {
        assert_eq!(clean_title("Show Name S02E05 Episode Title"), "Show Name Episode Title");
    }

    #[test]
    fn leaves_plain_title_untouched() {
        assert_eq!(clean_title("A Simple Name"), "A Simple Name");
    }
}

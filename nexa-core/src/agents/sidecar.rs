use async_trait::async_trait;
use nexa_contracts::agent::{AgentCategory, HintValue, Hints, MetadataAgent, ScanUnit};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::metadata_type::LibraryType;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SUPPORTED: &[LibraryType] = &[LibraryType::Movies, LibraryType::TvShows, LibraryType::HomeVideos];

/// Reads Kodi-style `.nfo` sidecar XML files sitting next to (or named
/// after the containing directory of) a scanned unit's media files.
/// Highest-priority agent category: a curator who hand-writes an `.nfo`
/// expects it to win over every automatic inference.
#[derive(Debug, Default)]
pub struct SidecarAgent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
struct NfoMovie {
    title: Option<String>,
    originaltitle: Option<String>,
    sorttitle: Option<String>,
    plot: Option<String>,
    tagline: Option<String>,
    mpaa: Option<String>,
    year: Option<i32>,
    #[serde(default, rename = "genre")]
    genres: Vec<String>,
    #[serde(default, rename = "tag")]
    tags: Vec<String>,
    #[serde(default)]
    uniqueid: Vec<NfoUniqueId>,
}

#[derive(Debug, Deserialize)]
struct NfoUniqueId {
    #[serde(rename = "@type")]
    provider: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

fn sidecar_candidates(unit: &ScanUnit) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in &unit.paths {
        out.push(path.with_extension("nfo"));
        if let Some(dir) = path.parent() {
            out.push(dir.join("movie.nfo"));
            out.push(dir.join("tvshow.nfo"));
        }
    }
    out
}

async fn read_nfo(path: &Path) -> Option<NfoMovie> {
    let text = tokio::fs::read_to_string(path).await.ok()?;
    quick_xml::de::from_str(&text).ok()
}

#[async_trait]
impl MetadataAgent for SidecarAgent {
    fn agent_name(&self) -> &'static str {
        "sidecar_nfo"
    }

    fn category(&self) -> AgentCategory {
        AgentCategory::Sidecar
    }

    fn default_order(&self) -> i32 {
        0
    }

    fn supported_library_types(&self) -> &'static [LibraryType] {
        SUPPORTED
    }

    async fn extract(&self, unit: &ScanUnit) -> CoreResult<Hints> {
        let mut hints = Hints::default();
        for candidate in sidecar_candidates(unit) {
            let Some(nfo) = read_nfo(&candidate).await else { continue };

            if let Some(title) = nfo.title {
                hints.push("title", HintValue::Text(title));
            }
            if let Some(original) = nfo.originaltitle {
                hints.push("original_title", HintValue::Text(original));
            }
            if let Some(plot) = nfo.plot {
                hints.push("summary", HintValue::Text(plot));
            }
            if let Some(tagline) = nfo.tagline {
                hints.push("tagline", HintValue::Text(tagline));
            }
            if let Some(mpaa) = nfo.mpaa {
                hints.push("content_rating", HintValue::Text(mpaa));
            }
            if let Some(year) = nfo.year {
                hints.push("year", HintValue::Number(year as f64));
            }
            if !nfo.genres.is_empty() {
                hints.push("genres", HintValue::StringList(nfo.genres));
            }
            if !nfo.tags.is_empty() {
                hints.push("tags", HintValue::StringList(nfo.tags));
            }
            for id in nfo.uniqueid {
                if let (Some(provider), Some(value)) = (id.provider, id.value) {
                    hints.push("external_id", HintValue::ExternalId { provider, value });
                }
            }
            // First matching sidecar wins; a movie and a season nfo in the
            // same directory should not both apply to a single-file unit.
            return Ok(hints);
        }
        if hints.values.is_empty() {
            return Err(CoreError::not_found("no sidecar nfo found"));
        }
        Ok(hints)
    }
}

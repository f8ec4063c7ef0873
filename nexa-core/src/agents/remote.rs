use crate::agents::rate_limit::RemoteRateLimiter;
use async_trait::async_trait;
use nexa_contracts::agent::{AgentCategory, HintValue, Hints, MetadataAgent, ScanUnit};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::metadata_type::LibraryType;
use nexa_model::settings::RemoteMetadataHttpSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const SUPPORTED: &[LibraryType] = &[LibraryType::Movies, LibraryType::TvShows, LibraryType::HomeVideos];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    title: Option<String>,
    name: Option<String>,
    original_title: Option<String>,
    overview: Option<String>,
    tagline: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
}

/// Looks up title/summary/genre/release-year from a TMDB-shaped remote
/// catalog by title search + details fetch. `base_address` and auth are
/// environment-supplied rather than hardcoded to one provider, per
/// spec.md §4.C's generic `RemoteMetadataHttpSettings`.
pub struct RemoteMetadataAgent {
    client: reqwest::Client,
    base_address: String,
    api_key: String,
    limiter: RemoteRateLimiter,
    extra_headers: BTreeMap<String, String>,
}

impl RemoteMetadataAgent {
    pub fn new(
        base_address: String,
        api_key: String,
        extra_headers: BTreeMap<String, String>,
        settings: &RemoteMetadataHttpSettings,
    ) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.accept_insecure_tls)
            .build()
            .map_err(|e| CoreError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_address,
            api_key,
            limiter: RemoteRateLimiter::new(settings),
            extra_headers,
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(format!("{}{}", self.base_address, path)).query(&[("api_key", &self.api_key)]);
        for (key, value) in &self.extra_headers {
            req = req.header(key, value);
        }
        req
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(&self, path: &str) -> CoreResult<T> {
        self.limiter.acquire().await;
        let response = self
            .request(path)
            .send()
            .await
            .map_err(|e| CoreError::internal(format!("remote metadata request failed: {e}")))?;
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CoreError::failed_precondition("remote metadata provider rate-limited this request"));
        }
        if !response.status().is_success() {
            return Err(CoreError::not_found(format!("remote metadata provider returned {}", response.status())));
        }
        response
            .json()
            .await
            .map_err(|e| CoreError::internal(format!("failed to parse remote metadata response: {e}")))
    }
}

#[async_trait]
impl MetadataAgent for RemoteMetadataAgent {
    fn agent_name(&self) -> &'static str {
        "remote_catalog"
    }

    fn category(&self) -> AgentCategory {
        AgentCategory::Remote
    }

    fn default_order(&self) -> i32 {
        0
    }

    fn supported_library_types(&self) -> &'static [LibraryType] {
        SUPPORTED
    }

    async fn extract(&self, unit: &ScanUnit) -> CoreResult<Hints> {
        let query = unit
            .path_hints
            .get("directory_name")
            .cloned()
            .or_else(|| unit.paths.first().and_then(|p| p.file_stem()).and_then(|s| s.to_str()).map(str::to_string))
            .ok_or_else(|| CoreError::invalid_argument("unit has no title signal to search with"))?;

        let endpoint = if unit.library_type == LibraryType::TvShows { "/search/tv" } else { "/search/movie" };
        let search: SearchResponse = self.fetch(&format!("{endpoint}?query={}", urlencoding(&query))).await?;
        let id = search.results.first().ok_or_else(|| CoreError::not_found("no remote match found"))?.id;

        let details_endpoint =
            if unit.library_type == LibraryType::TvShows { format!("/tv/{id}") } else { format!("/movie/{id}") };
        let details: DetailsResponse = self.fetch(&details_endpoint).await?;

        let mut hints = Hints::default();
        if let Some(title) = details.title.or(details.name) {
            hints.push("title", HintValue::Text(title));
        }
        if let Some(original) = details.original_title {
            hints.push("original_title", HintValue::Text(original));
        }
        if let Some(summary) = details.overview {
            hints.push("summary", HintValue::Text(summary));
        }
        if let Some(tagline) = details.tagline {
            hints.push("tagline", HintValue::Text(tagline));
        }
        let release_date = details.release_date.or(details.first_air_date);
        if let Some(year) = release_date.and_then(|d| d.get(0..4).and_then(|y| y.parse::<f64>().ok())) {
            hints.push("year", HintValue::Number(year));
        }
        if !details.genres.is_empty() {
            hints.push("genres", HintValue::StringList(details.genres.into_iter().map(|g| g.name).collect()));
        }
        hints.push("external_id", HintValue::ExternalId { provider: "remote_catalog".into(), value: id.to_string() });

        Ok(hints)
    }
}

fn urlencoding(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

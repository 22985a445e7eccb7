//! MusicBrainz API client.
//!
//! ## Endpoints
//!
//! - **Search**: `{base}/release/?query={query}&fmt=json&limit={n}`
//! - **Lookup**: `{base}/release/{id}?inc=recordings+artist-credits+media&fmt=json`
//!
//! Every request carries `fmt=json` and the mandatory identifying
//! User-Agent. MusicBrainz allows identified clients one request per
//! second; the client paces itself accordingly and retries a 429 exactly
//! once after the declared delay.

use crate::config::MusicBrainzConfig;
use crate::error::ProviderError;
use crate::providers::{execute_retrying_once_on_429, RateLimiter};
use core_http::{HttpClient, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Maximum number of search results to request.
const MAX_SEARCH_RESULTS: u32 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct MusicBrainzClient {
    http_client: Arc<dyn HttpClient>,
    config: MusicBrainzConfig,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    releases: Vec<ReleaseHit>,
}

/// A release as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseHit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "track-count", default)]
    pub track_count: Option<i64>,
    #[serde(rename = "label-info", default)]
    label_info: Vec<LabelInfo>,
}

impl ReleaseHit {
    pub fn label_name(&self) -> Option<String> {
        self.label_info
            .iter()
            .filter_map(|info| info.label.as_ref())
            .filter_map(|label| label.name.clone())
            .next()
    }
}

/// A release with embedded media and recordings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "label-info", default)]
    label_info: Vec<LabelInfo>,
    #[serde(default)]
    pub media: Vec<Media>,
}

impl ReleaseDetail {
    pub fn label_name(&self) -> Option<String> {
        self.label_info
            .iter()
            .filter_map(|info| info.label.as_ref())
            .filter_map(|label| label.name.clone())
            .next()
    }

    pub fn track_count(&self) -> i64 {
        self.media.iter().map(|m| m.tracks.len() as i64).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LabelInfo {
    #[serde(default)]
    label: Option<Label>,
}

#[derive(Debug, Clone, Deserialize)]
struct Label {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    /// 1-based disc position
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub tracks: Vec<MediaTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaTrack {
    /// 1-based track position within the disc
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub recording: Option<Recording>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
}

impl MediaTrack {
    /// Joined artist-credit display name, e.g. "A feat. B".
    pub fn artist_name(&self) -> Option<String> {
        if self.artist_credit.is_empty() {
            return None;
        }
        let mut name = String::new();
        for credit in &self.artist_credit {
            if let Some(n) = &credit.name {
                name.push_str(n);
            }
            if let Some(join) = &credit.joinphrase {
                name.push_str(join);
            }
        }
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub id: String,
    #[serde(default)]
    pub length: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArtistCredit {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    joinphrase: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl MusicBrainzClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: MusicBrainzConfig) -> Self {
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(config.rate_limit_ms)));
        Self {
            http_client,
            config,
            rate_limiter,
        }
    }

    /// Search for a soundtrack release, returning the first hit.
    pub async fn search_release(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<ReleaseHit>, ProviderError> {
        let query = Self::build_query(title, year);
        let url = format!(
            "{}/release/?query={}&fmt=json&limit={}",
            self.config.base_url,
            urlencoding::encode(&query),
            MAX_SEARCH_RESULTS
        );

        debug!(%query, "searching MusicBrainz releases");

        let response = self.get(url).await?;
        let search: SearchResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(search.releases.into_iter().next())
    }

    /// Fetch a release with its recordings, artist credits and media.
    pub async fn lookup_release(&self, release_id: &str) -> Result<ReleaseDetail, ProviderError> {
        let url = format!(
            "{}/release/{}?inc=recordings+artist-credits+media&fmt=json",
            self.config.base_url, release_id
        );

        let response = self.get(url).await?;
        response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// URL of the release's front cover on the Cover Art Archive.
    pub fn cover_art_url(&self, release_id: &str) -> String {
        format!(
            "{}/release/{}/front",
            self.config.cover_art_base_url, release_id
        )
    }

    /// Public page URL for a release.
    pub fn release_page_url(&self, release_id: &str) -> String {
        format!("https://musicbrainz.org/release/{}", release_id)
    }

    async fn get(&self, url: String) -> Result<HttpResponse, ProviderError> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::get(url)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = execute_retrying_once_on_429(self.http_client.as_ref(), request).await?;
        if !response.is_success() {
            return Err(ProviderError::Api {
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }

    /// Build the Lucene search query: quoted title phrase, soundtrack type
    /// filter, and an inclusive ±1 year range when a year is known.
    fn build_query(title: &str, year: Option<i32>) -> String {
        let mut query = format!(
            "release:\"{}\" AND type:\"soundtrack\"",
            Self::escape_query(title)
        );
        if let Some(year) = year {
            query.push_str(&format!(" AND date:[{} TO {}]", year - 1, year + 1));
        }
        query
    }

    /// Escape Lucene special characters inside the quoted phrase.
    fn escape_query(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('+', "\\+")
            .replace('-', "\\-")
            .replace('!', "\\!")
            .replace('(', "\\(")
            .replace(')', "\\)")
            .replace('[', "\\[")
            .replace(']', "\\]")
            .replace('^', "\\^")
            .replace('~', "\\~")
            .replace('*', "\\*")
            .replace('?', "\\?")
            .replace(':', "\\:")
            .replace('/', "\\/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::ScriptedHttpClient;

    fn client_with(http: Arc<ScriptedHttpClient>) -> MusicBrainzClient {
        let config = MusicBrainzConfig {
            rate_limit_ms: 0,
            ..MusicBrainzConfig::default()
        };
        MusicBrainzClient::new(http, config)
    }

    #[test]
    fn query_includes_type_filter_and_year_range() {
        assert_eq!(
            MusicBrainzClient::build_query("Example Film", Some(1999)),
            "release:\"Example Film\" AND type:\"soundtrack\" AND date:[1998 TO 2000]"
        );
        assert_eq!(
            MusicBrainzClient::build_query("Example Film", None),
            "release:\"Example Film\" AND type:\"soundtrack\""
        );
    }

    #[test]
    fn query_escapes_lucene_characters() {
        assert_eq!(
            MusicBrainzClient::build_query("AC/DC: Live", None),
            "release:\"AC\\/DC\\: Live\" AND type:\"soundtrack\""
        );
    }

    #[tokio::test]
    async fn search_sends_fmt_json_and_user_agent() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_status(200, r#"{"releases": []}"#);

        let client = client_with(http.clone());
        let hit = client.search_release("Example Film", None).await.unwrap();
        assert!(hit.is_none());

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("fmt=json"));
        assert!(requests[0]
            .headers
            .get("User-Agent")
            .is_some_and(|ua| ua.contains('/')));
    }

    #[tokio::test]
    async fn search_returns_first_hit() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_status(
            200,
            r#"{"releases": [
                {"id": "rel-1", "title": "Example Film", "date": "1999-05-01",
                 "track-count": 2,
                 "label-info": [{"label": {"name": "Example Records"}}]},
                {"id": "rel-2", "title": "Example Film (reissue)"}
            ]}"#,
        );

        let client = client_with(http);
        let hit = client
            .search_release("Example Film", Some(1999))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "rel-1");
        assert_eq!(hit.track_count, Some(2));
        assert_eq!(hit.label_name().as_deref(), Some("Example Records"));
    }

    #[tokio::test]
    async fn lookup_parses_media_positions() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_status(
            200,
            r#"{"id": "rel-1", "title": "Example Film", "date": "1999",
                "media": [
                  {"position": 1, "tracks": [
                    {"position": 1, "title": "Main Theme", "length": 180000,
                     "recording": {"id": "rec-1"},
                     "artist-credit": [{"name": "Composer A", "joinphrase": " & "},
                                        {"name": "Composer B"}]}
                  ]},
                  {"position": 2, "tracks": [
                    {"position": 1, "title": "End Credits",
                     "recording": {"id": "rec-2"}}
                  ]}
                ]}"#,
        );

        let client = client_with(http);
        let release = client.lookup_release("rel-1").await.unwrap();
        assert_eq!(release.media.len(), 2);
        assert_eq!(release.track_count(), 2);

        let first = &release.media[0].tracks[0];
        assert_eq!(first.artist_name().as_deref(), Some("Composer A & Composer B"));
        assert_eq!(first.recording.as_ref().unwrap().id, "rec-1");
    }

    #[tokio::test]
    async fn api_errors_surface_status() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_status(503, "unavailable");

        let client = client_with(http);
        let err = client.search_release("Example Film", None).await;
        assert!(matches!(err, Err(ProviderError::Api { status: 503, .. })));
    }
}

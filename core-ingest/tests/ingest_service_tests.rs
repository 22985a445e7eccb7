//! Integration tests for the ingestion coordinator.
//!
//! Sources are stubbed at the `SoundtrackSource` seam; persistence runs
//! against the real repository on in-memory SQLite; enrichment runs against
//! a scripted HTTP client.

use async_trait::async_trait;
use core_catalog::db::create_test_pool;
use core_catalog::repositories::{SoundtrackRepository, SqliteSoundtrackRepository};
use core_http::{HttpClient, HttpRequest, HttpResponse};
use core_ingest::config::SpotifyConfig;
use core_ingest::enrichment::SpotifyEnrichment;
use core_ingest::providers::SpotifyClient;
use core_ingest::sources::SoundtrackSource;
use core_ingest::types::{SearchQuery, SoundtrackMetadata, SourceResult, TrackInfo};
use core_ingest::{IngestRequest, IngestService};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// A source with a fixed answer and a call counter.
struct StubSource {
    name: &'static str,
    priority: u32,
    available: bool,
    result: Option<SourceResult>,
    calls: AtomicUsize,
}

impl StubSource {
    fn hit(name: &'static str, priority: u32, result: SourceResult) -> Arc<Self> {
        Arc::new(Self {
            name,
            priority,
            available: true,
            result: Some(result),
            calls: AtomicUsize::new(0),
        })
    }

    fn miss(name: &'static str, priority: u32) -> Arc<Self> {
        Arc::new(Self {
            name,
            priority,
            available: true,
            result: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn unavailable(name: &'static str, priority: u32) -> Arc<Self> {
        Arc::new(Self {
            name,
            priority,
            available: false,
            result: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SoundtrackSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, _query: &SearchQuery) -> Option<SourceResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Replays queued HTTP responses in order.
struct ScriptedHttp {
    responses: Mutex<VecDeque<(u16, String)>>,
}

impl ScriptedHttp {
    fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect(),
            ),
        })
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, _request: HttpRequest) -> core_http::Result<HttpResponse> {
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| core_http::HttpError::Request("no scripted response left".into()))?;
        Ok(HttpResponse {
            status,
            headers: Default::default(),
            body: bytes::Bytes::from(body),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn repository() -> Arc<SqliteSoundtrackRepository> {
    let pool = create_test_pool().await.unwrap();
    Arc::new(SqliteSoundtrackRepository::new(pool))
}

fn request(film_id: &str) -> IngestRequest {
    IngestRequest {
        film_id: film_id.to_string(),
        title: "Example Film".to_string(),
        year: Some(1999),
        external_id: None,
    }
}

fn scraped_result() -> SourceResult {
    let metadata = SoundtrackMetadata::new("Example Film", "imdb");
    SourceResult {
        metadata,
        tracks: vec![TrackInfo::new("Main Theme", 1, 1)],
    }
}

fn two_disc_result(source: &str) -> SourceResult {
    let mut metadata = SoundtrackMetadata::new("Example Film", source);
    metadata.release_date = Some("1999".to_string());
    let mut first = TrackInfo::new("Main Theme", 1, 1);
    first.recording_id = Some("rec-1".to_string());
    let mut second = TrackInfo::new("End Credits", 1, 2);
    second.recording_id = Some("rec-2".to_string());
    SourceResult {
        metadata,
        tracks: vec![first, second],
    }
}

const TOKEN_BODY: &str =
    r#"{"access_token": "tok-1", "token_type": "Bearer", "expires_in": 3600}"#;

fn enrichment_with(http: Arc<ScriptedHttp>) -> SpotifyEnrichment {
    let client = SpotifyClient::new(http, SpotifyConfig::new("id", "secret"));
    SpotifyEnrichment::new(Arc::new(client))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_ingestion_returns_same_id_without_provider_calls() {
    let repo = repository().await;
    let source = StubSource::hit("imdb", 10, scraped_result());
    let service = IngestService::new(repo.clone()).register_source(source.clone());

    let first = service.ingest(&request("film-1")).await.unwrap().unwrap();
    assert_eq!(source.calls(), 1);

    let second = service.ingest(&request("film-1")).await.unwrap().unwrap();
    assert_eq!(second, first);
    // The short-circuit made no further source calls.
    assert_eq!(source.calls(), 1);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn lower_priority_value_wins_regardless_of_registration_order() {
    let repo = repository().await;
    let preferred = StubSource::hit("preferred-provider", 10, scraped_result());
    let other = StubSource::hit("other-provider", 20, two_disc_result("other-provider"));

    // Registered backwards on purpose.
    let service = IngestService::new(repo.clone())
        .register_source(other.clone())
        .register_source(preferred.clone());

    let id = service.ingest(&request("film-1")).await.unwrap().unwrap();
    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.source, "preferred-provider");
    assert_eq!(other.calls(), 0);
}

#[tokio::test]
async fn fallback_source_is_attempted_when_earlier_sources_miss() {
    let repo = repository().await;
    let scraping = StubSource::miss("imdb", 10);
    let fallback = StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz"));

    let service = IngestService::new(repo.clone())
        .register_source(scraping.clone())
        .register_source(fallback.clone());

    let id = service.ingest(&request("film-1")).await.unwrap().unwrap();
    assert_eq!(scraping.calls(), 1);
    assert_eq!(fallback.calls(), 1);

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.source, "musicbrainz");
}

#[tokio::test]
async fn unavailable_sources_are_skipped() {
    let repo = repository().await;
    let needs_credentials = StubSource::unavailable("credentialed-provider", 5);
    let scraping = StubSource::hit("imdb", 10, scraped_result());

    let service = IngestService::new(repo.clone())
        .register_source(needs_credentials.clone())
        .register_source(scraping.clone());

    service.ingest(&request("film-1")).await.unwrap().unwrap();
    assert_eq!(needs_credentials.calls(), 0);
    assert_eq!(scraping.calls(), 1);
}

#[tokio::test]
async fn nothing_found_persists_nothing() {
    let repo = repository().await;
    let scraping = StubSource::miss("imdb", 10);
    let fallback = StubSource::miss("musicbrainz", 20);

    let service = IngestService::new(repo.clone())
        .register_source(scraping.clone())
        .register_source(fallback.clone());

    let outcome = service.ingest(&request("film-1")).await.unwrap();
    assert!(outcome.is_none());
    assert_eq!(scraping.calls(), 1);
    assert_eq!(fallback.calls(), 1);
    assert_eq!(repo.count().await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scraped_single_track_soundtrack_is_persisted() {
    let repo = repository().await;
    let source = StubSource::hit("imdb", 10, scraped_result());
    let service = IngestService::new(repo.clone()).register_source(source);

    let id = service.ingest(&request("film-1")).await.unwrap().unwrap();

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.source, "imdb");
    assert!(stored.total_tracks.is_none());

    let tracks = repo.tracks_for(&id).await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_number, 1);
    assert_eq!(tracks[0].disc_number, 1);
    assert_eq!(tracks[0].title, "Main Theme");
}

#[tokio::test]
async fn enrichment_attaches_preview_to_exactly_the_matching_track() {
    let repo = repository().await;
    let fallback = StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz"));

    // Token, album search, album tracks. Only "End Credits" matches exactly.
    let http = ScriptedHttp::new(vec![
        (200, TOKEN_BODY),
        (
            200,
            r#"{"albums": {"items": [
                {"id": "alb-1", "name": "Example Film",
                 "images": [{"url": "https://img.example/cover.jpg"}]}
            ]}}"#,
        ),
        (
            200,
            r#"{"items": [
                {"id": "trk-9", "name": "end credits",
                 "preview_url": "https://p.example/end.mp3"},
                {"id": "trk-8", "name": "Main Theme (Orchestral Version)"}
            ]}"#,
        ),
    ]);

    let service = IngestService::new(repo.clone())
        .register_source(fallback)
        .with_enrichment(enrichment_with(http));

    let id = service.ingest(&request("film-1")).await.unwrap().unwrap();

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    // Enrichment attaches the album id but never rewrites the source tag.
    assert_eq!(stored.source, "musicbrainz");
    assert_eq!(stored.spotify_album_id.as_deref(), Some("alb-1"));
    assert_eq!(
        stored.cover_art_url.as_deref(),
        Some("https://img.example/cover.jpg")
    );

    let tracks = repo.tracks_for(&id).await.unwrap();
    assert_eq!(tracks.len(), 2);

    let main_theme = tracks.iter().find(|t| t.title == "Main Theme").unwrap();
    assert!(main_theme.preview_url.is_none());
    assert!(main_theme.spotify_track_id.is_none());

    let end_credits = tracks.iter().find(|t| t.title == "End Credits").unwrap();
    assert_eq!(
        end_credits.preview_url.as_deref(),
        Some("https://p.example/end.mp3")
    );
    assert_eq!(end_credits.spotify_uri.as_deref(), Some("spotify:track:trk-9"));
}

#[tokio::test]
async fn failed_enrichment_is_equivalent_to_no_enrichment() {
    // One service without enrichment, one whose enrichment finds nothing,
    // and one whose enrichment fails outright.
    let repo = repository().await;

    let plain = IngestService::new(repo.clone())
        .register_source(StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz")));
    let zero_match_http = ScriptedHttp::new(vec![(200, TOKEN_BODY), (200, r#"{"albums": {"items": []}}"#)]);
    let zero_match = IngestService::new(repo.clone())
        .register_source(StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz")))
        .with_enrichment(enrichment_with(zero_match_http));
    let failing_http = ScriptedHttp::new(vec![(500, "upstream exploded")]);
    let failing = IngestService::new(repo.clone())
        .register_source(StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz")))
        .with_enrichment(enrichment_with(failing_http));

    let id_plain = plain.ingest(&request("film-a")).await.unwrap().unwrap();
    let id_zero = zero_match.ingest(&request("film-b")).await.unwrap().unwrap();
    let id_fail = failing.ingest(&request("film-c")).await.unwrap().unwrap();

    let a = repo.find_by_id(&id_plain).await.unwrap().unwrap();
    let b = repo.find_by_id(&id_zero).await.unwrap().unwrap();
    let c = repo.find_by_id(&id_fail).await.unwrap().unwrap();

    for stored in [&b, &c] {
        assert_eq!(stored.title, a.title);
        assert_eq!(stored.source, a.source);
        assert_eq!(stored.release_date, a.release_date);
        assert_eq!(stored.cover_art_url, a.cover_art_url);
        assert_eq!(stored.spotify_album_id, None);
    }

    for id in [&id_plain, &id_zero, &id_fail] {
        let tracks = repo.tracks_for(id).await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t.spotify_track_id.is_none()
            && t.preview_url.is_none()
            && t.spotify_uri.is_none()));
    }
}

#[tokio::test]
async fn persisted_tracks_read_back_in_disc_then_number_order() {
    let repo = repository().await;
    let source = StubSource::hit("musicbrainz", 20, two_disc_result("musicbrainz"));
    let service = IngestService::new(repo.clone()).register_source(source);

    let id = service.ingest(&request("film-1")).await.unwrap().unwrap();
    let tracks = repo.tracks_for(&id).await.unwrap();

    let positions: Vec<(i64, i64)> = tracks
        .iter()
        .map(|t| (t.disc_number, t.track_number))
        .collect();
    assert_eq!(positions, vec![(1, 1), (2, 1)]);
}

//! # Ingestion Coordinator
//!
//! Single-pass state machine per request: idempotency check, source sweep
//! in priority order, best-effort enrichment, transactional persistence.
//! A request that finds nothing is `Ok(None)`; only catalog failures are
//! errors. There is no retry; callers re-invoke later, and the idempotency
//! check makes that safe once persistence has succeeded.

use crate::config::IngestConfig;
use crate::enrichment::SpotifyEnrichment;
use crate::error::{IngestError, Result};
use crate::providers::{ImdbClient, MusicBrainzClient, SpotifyClient};
use crate::sources::{ImdbSource, MusicBrainzSource, SoundtrackSource};
use crate::types::{SearchQuery, SoundtrackMetadata, SourceResult, TrackInfo};
use core_catalog::models::{Soundtrack, SoundtrackTrack};
use core_catalog::repositories::SoundtrackRepository;
use core_http::HttpClient;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default sweep positions: scraping first, structured API as fallback.
const IMDB_PRIORITY: u32 = 10;
const MUSICBRAINZ_PRIORITY: u32 = 20;

/// One film to ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Opaque film identifier owned by the surrounding catalog
    pub film_id: String,
    /// Film title
    pub title: String,
    /// Release year, if known
    pub year: Option<i32>,
    /// Scraping provider's id, when already known from a catalog sync
    pub external_id: Option<String>,
}

pub struct IngestService {
    sources: Vec<Arc<dyn SoundtrackSource>>,
    enrichment: Option<SpotifyEnrichment>,
    repository: Arc<dyn SoundtrackRepository>,
}

impl IngestService {
    pub fn new(repository: Arc<dyn SoundtrackRepository>) -> Self {
        Self {
            sources: Vec::new(),
            enrichment: None,
            repository,
        }
    }

    /// Wire the default provider set from configuration: IMDb scraping,
    /// MusicBrainz fallback, and Spotify enrichment when credentials are
    /// present.
    pub fn from_config(
        config: IngestConfig,
        http_client: Arc<dyn HttpClient>,
        repository: Arc<dyn SoundtrackRepository>,
    ) -> Self {
        let imdb = Arc::new(ImdbClient::new(http_client.clone(), config.imdb));
        let musicbrainz = Arc::new(MusicBrainzClient::new(
            http_client.clone(),
            config.musicbrainz,
        ));

        let mut service = Self::new(repository)
            .register_source(Arc::new(ImdbSource::new(imdb, IMDB_PRIORITY)))
            .register_source(Arc::new(MusicBrainzSource::new(
                musicbrainz,
                MUSICBRAINZ_PRIORITY,
            )));

        if let Some(spotify) = config.spotify {
            let client = Arc::new(SpotifyClient::new(http_client, spotify));
            service = service.with_enrichment(SpotifyEnrichment::new(client));
        }
        service
    }

    /// Register a source; the sweep order follows ascending `priority()`.
    pub fn register_source(mut self, source: Arc<dyn SoundtrackSource>) -> Self {
        self.sources.push(source);
        self.sources.sort_by_key(|s| s.priority());
        self
    }

    pub fn with_enrichment(mut self, enrichment: SpotifyEnrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Ingest one film's soundtrack.
    ///
    /// # Returns
    /// - `Ok(Some(id))`: the persisted soundtrack id (fresh, or the
    ///   existing one when the film was already ingested)
    /// - `Ok(None)`: no provider had a usable result; nothing persisted
    ///
    /// # Errors
    /// Only catalog failures; provider trouble never surfaces here.
    #[instrument(skip(self, request), fields(film_id = %request.film_id, title = %request.title))]
    pub async fn ingest(&self, request: &IngestRequest) -> Result<Option<String>> {
        if request.film_id.trim().is_empty() {
            return Err(IngestError::InvalidRequest("film_id is empty".to_string()));
        }
        if request.title.trim().is_empty() {
            return Err(IngestError::InvalidRequest("title is empty".to_string()));
        }

        // Already ingested: answer from the catalog, no network calls.
        if let Some(existing) = self.repository.find_by_film_id(&request.film_id).await? {
            info!(soundtrack_id = %existing.id, "soundtrack already ingested");
            return Ok(Some(existing.id));
        }

        let query = SearchQuery {
            title: request.title.clone(),
            year: request.year,
            external_id: request.external_id.clone(),
        };

        let mut result: Option<SourceResult> = None;
        for source in &self.sources {
            if !source.is_available() {
                debug!(source = source.name(), "skipping unavailable source");
                continue;
            }
            debug!(source = source.name(), "querying source");
            if let Some(found) = source.search(&query).await {
                info!(
                    source = source.name(),
                    tracks = found.tracks.len(),
                    "source produced a result"
                );
                result = Some(found);
                break;
            }
        }

        let Some(SourceResult {
            mut metadata,
            mut tracks,
        }) = result
        else {
            info!("no source produced a soundtrack");
            return Ok(None);
        };

        if let Some(enrichment) = &self.enrichment {
            enrichment.enrich(&query, &mut metadata, &mut tracks).await;
        }

        let soundtrack = build_soundtrack(&request.film_id, metadata);
        let rows = build_track_rows(&soundtrack.id, tracks);
        self.repository.insert_with_tracks(&soundtrack, &rows).await?;

        info!(soundtrack_id = %soundtrack.id, tracks = rows.len(), "soundtrack ingested");
        Ok(Some(soundtrack.id))
    }
}

fn build_soundtrack(film_id: &str, metadata: SoundtrackMetadata) -> Soundtrack {
    let mut soundtrack = Soundtrack::new(film_id.to_string(), metadata.title, metadata.source);
    soundtrack.release_date = metadata.release_date;
    soundtrack.label = metadata.label;
    soundtrack.album_type = metadata.album_type;
    soundtrack.external_id = metadata.external_id;
    soundtrack.url = metadata.url;
    soundtrack.spotify_album_id = metadata.spotify_album_id;
    soundtrack.cover_art_url = metadata.cover_art_url;
    soundtrack.total_tracks = metadata.total_tracks;
    soundtrack
}

/// Track rows keep the provider-native order; readers sort on
/// `(disc_number, track_number)`.
fn build_track_rows(soundtrack_id: &str, tracks: Vec<TrackInfo>) -> Vec<SoundtrackTrack> {
    tracks
        .into_iter()
        .map(|info| {
            let mut row = SoundtrackTrack::new(
                soundtrack_id.to_string(),
                info.track_number,
                info.disc_number,
                info.title,
            );
            row.artist = info.artist;
            row.duration_ms = info.duration_ms;
            row.recording_id = info.recording_id;
            row.spotify_track_id = info.spotify_track_id;
            row.preview_url = info.preview_url;
            row.spotify_uri = info.spotify_uri;
            row
        })
        .collect()
}

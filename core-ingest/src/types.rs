//! Transient, provider-agnostic result types.
//!
//! These are what source adapters hand to the coordinator; they are mapped
//! into `core_catalog` rows only at the persistence step.

/// What the caller knows about the film being ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Film title
    pub title: String,
    /// Release year, used to disambiguate search hits
    pub year: Option<i32>,
    /// Scraping provider's identifier when already known from a catalog
    /// sync; lets the scraping adapter skip its own title search.
    pub external_id: Option<String>,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            external_id: None,
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// Album-level metadata produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundtrackMetadata {
    /// Album title
    pub title: String,
    /// Release date as the provider stated it, possibly partial
    pub release_date: Option<String>,
    /// Record label
    pub label: Option<String>,
    /// Album classification tag
    pub album_type: String,
    /// Provider-assigned identifier
    pub external_id: Option<String>,
    /// Provider page URL
    pub url: Option<String>,
    /// Cover art URL
    pub cover_art_url: Option<String>,
    /// Provider-declared total track count
    pub total_tracks: Option<i64>,
    /// Spotify album id, attached by enrichment only
    pub spotify_album_id: Option<String>,
    /// Name of the provider that produced this metadata
    pub source: String,
}

impl SoundtrackMetadata {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            release_date: None,
            label: None,
            album_type: "soundtrack".to_string(),
            external_id: None,
            url: None,
            cover_art_url: None,
            total_tracks: None,
            spotify_album_id: None,
            source: source.into(),
        }
    }
}

/// One track of a source result, in provider-native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: Option<String>,
    /// 1-based position within the disc
    pub track_number: i64,
    /// 1-based disc number
    pub disc_number: i64,
    pub duration_ms: Option<i64>,
    /// Primary provider's recording id
    pub recording_id: Option<String>,
    /// Secondary provider fields, populated by enrichment only
    pub spotify_track_id: Option<String>,
    pub preview_url: Option<String>,
    pub spotify_uri: Option<String>,
}

impl TrackInfo {
    pub fn new(title: impl Into<String>, track_number: i64, disc_number: i64) -> Self {
        Self {
            title: title.into(),
            artist: None,
            track_number,
            disc_number,
            duration_ms: None,
            recording_id: None,
            spotify_track_id: None,
            preview_url: None,
            spotify_uri: None,
        }
    }
}

/// A successful source lookup: album metadata plus its track listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    pub metadata: SoundtrackMetadata,
    pub tracks: Vec<TrackInfo>,
}

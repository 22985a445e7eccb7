//! Pipeline configuration.

/// Configuration for the ingestion pipeline and its provider clients.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub imdb: ImdbConfig,
    pub musicbrainz: MusicBrainzConfig,
    /// Spotify credentials; enrichment is skipped entirely when absent.
    pub spotify: Option<SpotifyConfig>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            imdb: ImdbConfig::default(),
            musicbrainz: MusicBrainzConfig::default(),
            spotify: None,
        }
    }
}

/// Scraping provider settings.
#[derive(Debug, Clone)]
pub struct ImdbConfig {
    /// Site base URL, overridable for tests
    pub base_url: String,
    /// Minimum spacing between requests, in milliseconds
    pub rate_limit_ms: u64,
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.imdb.com".to_string(),
            rate_limit_ms: 1000,
        }
    }
}

/// MusicBrainz settings.
///
/// MusicBrainz requires every client to identify itself with a User-Agent
/// of the form "AppName/Version (contact)" and allows at most one request
/// per second for identified clients.
#[derive(Debug, Clone)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    pub cover_art_base_url: String,
    pub user_agent: String,
    pub rate_limit_ms: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            cover_art_base_url: "https://coverartarchive.org".to_string(),
            user_agent: "Filmscore/0.1 (filmscore@example.com)".to_string(),
            rate_limit_ms: 1000,
        }
    }
}

/// Spotify client-credentials settings.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl SpotifyConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
        }
    }
}

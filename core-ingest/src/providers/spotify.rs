//! Spotify Web API client (client-credentials flow).
//!
//! ## Endpoints
//!
//! - **Token**: `POST {token_url}` with HTTP Basic `client_id:client_secret`
//!   and a `grant_type=client_credentials` body
//! - **Search**: `GET {api}/search?q={query}&type=album`
//! - **Album tracks**: `GET {api}/albums/{id}/tracks`
//!
//! The bearer token is cached with its computed expiry; a request
//! re-authenticates only when the cached token is within the safety margin
//! of expiring. A 429 is retried exactly once after the declared delay.

use crate::config::SpotifyConfig;
use crate::error::ProviderError;
use crate::providers::execute_retrying_once_on_429;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use core_http::{HttpClient, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Safety margin subtracted from the provider-declared token lifetime.
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

const MAX_SEARCH_RESULTS: u32 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SpotifyClient {
    http_client: Arc<dyn HttpClient>,
    config: SpotifyConfig,
    token: Mutex<Option<CachedToken>>,
}

/// A bearer token plus its computed expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn from_lifetime(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
        }
    }

    fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(buffer_seconds)
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct AlbumSearchResponse {
    albums: AlbumPage,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<SpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

impl SpotifyAlbum {
    /// Spotify orders images largest first.
    pub fn best_image_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AlbumTracksResponse {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

impl SpotifyTrack {
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl SpotifyClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: SpotifyConfig) -> Self {
        Self {
            http_client,
            config,
            token: Mutex::new(None),
        }
    }

    /// Search for an album by title, returning the first candidate.
    pub async fn search_album(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<SpotifyAlbum>, ProviderError> {
        let mut query = format!("album:\"{}\"", title);
        if let Some(year) = year {
            query.push_str(&format!(" year:{}", year));
        }

        let mut url = Url::parse(&format!("{}/search", self.config.api_base_url))
            .map_err(|e| ProviderError::Parse(format!("invalid search URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("type", "album")
            .append_pair("limit", &MAX_SEARCH_RESULTS.to_string());

        debug!(%query, "searching Spotify albums");

        let response = self.authorized_get(url.into()).await?;
        let search: AlbumSearchResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(search.albums.items.into_iter().next())
    }

    /// Fetch the track listing of an album.
    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<SpotifyTrack>, ProviderError> {
        let url = format!("{}/albums/{}/tracks?limit=50", self.config.api_base_url, album_id);

        let response = self.authorized_get(url).await?;
        let tracks: AlbumTracksResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(tracks.items)
    }

    async fn authorized_get(&self, url: String) -> Result<HttpResponse, ProviderError> {
        let token = self.valid_token().await?;

        let request = HttpRequest::get(url)
            .bearer_token(token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = execute_retrying_once_on_429(self.http_client.as_ref(), request).await?;
        if response.status == 401 {
            return Err(ProviderError::Auth("access token rejected".to_string()));
        }
        if !response.is_success() {
            return Err(ProviderError::Api {
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }

    /// Return the cached token, re-authenticating only when it is within
    /// the safety margin of expiring.
    async fn valid_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if !token.is_expired_with_buffer(TOKEN_EXPIRY_BUFFER_SECS) {
                return Ok(token.access_token.clone());
            }
            debug!("cached Spotify token expired, re-authenticating");
        }

        let token = self.authenticate().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn authenticate(&self) -> Result<CachedToken, ProviderError> {
        let credentials = STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));

        let request = HttpRequest::post(self.config.token_url.as_str())
            .basic_auth(credentials)
            .form(&[("grant_type", "client_credentials")])
            .map_err(|e| ProviderError::Auth(e.to_string()))?
            .timeout(REQUEST_TIMEOUT);

        let response = execute_retrying_once_on_429(self.http_client.as_ref(), request).await?;
        if !response.is_success() {
            return Err(ProviderError::Auth(format!(
                "token request failed with status {}",
                response.status
            )));
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(CachedToken::from_lifetime(
            token.access_token,
            token.expires_in,
        ))
    }
}

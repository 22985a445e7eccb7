//! # Enrichment Merge
//!
//! Best-effort augmentation of a primary source result with Spotify
//! preview metadata. Primary data wins: secondary values only fill gaps,
//! with the single exception of cover art, which is opportunistically
//! upgraded. A failure here never aborts ingestion and never changes the
//! result's `source` tag.

use crate::providers::spotify::{SpotifyAlbum, SpotifyTrack};
use crate::providers::SpotifyClient;
use crate::types::{SearchQuery, SoundtrackMetadata, TrackInfo};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SpotifyEnrichment {
    client: Arc<SpotifyClient>,
}

impl SpotifyEnrichment {
    pub fn new(client: Arc<SpotifyClient>) -> Self {
        Self { client }
    }

    /// Attempt the merge; failures are logged at warning level and
    /// swallowed so the primary result persists unenriched.
    pub async fn enrich(
        &self,
        query: &SearchQuery,
        metadata: &mut SoundtrackMetadata,
        tracks: &mut [TrackInfo],
    ) {
        match self.try_enrich(query, metadata, tracks).await {
            Ok(matched) => {
                debug!(matched_tracks = matched, "enrichment finished");
            }
            Err(e) => {
                warn!(error = %e, "enrichment failed, continuing with primary data");
            }
        }
    }

    async fn try_enrich(
        &self,
        query: &SearchQuery,
        metadata: &mut SoundtrackMetadata,
        tracks: &mut [TrackInfo],
    ) -> Result<usize, crate::error::ProviderError> {
        let album = match self.client.search_album(&query.title, query.year).await? {
            Some(album) => album,
            None => {
                debug!(title = %query.title, "no Spotify album candidate");
                return Ok(0);
            }
        };

        merge_album(metadata, &album);

        let spotify_tracks = self.client.album_tracks(&album.id).await?;
        Ok(merge_tracks(tracks, &spotify_tracks))
    }
}

/// Attach the album id and merge album-level fields. Cover art is the one
/// field a present primary value does not protect.
fn merge_album(metadata: &mut SoundtrackMetadata, album: &SpotifyAlbum) {
    metadata.spotify_album_id = Some(album.id.clone());

    if let Some(url) = album.best_image_url() {
        metadata.cover_art_url = Some(url.to_string());
    }
    if metadata.release_date.is_none() {
        metadata.release_date = album.release_date.clone();
    }
}

/// Match primary tracks against the Spotify listing by exact,
/// case-insensitive title equality; the first match wins. No fuzzy
/// matching, no duration or artist cross-checks.
fn merge_tracks(tracks: &mut [TrackInfo], spotify_tracks: &[SpotifyTrack]) -> usize {
    let mut matched = 0;
    for track in tracks.iter_mut() {
        let wanted = track.title.to_lowercase();
        if let Some(hit) = spotify_tracks
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
        {
            track.spotify_track_id = Some(hit.id.clone());
            track.preview_url = hit.preview_url.clone();
            track.spotify_uri = Some(hit.uri());
            matched += 1;
        }
    }
    matched
}

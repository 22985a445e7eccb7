//! Domain models for the soundtrack catalog.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted film soundtrack.
///
/// `source` names the provider that supplied the metadata and track listing.
/// Enrichment may attach `spotify_album_id` and upgrade `cover_art_url`, but
/// it never changes `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Soundtrack {
    /// Unique identifier
    pub id: String,
    /// Owning film (one soundtrack per film)
    pub film_id: String,
    /// Album title
    pub title: String,
    /// Release date as provided, possibly partial ("1999", "1999-05")
    pub release_date: Option<String>,
    /// Record label
    pub label: Option<String>,
    /// Album classification tag
    pub album_type: String,
    /// Primary provider's identifier for this album
    pub external_id: Option<String>,
    /// Primary provider's page URL
    pub url: Option<String>,
    /// Secondary provider's album id, set only when enrichment matched
    pub spotify_album_id: Option<String>,
    /// Cover art URL
    pub cover_art_url: Option<String>,
    /// Provider-declared track count
    pub total_tracks: Option<i64>,
    /// Name of the provider that produced the metadata and track listing
    pub source: String,
    /// Timestamps (unix seconds)
    pub created_at: i64,
    pub updated_at: i64,
}

impl Soundtrack {
    pub fn new(film_id: String, title: String, source: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            film_id,
            title,
            release_date: None,
            label: None,
            album_type: "soundtrack".to_string(),
            external_id: None,
            url: None,
            spotify_album_id: None,
            cover_art_url: None,
            total_tracks: None,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.film_id.trim().is_empty() {
            return Err("Soundtrack film_id cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Soundtrack title cannot be empty".to_string());
        }
        if self.source.trim().is_empty() {
            return Err("Soundtrack source cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A single track of a persisted soundtrack.
///
/// Rows are written in provider-native order; readers sort by
/// `(disc_number, track_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SoundtrackTrack {
    /// Unique identifier
    pub id: String,
    /// Owning soundtrack
    pub soundtrack_id: String,
    /// 1-based position within the disc
    pub track_number: i64,
    /// 1-based disc number
    pub disc_number: i64,
    /// Track title
    pub title: String,
    /// Credited artist
    pub artist: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: Option<i64>,
    /// Primary provider's recording id
    pub recording_id: Option<String>,
    /// Secondary provider fields, present only when enrichment matched
    pub spotify_track_id: Option<String>,
    pub preview_url: Option<String>,
    pub spotify_uri: Option<String>,
    /// Timestamp (unix seconds)
    pub created_at: i64,
}

impl SoundtrackTrack {
    pub fn new(soundtrack_id: String, track_number: i64, disc_number: i64, title: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            soundtrack_id,
            track_number,
            disc_number,
            title,
            artist: None,
            duration_ms: None,
            recording_id: None,
            spotify_track_id: None,
            preview_url: None,
            spotify_uri: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Track title cannot be empty".to_string());
        }
        if self.track_number < 1 {
            return Err("Track number must be 1-based".to_string());
        }
        if self.disc_number < 1 {
            return Err("Disc number must be 1-based".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soundtrack_defaults() {
        let st = Soundtrack::new(
            "film-1".to_string(),
            "Example Film".to_string(),
            "imdb".to_string(),
        );
        assert_eq!(st.album_type, "soundtrack");
        assert!(st.spotify_album_id.is_none());
        assert!(st.validate().is_ok());
    }

    #[test]
    fn soundtrack_rejects_blank_film_id() {
        let st = Soundtrack::new(" ".to_string(), "T".to_string(), "imdb".to_string());
        assert!(st.validate().is_err());
    }

    #[test]
    fn track_positions_are_one_based() {
        let track = SoundtrackTrack::new("st-1".to_string(), 0, 1, "Main Theme".to_string());
        assert!(track.validate().is_err());

        let track = SoundtrackTrack::new("st-1".to_string(), 1, 1, "Main Theme".to_string());
        assert!(track.validate().is_ok());
    }
}

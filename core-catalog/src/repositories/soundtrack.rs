//! Soundtrack repository trait and SQLite implementation.

use crate::error::{CatalogError, Result};
use crate::models::{Soundtrack, SoundtrackTrack};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::debug;

/// Data access for soundtracks and their tracks.
///
/// Soundtrack and track rows are created together, atomically; the pipeline
/// never updates them afterwards. `delete` is the only mutation of existing
/// data and cascades to the track rows.
#[async_trait]
pub trait SoundtrackRepository: Send + Sync {
    /// Find a soundtrack by its id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Soundtrack>>;

    /// Find the soundtrack for a film, if one was already ingested.
    ///
    /// This is the pipeline's idempotency read.
    async fn find_by_film_id(&self, film_id: &str) -> Result<Option<Soundtrack>>;

    /// Insert a soundtrack and all of its tracks in one transaction.
    ///
    /// # Errors
    /// Returns error if:
    /// - A soundtrack already exists for the same film (UNIQUE film_id)
    /// - Validation fails for the parent or any track
    /// - Any statement fails (the whole set is rolled back)
    async fn insert_with_tracks(
        &self,
        soundtrack: &Soundtrack,
        tracks: &[SoundtrackTrack],
    ) -> Result<()>;

    /// All tracks of a soundtrack, ordered by `(disc_number, track_number)`.
    async fn tracks_for(&self, soundtrack_id: &str) -> Result<Vec<SoundtrackTrack>>;

    /// Delete a soundtrack; track rows cascade.
    ///
    /// # Returns
    /// - `Ok(true)` if a soundtrack was deleted
    /// - `Ok(false)` if no soundtrack had that id
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count persisted soundtracks.
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of `SoundtrackRepository`.
pub struct SqliteSoundtrackRepository {
    pool: SqlitePool,
}

impl SqliteSoundtrackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SoundtrackRepository for SqliteSoundtrackRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Soundtrack>> {
        let soundtrack = query_as::<_, Soundtrack>("SELECT * FROM soundtracks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(soundtrack)
    }

    async fn find_by_film_id(&self, film_id: &str) -> Result<Option<Soundtrack>> {
        let soundtrack = query_as::<_, Soundtrack>("SELECT * FROM soundtracks WHERE film_id = ?")
            .bind(film_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(soundtrack)
    }

    async fn insert_with_tracks(
        &self,
        soundtrack: &Soundtrack,
        tracks: &[SoundtrackTrack],
    ) -> Result<()> {
        soundtrack.validate().map_err(|e| CatalogError::InvalidInput {
            field: "Soundtrack".to_string(),
            message: e,
        })?;
        for track in tracks {
            track.validate().map_err(|e| CatalogError::InvalidInput {
                field: "SoundtrackTrack".to_string(),
                message: e,
            })?;
        }

        let mut tx = self.pool.begin().await?;

        query(
            r#"
            INSERT INTO soundtracks (
                id, film_id, title, release_date, label, album_type,
                external_id, url, spotify_album_id, cover_art_url,
                total_tracks, source, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&soundtrack.id)
        .bind(&soundtrack.film_id)
        .bind(&soundtrack.title)
        .bind(&soundtrack.release_date)
        .bind(&soundtrack.label)
        .bind(&soundtrack.album_type)
        .bind(&soundtrack.external_id)
        .bind(&soundtrack.url)
        .bind(&soundtrack.spotify_album_id)
        .bind(&soundtrack.cover_art_url)
        .bind(soundtrack.total_tracks)
        .bind(&soundtrack.source)
        .bind(soundtrack.created_at)
        .bind(soundtrack.updated_at)
        .execute(&mut *tx)
        .await?;

        for track in tracks {
            query(
                r#"
                INSERT INTO soundtrack_tracks (
                    id, soundtrack_id, track_number, disc_number, title,
                    artist, duration_ms, recording_id, spotify_track_id,
                    preview_url, spotify_uri, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&track.id)
            .bind(&track.soundtrack_id)
            .bind(track.track_number)
            .bind(track.disc_number)
            .bind(&track.title)
            .bind(&track.artist)
            .bind(track.duration_ms)
            .bind(&track.recording_id)
            .bind(&track.spotify_track_id)
            .bind(&track.preview_url)
            .bind(&track.spotify_uri)
            .bind(track.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            soundtrack_id = %soundtrack.id,
            film_id = %soundtrack.film_id,
            tracks = tracks.len(),
            "soundtrack persisted"
        );

        Ok(())
    }

    async fn tracks_for(&self, soundtrack_id: &str) -> Result<Vec<SoundtrackTrack>> {
        let tracks = query_as::<_, SoundtrackTrack>(
            "SELECT * FROM soundtrack_tracks WHERE soundtrack_id = ? \
             ORDER BY disc_number ASC, track_number ASC",
        )
        .bind(soundtrack_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = query("DELETE FROM soundtracks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM soundtracks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

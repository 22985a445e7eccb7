//! MusicBrainz structured-API source adapter.

use crate::providers::MusicBrainzClient;
use crate::sources::SoundtrackSource;
use crate::types::{SearchQuery, SoundtrackMetadata, SourceResult, TrackInfo};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SOURCE_NAME: &str = "musicbrainz";

/// Structured-API source. Registered last in the default sweep order, which
/// makes it the fallback when scraping finds nothing.
pub struct MusicBrainzSource {
    client: Arc<MusicBrainzClient>,
    priority: u32,
}

impl MusicBrainzSource {
    pub fn new(client: Arc<MusicBrainzClient>, priority: u32) -> Self {
        Self { client, priority }
    }
}

#[async_trait]
impl SoundtrackSource for MusicBrainzSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    async fn search(&self, query: &SearchQuery) -> Option<SourceResult> {
        let hit = match self.client.search_release(&query.title, query.year).await {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                debug!(title = %query.title, "no MusicBrainz release found");
                return None;
            }
            Err(e) => {
                warn!(title = %query.title, error = %e, "MusicBrainz search failed");
                return None;
            }
        };

        let release = match self.client.lookup_release(&hit.id).await {
            Ok(release) => release,
            Err(e) => {
                warn!(release_id = %hit.id, error = %e, "MusicBrainz release lookup failed");
                return None;
            }
        };

        let mut tracks = Vec::new();
        for (media_index, media) in release.media.iter().enumerate() {
            let disc_number = media.position.unwrap_or((media_index + 1) as i64);
            for (track_index, track) in media.tracks.iter().enumerate() {
                let Some(title) = track.title.clone() else {
                    continue;
                };
                let mut info = TrackInfo::new(
                    title,
                    track.position.unwrap_or((track_index + 1) as i64),
                    disc_number,
                );
                info.artist = track.artist_name();
                info.duration_ms = track
                    .length
                    .or_else(|| track.recording.as_ref().and_then(|r| r.length));
                info.recording_id = track.recording.as_ref().map(|r| r.id.clone());
                tracks.push(info);
            }
        }
        if tracks.is_empty() {
            debug!(release_id = %release.id, "MusicBrainz release has no tracks");
            return None;
        }

        let mut metadata = SoundtrackMetadata::new(release.title.clone(), SOURCE_NAME);
        metadata.release_date = release.date.clone();
        metadata.label = release.label_name();
        metadata.total_tracks = hit.track_count.or(Some(release.track_count()));
        metadata.cover_art_url = Some(self.client.cover_art_url(&release.id));
        metadata.url = Some(self.client.release_page_url(&release.id));
        metadata.external_id = Some(release.id);

        Some(SourceResult { metadata, tracks })
    }
}

//! IMDb scraping source adapter.

use crate::providers::ImdbClient;
use crate::sources::SoundtrackSource;
use crate::types::{SearchQuery, SoundtrackMetadata, SourceResult, TrackInfo};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SOURCE_NAME: &str = "imdb";

/// Scraping source. Always available; the page carries titles only, so
/// tracks get sequential numbers from 1 on disc 1 and no durations.
pub struct ImdbSource {
    client: Arc<ImdbClient>,
    priority: u32,
}

impl ImdbSource {
    pub fn new(client: Arc<ImdbClient>, priority: u32) -> Self {
        Self { client, priority }
    }
}

#[async_trait]
impl SoundtrackSource for ImdbSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    async fn search(&self, query: &SearchQuery) -> Option<SourceResult> {
        // A known external id skips the title search entirely.
        let title_id = match &query.external_id {
            Some(id) => id.clone(),
            None => match self.client.find_title(&query.title, query.year).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    debug!(title = %query.title, "no IMDb title found");
                    return None;
                }
                Err(e) => {
                    warn!(title = %query.title, error = %e, "IMDb title search failed");
                    return None;
                }
            },
        };

        let titles = match self.client.soundtrack_titles(&title_id).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!(%title_id, error = %e, "IMDb soundtrack page fetch failed");
                return None;
            }
        };
        if titles.is_empty() {
            debug!(%title_id, "IMDb soundtrack page listed no tracks");
            return None;
        }

        let tracks = titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| TrackInfo::new(title, (i + 1) as i64, 1))
            .collect();

        let mut metadata = SoundtrackMetadata::new(query.title.clone(), SOURCE_NAME);
        metadata.url = Some(self.client.soundtrack_page_url(&title_id));
        metadata.external_id = Some(title_id);

        Some(SourceResult { metadata, tracks })
    }
}

//! # Source Adapters
//!
//! Uniform search capability over one provider each. The coordinator only
//! ever sees this trait: provider failures (network errors, parse failures,
//! zero results) are logged inside the adapter and folded into `None`.

pub mod imdb;
pub mod musicbrainz;

pub use imdb::ImdbSource;
pub use musicbrainz::MusicBrainzSource;

use crate::types::{SearchQuery, SourceResult};
use async_trait::async_trait;

/// A provider wrapped behind the common soundtrack-lookup contract.
#[async_trait]
pub trait SoundtrackSource: Send + Sync {
    /// Stable provider name, recorded as the persisted `source` tag.
    fn name(&self) -> &'static str;

    /// Sweep order; lower values are tried earlier.
    fn priority(&self) -> u32;

    /// Whether this source is usable (e.g. credentials configured).
    /// Scraping-only sources are always available.
    fn is_available(&self) -> bool {
        true
    }

    /// Look up album metadata and a track listing for a film.
    ///
    /// `None` covers both "provider has nothing" and "provider failed";
    /// the distinction is only logged.
    async fn search(&self, query: &SearchQuery) -> Option<SourceResult>;
}

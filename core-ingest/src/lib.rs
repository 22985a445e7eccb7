//! # Soundtrack Ingestion Pipeline
//!
//! Ingests album and track-listing metadata for films from multiple
//! independent, unreliable, rate-limited providers and persists one
//! normalized soundtrack per film.
//!
//! ## Overview
//!
//! - [`sources`]: the polymorphic [`sources::SoundtrackSource`] capability
//!   and its implementations (IMDb scraping, MusicBrainz structured API)
//! - [`providers`]: rate-limited provider clients owning pacing and
//!   authentication state
//! - [`enrichment`]: best-effort Spotify preview-metadata merge
//! - [`service`]: the [`service::IngestService`] coordinator performing the
//!   idempotency check, priority sweep, enrichment and persistence

pub mod config;
pub mod enrichment;
pub mod error;
pub mod providers;
pub mod service;
pub mod sources;
pub mod types;

pub use config::IngestConfig;
pub use error::{IngestError, ProviderError, Result};
pub use service::{IngestRequest, IngestService};
pub use types::{SearchQuery, SoundtrackMetadata, SourceResult, TrackInfo};

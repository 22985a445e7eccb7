//! # Repository Pattern Implementation
//!
//! Trait-based data access over `sqlx::SqlitePool`. The trait seam lets the
//! ingestion coordinator be tested against mocked storage.

pub mod soundtrack;

pub use soundtrack::{SoundtrackRepository, SqliteSoundtrackRepository};

use thiserror::Error;

/// Failure inside a provider client.
///
/// These never cross the coordinator boundary: source adapters fold them
/// into a "no result" outcome and log the cause.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] core_http::HttpError),

    #[error("Provider API error: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Rate limited after retry (retry-after {retry_after_seconds}s)")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Response parse failed: {0}")]
    Parse(String),
}

/// Failure of an ingestion invocation as seen by the caller.
///
/// Provider trouble is not represented here; a pipeline that finds nothing
/// reports `Ok(None)`, not an error.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;

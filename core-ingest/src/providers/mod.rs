//! # Provider Clients
//!
//! One client per external data provider. Each owns its own pacing and
//! authentication state; all network I/O goes through the
//! `core_http::HttpClient` seam.

pub mod imdb;
pub mod musicbrainz;
pub mod rate_limit;
pub mod spotify;

pub use imdb::ImdbClient;
pub use musicbrainz::MusicBrainzClient;
pub use rate_limit::RateLimiter;
pub use spotify::SpotifyClient;

use crate::error::ProviderError;
use core_http::{HttpClient, HttpRequest, HttpResponse};
use std::time::Duration;
use tracing::warn;

/// Fallback delay when a 429 carries no usable Retry-After header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Execute a request, retrying exactly once after the provider-declared
/// delay when the first attempt is rejected with 429.
///
/// A second rejection is surfaced as [`ProviderError::RateLimited`]; there
/// is no backoff schedule beyond the single retry.
pub(crate) async fn execute_retrying_once_on_429(
    http_client: &dyn HttpClient,
    request: HttpRequest,
) -> Result<HttpResponse, ProviderError> {
    let retry_request = request.clone();
    let response = http_client.execute(request).await?;
    if response.status != 429 {
        return Ok(response);
    }

    let retry_after_seconds = response
        .header("Retry-After")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

    warn!(
        url = %retry_request.url,
        retry_after_seconds,
        "rate limited, retrying once after provider-declared delay"
    );
    tokio::time::sleep(Duration::from_secs(retry_after_seconds)).await;

    let response = http_client.execute(retry_request).await?;
    if response.status == 429 {
        return Err(ProviderError::RateLimited {
            retry_after_seconds,
        });
    }
    Ok(response)
}

//! Request pacing shared by provider clients.

use std::time::{Duration, Instant};
use tracing::debug;

/// Enforces a minimum delay between consecutive requests to one provider.
///
/// One instance per provider client, guarded by a `Mutex`; callers lock,
/// await [`wait_if_needed`](Self::wait_if_needed), then issue the request.
/// Sharing a client across tasks serializes its pacing window rather than
/// corrupting it, but per-worker client instances remain the supported
/// concurrency mode.
pub struct RateLimiter {
    last_request: Option<Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    pub fn new(min_delay_ms: u64) -> Self {
        Self {
            last_request: None,
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Sleep for the remainder of the mandatory interval, then stamp the
    /// clock for the next caller.
    pub async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                debug!("rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

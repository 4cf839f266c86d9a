//! Proactive client-side pacing.
//!
//! The server-driven backoff in [`crate::client`] reacts to rate-limit
//! responses; this limiter avoids most of them in the first place by
//! spacing requests out before they are sent.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default request rates (requests per second).
pub mod rate_limits {
    /// Management API: 10 requests/second per space, 7 leaves headroom.
    pub const CMA_DEFAULT_RPS: u32 = 7;
    /// Delivery API: 55 requests/second for uncached requests.
    pub const CDA_DEFAULT_RPS: u32 = 50;
}

/// A shared request-rate limiter.
///
/// Cloning shares the underlying quota, so every clone of a client draws
/// from the same budget.
///
/// # Example
///
/// ```ignore
/// use contentful::rate_limit::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(7);
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
    requests_per_second: u32,
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl ApiRateLimiter {
    /// Create a limiter; a rate of 0 is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
            requests_per_second: rps.get(),
        }
    }

    #[must_use]
    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    /// Wait (asynchronously) until another request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. Free API tiers
//! allow a handful of calls per minute, so quotas are expressed per period
//! rather than per second.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Requests allowed per period
    pub requests: u32,
    /// Length of the period
    pub period: Duration,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests: u32, period: Duration, burst_size: u32) -> Self {
        Self {
            requests,
            period,
            burst_size,
        }
    }

    /// `requests` per minute, no burst beyond one
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60), 1)
    }

    /// `requests` per second with an equal burst
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1), requests)
    }

    fn quota(&self) -> Quota {
        let requests = self.requests.max(1);
        let interval = self.period / requests;
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst)
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_presets() {
        let minute = RateLimiterConfig::per_minute(5);
        assert_eq!(minute.requests, 5);
        assert_eq!(minute.period, Duration::from_secs(60));
        assert_eq!(minute.burst_size, 1);

        let second = RateLimiterConfig::per_second(20);
        assert_eq!(second.burst_size, 20);
    }

    #[test]
    fn test_quota_interval() {
        let quota = RateLimiterConfig::per_minute(5).quota();
        assert_eq!(quota.replenish_interval(), Duration::from_secs(12));
        assert_eq!(quota.burst_size().get(), 1);
    }

    #[test]
    fn test_zero_requests_does_not_panic() {
        let quota = RateLimiterConfig::new(0, Duration::from_secs(1), 0).quota();
        assert_eq!(quota.burst_size().get(), 1);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst() {
        let limiter = RateLimiter::new(&RateLimiterConfig::per_second(5));

        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait() {
        let limiter = RateLimiter::new(&RateLimiterConfig::per_second(100));
        limiter.wait().await;
    }
}

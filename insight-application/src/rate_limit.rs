use std::sync::Arc;

use tracing::debug;

use crate::CacheLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { count: i64 },
    Limited { count: i64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Fixed-window counter on the remote cache tier.
/// Fails open when the remote tier cannot count.
pub struct RateLimiter {
    cache: Arc<CacheLayer>,
}

impl RateLimiter {
    pub fn new(cache: Arc<CacheLayer>) -> Self {
        Self { cache }
    }

    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        limit: u64,
        window_seconds: u64,
    ) -> RateDecision {
        let key = format!("rate_limit:{}", identifier);
        let count = self.cache.incr(&key).await;
        if count == 1 {
            self.cache.expire(&key, window_seconds).await;
        }
        if count <= limit as i64 {
            RateDecision::Allowed { count }
        } else {
            debug!(identifier, count, "rate limit exceeded");
            RateDecision::Limited { count }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MemoryRemoteCache, START_MILLIS};

    fn limiter() -> (RateLimiter, Arc<MemoryRemoteCache>, Arc<ManualClock>) {
        let clock = ManualClock::new(START_MILLIS);
        let remote = MemoryRemoteCache::new(clock.clone());
        let cache = Arc::new(CacheLayer::new(Some(remote.clone()), clock.clone()));
        (RateLimiter::new(cache), remote, clock)
    }

    #[tokio::test]
    async fn allows_up_to_limit_then_refuses_until_window_passes() {
        let (limiter, _remote, clock) = limiter();
        for expected in 1..=10 {
            assert_eq!(
                limiter.check_rate_limit("analyze:1.2.3.4", 10, 60).await,
                RateDecision::Allowed { count: expected }
            );
        }
        assert_eq!(
            limiter.check_rate_limit("analyze:1.2.3.4", 10, 60).await,
            RateDecision::Limited { count: 11 }
        );

        clock.advance_secs(60);
        assert_eq!(
            limiter.check_rate_limit("analyze:1.2.3.4", 10, 60).await,
            RateDecision::Allowed { count: 1 }
        );
    }

    #[tokio::test]
    async fn identifiers_are_counted_separately() {
        let (limiter, _remote, _clock) = limiter();
        assert!(limiter.check_rate_limit("a", 1, 60).await.is_allowed());
        assert!(limiter.check_rate_limit("b", 1, 60).await.is_allowed());
        assert!(!limiter.check_rate_limit("a", 1, 60).await.is_allowed());
    }

    #[tokio::test]
    async fn unavailable_remote_fails_open() {
        let (limiter, remote, _clock) = limiter();
        remote.set_failing(true);
        for _ in 0..20 {
            assert_eq!(
                limiter.check_rate_limit("x", 1, 60).await,
                RateDecision::Allowed { count: 0 }
            );
        }
    }
}

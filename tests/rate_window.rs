//! Sliding-window guarantees through the public limiter API.

use pulse_service::config::RateLimitConfig;
use pulse_service::ratelimit::{Clock, MemoryRateLimiter, RateLimiter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

struct ManualClock(AtomicI64);

impl ManualClock {
    fn new(start: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(start)))
    }

    fn advance_secs(&self, secs: i64) {
        self.0.fetch_add(secs * 1_000, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn limiter(max_actions: u32, window_seconds: u64, clock: Arc<ManualClock>) -> MemoryRateLimiter {
    MemoryRateLimiter::new(
        &RateLimitConfig {
            max_actions,
            window_seconds,
        },
        clock,
    )
}

#[tokio::test]
async fn the_nth_plus_one_action_within_the_window_is_denied() {
    let clock = ManualClock::new(0);
    let limiter = limiter(15, 60, clock.clone());

    for _ in 0..15 {
        assert!(limiter.allow("actor").await.unwrap());
    }
    assert!(!limiter.allow("actor").await.unwrap());
}

#[tokio::test]
async fn the_window_resets_once_the_duration_elapses() {
    let clock = ManualClock::new(0);
    let limiter = limiter(2, 60, clock.clone());

    assert!(limiter.allow("actor").await.unwrap());
    assert!(limiter.allow("actor").await.unwrap());
    assert!(!limiter.allow("actor").await.unwrap());

    clock.advance_secs(61);
    assert!(limiter.allow("actor").await.unwrap());
}

#[tokio::test]
async fn concurrent_over_limit_calls_cannot_both_pass() {
    let clock = ManualClock::new(0);
    let limiter = Arc::new(limiter(1, 60, clock.clone()));

    let a = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.allow("actor").await.unwrap() })
    };
    let b = {
        let limiter = limiter.clone();
        tokio::spawn(async move { limiter.allow("actor").await.unwrap() })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a ^ b, "exactly one of two racing calls may pass");
}

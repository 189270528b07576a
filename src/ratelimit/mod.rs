/// Sliding-window rate limiting
///
/// Every mutating procedure calls `allow(actor)` before its first effectful
/// statement. Counters live in Redis so the window holds fleet-wide when
/// the service runs more than one instance; the check-and-record step runs
/// as a single Lua script, so two simultaneous calls that would both exceed
/// the limit cannot both pass.
///
/// The clock is injected. `MemoryRateLimiter` pairs with a manual clock for
/// deterministic tests and doubles as the counter store for single-instance
/// deployments without Redis.
use crate::config::RateLimitConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Millisecond clock, injectable for deterministic tests
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Gate for mutating operations, keyed by actor id
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Returns true when the action is within the actor's window. A true
    /// result has already recorded the action.
    async fn allow(&self, key: &str) -> Result<bool>;
}

/// Prune expired entries, count, and conditionally record - atomically.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local max = tonumber(ARGV[3])
local member = ARGV[4]
redis.call('ZREMRANGEBYSCORE', key, 0, now - window)
if redis.call('ZCARD', key) < max then
    redis.call('ZADD', key, now, member)
    redis.call('PEXPIRE', key, window)
    return 1
end
return 0
"#;

/// Redis-backed sliding window, shared across all service instances
pub struct RedisRateLimiter {
    redis: ConnectionManager,
    script: redis::Script,
    max_actions: u32,
    window_ms: i64,
    clock: Arc<dyn Clock>,
}

impl RedisRateLimiter {
    pub fn new(redis: ConnectionManager, config: &RateLimitConfig) -> Self {
        Self::with_clock(redis, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        redis: ConnectionManager,
        config: &RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            redis,
            script: redis::Script::new(SLIDING_WINDOW_SCRIPT),
            max_actions: config.max_actions,
            window_ms: config.window_seconds as i64 * 1_000,
            clock,
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, key: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let allowed: i32 = self
            .script
            .key(format!("ratelimit:{}", key))
            .arg(self.clock.now_ms())
            .arg(self.window_ms)
            .arg(self.max_actions)
            .arg(Uuid::new_v4().to_string())
            .invoke_async(&mut conn)
            .await?;

        Ok(allowed == 1)
    }
}

/// In-process sliding window over a mutex-guarded map.
///
/// The lock spans prune, count, and record, so concurrent callers observe
/// the same all-or-nothing semantics as the Redis script.
pub struct MemoryRateLimiter {
    max_actions: usize,
    window_ms: i64,
    clock: Arc<dyn Clock>,
    hits: Mutex<HashMap<String, Vec<i64>>>,
}

impl MemoryRateLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_actions: config.max_actions as usize,
            window_ms: config.window_seconds as i64 * 1_000,
            clock,
            hits: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn allow(&self, key: &str) -> Result<bool> {
        let now = self.clock.now_ms();
        let mut hits = self.hits.lock().expect("rate limiter lock poisoned");
        let window = hits.entry(key.to_string()).or_default();
        window.retain(|t| *t > now - self.window_ms);

        if window.len() < self.max_actions {
            window.push(now);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn new(start: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(start)))
        }

        fn advance(&self, ms: i64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn config(max_actions: u32, window_seconds: u64) -> RateLimitConfig {
        RateLimitConfig {
            max_actions,
            window_seconds,
        }
    }

    #[tokio::test]
    async fn denies_the_call_after_the_limit() {
        let clock = ManualClock::new(1_000);
        let limiter = MemoryRateLimiter::new(&config(3, 60), clock.clone());

        for _ in 0..3 {
            assert!(limiter.allow("actor-a").await.unwrap());
        }
        assert!(!limiter.allow("actor-a").await.unwrap());
    }

    #[tokio::test]
    async fn window_slides_rather_than_resetting_in_buckets() {
        let clock = ManualClock::new(0);
        let limiter = MemoryRateLimiter::new(&config(2, 60), clock.clone());

        assert!(limiter.allow("a").await.unwrap());
        clock.advance(30_000);
        assert!(limiter.allow("a").await.unwrap());
        assert!(!limiter.allow("a").await.unwrap());

        // 31s later the first action has left the trailing window, the
        // second has not.
        clock.advance(31_000);
        assert!(limiter.allow("a").await.unwrap());
        assert!(!limiter.allow("a").await.unwrap());
    }

    #[tokio::test]
    async fn allows_again_after_the_window_elapses() {
        let clock = ManualClock::new(0);
        let limiter = MemoryRateLimiter::new(&config(1, 60), clock.clone());

        assert!(limiter.allow("a").await.unwrap());
        assert!(!limiter.allow("a").await.unwrap());

        clock.advance(60_001);
        assert!(limiter.allow("a").await.unwrap());
    }

    #[tokio::test]
    async fn actors_do_not_share_windows() {
        let clock = ManualClock::new(0);
        let limiter = MemoryRateLimiter::new(&config(1, 60), clock.clone());

        assert!(limiter.allow("a").await.unwrap());
        assert!(limiter.allow("b").await.unwrap());
        assert!(!limiter.allow("a").await.unwrap());
    }
}

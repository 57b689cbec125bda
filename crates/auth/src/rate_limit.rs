//! Per-identifier sliding-window attempt limiter.

use chrono::{DateTime, Duration, Utc};
use gate_core::clock::SharedClock;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Maximum attempts per identifier within one window.
pub const MAX_ATTEMPTS: u32 = 5;

/// Window length in milliseconds.
pub const TIME_WINDOW_MS: i64 = 60_000;

struct AttemptEntry {
    count: u32,
    first_attempt: DateTime<Utc>,
    last_attempt: DateTime<Utc>,
}

/// Sliding-window rate limiter keyed by identifier string.
///
/// Every validation attempt counts toward the limit, successful or not.
/// The map is mutex-guarded so a multi-threaded caller stays correct.
pub struct RateLimiter {
    attempts: Mutex<HashMap<String, AttemptEntry>>,
    max_attempts: u32,
    window: Duration,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_limits(MAX_ATTEMPTS, Duration::milliseconds(TIME_WINDOW_MS), clock)
    }

    pub fn with_limits(max_attempts: u32, window: Duration, clock: SharedClock) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            max_attempts,
            window,
            clock,
        }
    }

    /// Whether the identifier has exhausted its attempts for the current
    /// window.
    ///
    /// Expired entries are evicted before the check, and an entry exactly at
    /// the window boundary counts as expired, so a request one full window
    /// after the first attempt is never blocked.
    pub fn is_limited(&self, identifier: &str) -> bool {
        let now = self.clock.now();
        let mut attempts = self.attempts.lock();
        Self::cleanup(&mut attempts, now - self.window);

        attempts
            .get(identifier)
            .is_some_and(|entry| entry.count >= self.max_attempts)
    }

    /// Counts one attempt for the identifier.
    pub fn record_attempt(&self, identifier: &str) {
        let now = self.clock.now();
        let mut attempts = self.attempts.lock();
        attempts
            .entry(identifier.to_string())
            .and_modify(|entry| {
                entry.count += 1;
                entry.last_attempt = now;
            })
            .or_insert(AttemptEntry {
                count: 1,
                first_attempt: now,
                last_attempt: now,
            });
    }

    fn cleanup(attempts: &mut HashMap<String, AttemptEntry>, expire_before: DateTime<Utc>) {
        attempts.retain(|_, entry| entry.first_attempt > expire_before);
    }
}

//! Backoff and window-counting primitives `ServiceRateLimiter` composes:
//! exponential cooldown after a 429, plus a sliding window for the
//! per-minute ceiling `ServiceRateLimiter::acquire` enforces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Exponential backoff with jitter, reset on the next successful call.
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_delay: Duration,
    jitter: f64,
    attempt: AtomicU64,
}

impl ExponentialBackoff {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self { base_delay, max_delay, jitter: 0.1, attempt: AtomicU64::new(0) }
    }

    /// Delay for the given 429 streak length, capped at `max_delay` and
    /// widened by up to `jitter` so concurrent callers don't retry in lockstep.
    pub fn calculate_delay(&self, attempt: u64) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt.min(10) as u32);
        let delay_ms = (self.base_delay.as_millis() as u64 * multiplier).min(self.max_delay.as_millis() as u64);
        let jitter_ms = (delay_ms as f64 * self.jitter) as u64;
        Duration::from_millis(delay_ms + jitter_nanos() % jitter_ms.max(1))
    }

    pub fn reset(&self) {
        self.attempt.store(0, Ordering::SeqCst);
    }
}

/// Jitter source with no RNG dependency: low bits of the wall clock are
/// uncorrelated enough across concurrent callers for retry spreading.
fn jitter_nanos() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0)
}

/// Counts calls within a trailing window, pruning expired entries lazily
/// on each `count`/`record` rather than on a timer.
pub struct SlidingWindowTracker {
    window_size: Duration,
    timestamps: std::sync::Mutex<Vec<Instant>>,
    capacity: usize,
}

impl SlidingWindowTracker {
    pub fn new(window_size: Duration, capacity: usize) -> Self {
        Self { window_size, timestamps: std::sync::Mutex::new(Vec::with_capacity(capacity)), capacity }
    }

    pub fn record(&self) {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock().unwrap();
        let cutoff = now - self.window_size;
        timestamps.retain(|t| *t > cutoff);
        if timestamps.len() < self.capacity {
            timestamps.push(now);
        }
    }

    pub fn count(&self) -> usize {
        let now = Instant::now();
        let cutoff = now - self.window_size;
        self.timestamps.lock().unwrap().iter().filter(|t| **t > cutoff).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_delay_grows_and_caps() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
        assert!(backoff.calculate_delay(0).as_millis() >= 100);
        assert!(backoff.calculate_delay(20).as_millis() <= 1100);
    }

    #[test]
    fn window_tracker_prunes_expired_entries() {
        let tracker = SlidingWindowTracker::new(Duration::from_millis(20), 10);
        tracker.record();
        assert_eq!(tracker.count(), 1);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn window_tracker_respects_capacity() {
        let tracker = SlidingWindowTracker::new(Duration::from_secs(60), 2);
        tracker.record();
        tracker.record();
        tracker.record();
        assert_eq!(tracker.count(), 2);
    }
}

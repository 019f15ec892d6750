//! Fixed window accounting over the entry store

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::clock::SharedClock;
use crate::counter::Counter;
use crate::manager::Manager;
use crate::storage::{BoxError, Storage};

/// Outcome of one request's accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Configured ceiling for the window
    pub limit: u32,

    /// Hits left in the window; negative once the ceiling is breached
    pub remaining: i64,

    /// Seconds until the window resets
    pub reset_secs: u64,
}

impl Quota {
    /// `true` once the window's ceiling has been breached.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.remaining < 0
    }
}

/// Fixed window rate limiter.
///
/// Tracks request counts per string key; each key gets `max_requests`
/// per fixed window of `window` length, with the window (re)opened
/// lazily on the first request that arrives after the previous one
/// elapsed.
///
/// A single coarse lock serializes the fetch-mutate-persist sequence
/// for all keys. That keeps per-key accounting exact at the cost of a
/// throughput ceiling under extreme key cardinality; sharding the lock
/// by key hash would preserve the per-key guarantee if that ceiling is
/// ever hit.
///
/// The limiter owns its [`SharedClock`]: dropping the limiter stops the
/// clock's refresher task.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    clock: SharedClock,
    manager: Manager,
    lock: Mutex<()>,
    max_requests: u32,
    window: Duration,
    window_secs: u64,
    fail_open: bool,
}

impl FixedWindowLimiter {
    /// Creates a limiter over the in-process store with a live clock.
    ///
    /// Must be called within a tokio runtime (see [`SharedClock::start`]).
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, SharedClock::start())
    }

    /// Creates a limiter driven by the given clock.
    pub fn with_clock(max_requests: u32, window: Duration, clock: SharedClock) -> Self {
        Self {
            clock,
            manager: Manager::in_memory(),
            lock: Mutex::new(()),
            max_requests,
            window_secs: window.as_secs().max(1),
            window,
            fail_open: true,
        }
    }

    /// Moves the records to an external store.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.manager = Manager::external(storage);
        self
    }

    /// Propagates store failures instead of treating them as absent
    /// records.
    ///
    /// By default the limiter fails open: an unreadable store behaves
    /// like a cold key and an unwritable one loses the hit, both biasing
    /// toward allowing traffic. Fail-closed surfaces the error to the
    /// caller instead.
    pub fn fail_closed(mut self) -> Self {
        self.fail_open = false;
        self
    }

    /// The configured ceiling for one window.
    #[inline]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// The configured window length.
    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Accounts one request for `key` and returns the resulting quota.
    ///
    /// The hit is taken optimistically - before the request outcome is
    /// known; see [`FixedWindowLimiter::compensate`]. The returned
    /// `remaining` goes negative on the request that breached the
    /// ceiling ([`Quota::is_exceeded`]).
    ///
    /// Errors only surface when the limiter was built with
    /// [`FixedWindowLimiter::fail_closed`]; otherwise store failures
    /// degrade toward allowing the request.
    pub fn hit(&self, key: &str) -> Result<Quota, BoxError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now_secs();

        let mut counter = match self.manager.get(key) {
            Ok(counter) => counter,
            Err(err) if self.fail_open => {
                // Fail-open: an unreadable store behaves like a cold key
                tracing::warn!(error = %err, "record fetch failed, treating key as cold");
                Counter::default()
            }
            Err(err) => return Err(err),
        };

        counter.roll(now, self.window_secs);
        counter.current_hits = counter.current_hits.saturating_add(1);

        let quota = Quota {
            limit: self.max_requests,
            remaining: i64::from(self.max_requests) - i64::from(counter.current_hits),
            reset_secs: counter.reset_secs(now),
        };

        if let Err(err) = self.manager.set(key, counter, self.window) {
            if !self.fail_open {
                return Err(err);
            }
            // Best effort: the request proceeds, this hit is lost
            tracing::warn!(error = %err, "record update failed, hit not persisted");
        }

        Ok(quota)
    }

    /// Reverses one previously counted hit for `key`.
    ///
    /// Applied once the request outcome is known, when the configuration
    /// excludes that outcome from counting. Runs under the same coarse
    /// lock as [`FixedWindowLimiter::hit`], but the two acquisitions do
    /// not span the downstream call; hits taken by concurrent requests
    /// in between are an accepted imprecision. Best effort - store
    /// failures are logged, not surfaced.
    pub fn compensate(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut counter = match self.manager.get(key) {
            Ok(counter) => counter,
            Err(err) => {
                tracing::debug!(error = %err, "compensating fetch failed");
                return;
            }
        };

        counter.current_hits = counter.current_hits.saturating_sub(1);

        if let Err(err) = self.manager.set(key, counter, self.window) {
            tracing::debug!(error = %err, "compensating update failed");
        }
    }

    /// Drops the record for `key`, opening a fresh window on its next
    /// request.
    pub fn reset(&self, key: &str) -> Result<(), BoxError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.manager.delete(key)
    }

    /// Stops the clock's refresher task.
    pub fn shutdown(&self) {
        self.clock.shutdown();
    }
}

impl Drop for FixedWindowLimiter {
    fn drop(&mut self) {
        self.clock.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::with_clock(
            max_requests,
            Duration::from_secs(window_secs),
            SharedClock::fixed(1_000),
        )
    }

    #[test]
    fn it_allows_within_the_limit() {
        let limiter = limiter(3, 10);
        let key = "1.1.1.1";

        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(limiter.hit(key).unwrap().is_exceeded()); // 4th denied
    }

    #[test]
    fn it_reports_the_remaining_quota() {
        let limiter = limiter(3, 10);
        let key = "1.1.1.1";

        assert_eq!(limiter.hit(key).unwrap().remaining, 2);
        assert_eq!(limiter.hit(key).unwrap().remaining, 1);
        assert_eq!(limiter.hit(key).unwrap().remaining, 0);
        assert_eq!(limiter.hit(key).unwrap().remaining, -1);
    }

    #[test]
    fn it_counts_down_to_the_reset() {
        let limiter = limiter(5, 60);

        assert_eq!(limiter.hit("a").unwrap().reset_secs, 60);

        limiter.clock.advance(25);

        assert_eq!(limiter.hit("a").unwrap().reset_secs, 35);
    }

    #[test]
    fn it_resets_after_the_window() {
        let limiter = limiter(2, 10);
        let key = "1.1.1.1";

        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(limiter.hit(key).unwrap().is_exceeded());

        limiter.clock.advance(10);

        // first hit of a new window
        assert_eq!(limiter.hit(key).unwrap().remaining, 1);
    }

    #[test]
    fn it_isolates_keys() {
        let limiter = limiter(1, 10);

        assert!(!limiter.hit("1.1.1.1").unwrap().is_exceeded());
        assert!(limiter.hit("1.1.1.1").unwrap().is_exceeded());

        assert!(!limiter.hit("2.2.2.2").unwrap().is_exceeded()); // independent
    }

    #[test]
    fn it_compensates_a_counted_hit() {
        let limiter = limiter(2, 10);
        let key = "1.1.1.1";

        assert_eq!(limiter.hit(key).unwrap().remaining, 1);
        assert_eq!(limiter.hit(key).unwrap().remaining, 0);

        limiter.compensate(key);

        assert_eq!(limiter.hit(key).unwrap().remaining, 0);
    }

    #[test]
    fn it_resets_a_key_on_demand() {
        let limiter = limiter(1, 10);
        let key = "1.1.1.1";

        assert!(!limiter.hit(key).unwrap().is_exceeded());
        assert!(limiter.hit(key).unwrap().is_exceeded());

        limiter.reset(key).unwrap();

        assert!(!limiter.hit(key).unwrap().is_exceeded());
    }

    #[test]
    fn it_is_exact_under_contention() {
        use std::thread;

        let limiter = Arc::new(limiter(1_000, 10));
        let key = "shared";

        let mut handles = vec![];
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(thread::spawn(move || {
                let mut allowed = 0;
                for _ in 0..200 {
                    if !limiter.hit(key).unwrap().is_exceeded() {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // the coarse lock makes the count exact
        assert_eq!(total, 1_000);
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BoxError> {
            Err("store unavailable".into())
        }

        fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), BoxError> {
            Err("store unavailable".into())
        }

        fn delete(&self, _key: &str) -> Result<(), BoxError> {
            Err("store unavailable".into())
        }
    }

    #[test]
    fn it_fails_open_on_a_broken_store() {
        let limiter = limiter(1, 10).with_storage(Arc::new(BrokenStorage));

        // every request looks like the first of a window
        assert_eq!(limiter.hit("a").unwrap().remaining, 0);
        assert_eq!(limiter.hit("a").unwrap().remaining, 0);
    }

    #[test]
    fn it_fails_closed_when_configured() {
        let limiter = limiter(1, 10)
            .with_storage(Arc::new(BrokenStorage))
            .fail_closed();

        assert!(limiter.hit("a").is_err());
    }

    struct ColdReadStorage {
        items: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl Storage for ColdReadStorage {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BoxError> {
            Err("read failed".into())
        }

        fn set(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<(), BoxError> {
            self.items.lock().unwrap().insert(key.to_owned(), value.to_vec());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), BoxError> {
            self.items.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn it_treats_a_failed_read_as_a_cold_key() {
        let storage = Arc::new(ColdReadStorage { items: Mutex::new(HashMap::new()) });
        let limiter = limiter(5, 60).with_storage(storage.clone());

        let quota = limiter.hit("a").unwrap();

        assert_eq!(quota.remaining, 4);
        assert_eq!(quota.reset_secs, 60);
        // the write still went through
        assert!(storage.items.lock().unwrap().contains_key("a"));
    }
}

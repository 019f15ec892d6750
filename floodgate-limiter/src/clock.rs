//! Shared second-granularity clock

use std::sync::{
    atomic::{AtomicU64, Ordering::Relaxed},
    Arc,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// A process-local timestamp shared between request accounting and a
/// background refresher task.
///
/// Reading the clock is a single atomic load; the refresher task is the
/// sole writer and overwrites the value with the wall-clock time every
/// second. The refresher stops when [`SharedClock::shutdown`] is called,
/// so short-lived limiters (tests, embedded scenarios) do not leak tasks.
///
/// Clones are handles onto the same timestamp.
#[derive(Debug, Clone)]
pub struct SharedClock {
    now_secs: Arc<AtomicU64>,
    cancel: Option<CancellationToken>,
}

impl SharedClock {
    /// Starts a clock refreshed every second.
    ///
    /// Must be called within a tokio runtime; the refresher is spawned
    /// onto it.
    pub fn start() -> Self {
        let now_secs = Arc::new(AtomicU64::new(unix_now()));
        let cancel = CancellationToken::new();

        tracing::debug!("starting shared clock refresher");

        let shared = now_secs.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(REFRESH_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => shared.store(unix_now(), Relaxed),
                }
            }
            tracing::debug!("shared clock refresher stopped");
        });

        Self { now_secs, cancel: Some(cancel) }
    }

    /// A clock with no refresher, pinned at `secs` until moved with
    /// [`SharedClock::advance`].
    ///
    /// Useful for deterministic tests and embedded scenarios that drive
    /// time themselves.
    pub fn fixed(secs: u64) -> Self {
        Self {
            now_secs: Arc::new(AtomicU64::new(secs)),
            cancel: None,
        }
    }

    /// Current time in whole seconds since the UNIX epoch.
    #[inline]
    pub fn now_secs(&self) -> u64 {
        self.now_secs.load(Relaxed)
    }

    /// Moves the clock forward by `secs`.
    ///
    /// Only meaningful on a refresher-free clock; a running refresher
    /// overwrites the value on its next tick.
    pub fn advance(&self, secs: u64) {
        self.now_secs.fetch_add(secs, Relaxed);
    }

    /// Stops the refresher task.
    ///
    /// Reads keep returning the last stored value. Idempotent; a no-op
    /// for refresher-free clocks.
    pub fn shutdown(&self) {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
    }
}

#[inline]
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

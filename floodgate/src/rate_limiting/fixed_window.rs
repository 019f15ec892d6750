//! Tools and structs for a fixed window rate limiting configuration

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use floodgate_limiter::{FixedWindowLimiter, SharedClock, Storage};

use super::{
    by,
    limiter::{BypassPredicate, LimitReachedHandler, RateLimiter},
    KeyGenerator,
};
use crate::status;

const DEFAULT_MAX_REQUESTS: u32 = 5;
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Configuration for a **fixed window** rate limiting policy.
///
/// This struct defines the policy parameters:
/// - `max_requests` — maximum number of requests allowed per window
///   (default: 5)
/// - `window` — duration of a single fixed window (default: 1 minute)
/// - key generator — how the client identity is derived (default:
///   client address, [`by::ip`])
/// - limit reached handler — the response produced on breach (default:
///   `429 Too Many Requests` with an empty body)
/// - skip flags — exclude failed or successful requests from counting
/// - bypass predicate — skip the limiter entirely for matching requests
/// - backing store — in-process by default, pluggable via
///   [`FixedWindow::with_storage`]
pub struct FixedWindow {
    max_requests: u32,
    window: Duration,
    key: KeyGenerator,
    limit_reached: LimitReachedHandler,
    bypass: Option<BypassPredicate>,
    storage: Option<Arc<dyn Storage>>,
    clock: Option<SharedClock>,
    skip_failed_requests: bool,
    skip_successful_requests: bool,
    fail_open: bool,
}

impl Debug for FixedWindow {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWindow")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl Default for FixedWindow {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl FixedWindow {
    /// Creates a new fixed window rate limiting policy.
    ///
    /// Out-of-range values fall back to the defaults: a zero
    /// `max_requests` becomes 5 and a sub-second `window` becomes
    /// 1 minute.
    ///
    /// # Arguments
    /// * `max_requests` - Maximum number of requests allowed in one window.
    /// * `window` - Duration of the window.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: if max_requests == 0 { DEFAULT_MAX_REQUESTS } else { max_requests },
            window: if window.as_secs() == 0 { DEFAULT_WINDOW } else { window },
            key: by::ip(),
            limit_reached: Arc::new(|_req| status!(429)),
            bypass: None,
            storage: None,
            clock: None,
            skip_failed_requests: false,
            skip_successful_requests: false,
            fail_open: true,
        }
    }

    /// Sets how the rate limiting key is extracted from a request.
    ///
    /// See the [`by`] module for the available key sources.
    pub fn with_key(mut self, key: KeyGenerator) -> Self {
        self.key = key;
        self
    }

    /// Sets the handler invoked when a request hits the limit.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use floodgate::{status, rate_limiting::FixedWindow};
    ///
    /// FixedWindow::new(100, Duration::from_secs(60))
    ///     .with_limit_reached(|_req| status!(429, "Rate limit exceeded. Try again later."));
    /// ```
    pub fn with_limit_reached<F>(mut self, handler: F) -> Self
    where
        F: Fn(&crate::HttpRequest) -> crate::HttpResult + Send + Sync + 'static,
    {
        self.limit_reached = Arc::new(handler);
        self
    }

    /// Sets a predicate that bypasses the limiter for a request when it
    /// returns `true` (e.g. an allow-list).
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use floodgate::rate_limiting::FixedWindow;
    ///
    /// FixedWindow::new(100, Duration::from_secs(60))
    ///     .with_bypass(|req| req.uri().path() == "/health");
    /// ```
    pub fn with_bypass<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&crate::HttpRequest) -> bool + Send + Sync + 'static,
    {
        self.bypass = Some(Arc::new(predicate));
        self
    }

    /// Keeps the records in an external store instead of process memory.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Drives the limiter with the given clock instead of starting a
    /// live one.
    ///
    /// The built limiter takes charge of the clock: dropping the limiter
    /// stops the clock's refresher.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Excludes requests whose final status is an error (>= 400) from
    /// counting against the quota.
    pub fn skip_failed_requests(mut self) -> Self {
        self.skip_failed_requests = true;
        self
    }

    /// Excludes requests whose final status is not an error (< 400)
    /// from counting against the quota.
    pub fn skip_successful_requests(mut self) -> Self {
        self.skip_successful_requests = true;
        self
    }

    /// Rejects requests with `503 Service Unavailable` when the backing
    /// store fails, instead of the default fail-open behavior of
    /// allowing them through.
    pub fn fail_closed(mut self) -> Self {
        self.fail_open = false;
        self
    }

    /// Builds the rate limiting middleware from this policy.
    ///
    /// Unless a clock was supplied with [`FixedWindow::with_clock`],
    /// this starts a live one and therefore must be called within a
    /// tokio runtime.
    pub fn build(self) -> RateLimiter {
        let clock = self.clock.unwrap_or_else(SharedClock::start);

        let mut limiter = FixedWindowLimiter::with_clock(self.max_requests, self.window, clock);
        if let Some(storage) = self.storage {
            limiter = limiter.with_storage(storage);
        }
        if !self.fail_open {
            limiter = limiter.fail_closed();
        }

        RateLimiter {
            limiter: Arc::new(limiter),
            key: self.key,
            limit_reached: self.limit_reached,
            bypass: self.bypass,
            skip_failed_requests: self.skip_failed_requests,
            skip_successful_requests: self.skip_successful_requests,
        }
    }
}

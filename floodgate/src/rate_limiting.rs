//! Tools and utilities for rate limiting

use hyper::http::HeaderName;

pub use floodgate_limiter::{
    BoxError,
    Counter,
    FixedWindowLimiter,
    Quota,
    SharedClock,
    Storage,
};

pub use by::KeyGenerator;
pub use fixed_window::FixedWindow;
pub use limiter::{BypassPredicate, LimitReachedHandler, RateLimiter};

pub mod by;
pub mod fixed_window;
pub mod limiter;

/// `X-RateLimit-Limit` - the configured ceiling for the window
pub const X_RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");

/// `X-RateLimit-Remaining` - hits left in the current window
pub const X_RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// `X-RateLimit-Reset` - seconds until the window resets
pub const X_RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

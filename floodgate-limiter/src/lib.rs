//! Floodgate Rate Limiter
//!
//! Fixed window rate limiting core: a shared second-granularity clock,
//! per-key counter records, a pluggable backing store, and the
//! accounting algorithm that decides whether a request is within quota.
//!
//! ## Design principles
//!
//! - **Cheap time reads** - the request path never touches the system
//!   clock; it reads a process-local timestamp refreshed once per second
//!   by a background task with an explicit stop lifecycle.
//! - **Store-agnostic accounting** - records live in process memory by
//!   default and in any [`Storage`] implementation when configured, with
//!   identical accounting semantics.
//! - **Approximate by design** - accounting is optimistic; the
//!   compensating adjustment applied after a request completes can race
//!   with concurrent requests for the same key. Rate limiting stays
//!   approximate under concurrency rather than serializing whole
//!   requests through the limiter.
//!
//! ## Thread safety
//!
//! [`FixedWindowLimiter`] is safe to share between threads and async
//! tasks; a single coarse lock serializes the fetch-mutate-persist
//! sequence for all keys.

pub use clock::SharedClock;
pub use counter::Counter;
pub use fixed_window::{FixedWindowLimiter, Quota};
pub use storage::{BoxError, Storage};

pub mod clock;
pub mod counter;
pub mod fixed_window;
pub mod storage;

mod manager;

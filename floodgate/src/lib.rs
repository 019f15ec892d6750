//! # Floodgate
//!
//! > Fixed window rate limiting middleware for [hyper](https://hyper.rs/)-based
//! > services on the [Tokio](https://tokio.rs/) runtime.
//!
//! ## Features
//! * Fixed window accounting with lazy rollover
//! * Per-key quotas with pluggable key extraction (client address, header, query)
//! * `X-RateLimit-*` and `Retry-After` response headers
//! * Optimistic counting with compensation for skipped outcomes
//! * Pluggable backing stores with a fail-open/fail-closed switch
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use floodgate::{status, Middlewares, rate_limiting::{by, FixedWindow}};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let limiter = FixedWindow::new(100, Duration::from_secs(60))
//!     .with_key(by::ip())
//!     .build();
//!
//! let mut pipeline = Middlewares::new();
//! pipeline.add(limiter.into_middleware());
//! pipeline.handle(|_req| async { status!(200, "Hello, World!") });
//!
//! let chain = pipeline.compose().expect("pipeline is not empty");
//! # let _ = chain;
//! # }
//! ```

pub mod error;
pub mod headers;
pub mod http;
pub mod middleware;
pub mod rate_limiting;

pub use crate::error::Error;
pub use crate::http::{
    HttpBody,
    HttpRequest,
    HttpResponse,
    HttpResult,
    PeerAddr,
    StatusCode,
};
pub use crate::middleware::{MiddlewareFn, Middlewares, NextFn};
pub use crate::rate_limiting::{FixedWindow, RateLimiter};

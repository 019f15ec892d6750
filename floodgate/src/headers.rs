//! Tools for HTTP headers

// Re-exporting HeaderMap, HeaderValue and some headers from hyper
pub use hyper::{
    header::{
        CONTENT_TYPE,
        FORWARDED,
        RETRY_AFTER,
    },
    http::{HeaderName, HeaderValue},
    HeaderMap
};

/// The legacy de-facto header carrying the originating client address
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

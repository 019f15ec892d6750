//! Base HTTP tools

use std::net::SocketAddr;

// Re-exporting HTTP status codes, method and etc. from hyper/http
pub use hyper::{
    http::{Method, Uri, Version},
    StatusCode,
};

pub use body::{BoxBody, HttpBody};

pub mod body;
pub mod response;

/// An HTTP request flowing through the middleware chain
pub type HttpRequest = hyper::Request<HttpBody>;

/// An HTTP response produced by the chain
pub type HttpResponse = hyper::Response<HttpBody>;

/// The outcome of handling one request
pub type HttpResult = Result<HttpResponse, crate::error::Error>;

/// The client socket address of a request.
///
/// Host servers store this in the request extensions when accepting a
/// connection; the default rate limiting key falls back to it when no
/// forwarding headers are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr(pub SocketAddr);

impl PeerAddr {
    /// The client IP address without the port.
    #[inline]
    pub fn ip(&self) -> std::net::IpAddr {
        self.0.ip()
    }
}

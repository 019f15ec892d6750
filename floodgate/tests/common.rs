//! Common test utilities

#![allow(missing_docs)]
#![allow(unreachable_pub)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use floodgate::{status, HttpBody, HttpRequest, NextFn, PeerAddr};

/// Builds a GET request to `/` carrying the given client address.
pub fn request_from(ip: &str) -> HttpRequest {
    request_to(ip, "/")
}

/// Builds a GET request to `path` carrying the given client address.
pub fn request_to(ip: &str, path: &str) -> HttpRequest {
    let addr: SocketAddr = format!("{ip}:50000").parse().unwrap();

    let mut req = hyper::Request::get(path)
        .body(HttpBody::empty())
        .unwrap();
    req.extensions_mut().insert(PeerAddr(addr));
    req
}

/// A downstream handler answering `200 OK`.
pub fn ok_next() -> NextFn {
    status_next(200)
}

/// A downstream handler answering with the given status code.
pub fn status_next(status: u16) -> NextFn {
    Arc::new(move |_req| Box::pin(async move { status!(status) }))
}

//! Helpers for building rate limiting keys.
//!
//! A key identifies the client a quota is tracked per. This module
//! provides a set of helpers for defining how that key is extracted
//! from an incoming HTTP request.
//!
//! # Examples
//!
//! ```no_run
//! use floodgate::rate_limiting::by;
//!
//! // Rate limit by client address
//! by::ip();
//!
//! // Rate limit by X-Api-Key HTTP header
//! by::header("x-api-key");
//! ```

use std::sync::Arc;

use crate::{
    error::Error,
    headers::{HeaderName, FORWARDED, X_FORWARDED_FOR},
    http::{HttpRequest, PeerAddr},
};

/// A function that extracts a rate limiting key from an HTTP request.
///
/// The function must return a stable string value that uniquely
/// represents a logical client identity (e.g. IP address or API key).
///
/// This type is internally type-erased and stored behind an `Arc`
/// to allow cheap cloning and thread-safe sharing.
pub type KeyGenerator = Arc<
    dyn Fn(&HttpRequest) -> Result<String, Error>
    + Send
    + Sync
>;

/// Uses the client address as the rate limiting key.
///
/// The address is resolved in the following order:
/// 1. The standardized `Forwarded` header (RFC 7239)
/// 2. The legacy `X-Forwarded-For` header
/// 3. The peer socket address stored by the host ([`PeerAddr`] extension)
///
/// This is the most common strategy for global or unauthenticated rate
/// limiting, and the default when no key generator is configured.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use floodgate::rate_limiting::{by, FixedWindow};
///
/// FixedWindow::new(100, Duration::from_secs(60))
///     .with_key(by::ip());
/// ```
pub fn ip() -> KeyGenerator {
    Arc::new(|req| {
        if let Some(value) = req.headers().get(&FORWARDED) {
            let value = value.to_str().map_err(Error::client_error)?;
            if let Some(client) = parse_forwarded(value) {
                return Ok(client.to_owned());
            }
        }

        if let Some(value) = req.headers().get(&X_FORWARDED_FOR) {
            let value = value.to_str().map_err(Error::client_error)?;
            if let Some(client) = first_hop(value) {
                return Ok(client.to_owned());
            }
        }

        req.extensions()
            .get::<PeerAddr>()
            .map(|peer| peer.ip().to_string())
            .ok_or_else(|| Error::client_error("Client address is not available"))
    })
}

/// Uses the value of an HTTP header as the rate limiting key.
///
/// # Notes
/// - Header names are case-insensitive and must be lowercase here.
/// - If the header is missing, the key extraction fails.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use floodgate::rate_limiting::{by, FixedWindow};
///
/// FixedWindow::new(100, Duration::from_secs(60))
///     .with_key(by::header("x-api-key"));
/// ```
pub fn header(name: &'static str) -> KeyGenerator {
    let header = HeaderName::from_static(name);

    Arc::new(move |req| {
        let value = req.headers()
            .get(&header)
            .ok_or_else(|| Error::client_error(format!("Header {name} not found")))?;

        let value = value.to_str()
            .map_err(Error::client_error)?;

        Ok(value.to_owned())
    })
}

/// Uses the value of an HTTP request query parameter as the rate
/// limiting key.
///
/// # Notes
/// - If the parameter is missing, the key extraction fails.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use floodgate::rate_limiting::{by, FixedWindow};
///
/// FixedWindow::new(100, Duration::from_secs(60))
///     .with_key(by::query("key"));
/// ```
pub fn query(name: &'static str) -> KeyGenerator {
    Arc::new(move |req| {
        req.uri()
            .query()
            .and_then(|query| query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find_map(|(k, v)| if k == name { Some(v) } else { None }))
            .map(str::to_owned)
            .ok_or_else(|| Error::client_error(format!("Query parameter {name} not found")))
    })
}

/// Uses a user-defined function as the rate limiting key source.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use floodgate::rate_limiting::{by, FixedWindow};
///
/// FixedWindow::new(100, Duration::from_secs(60))
///     .with_key(by::custom(|req| Ok(req.uri().path().to_owned())));
/// ```
pub fn custom<F>(f: F) -> KeyGenerator
where
    F: Fn(&HttpRequest) -> Result<String, Error> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Picks the client from the first element of an RFC 7239 `Forwarded`
/// header: the `for=` directive of the first hop, unquoted.
fn parse_forwarded(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()?
        .split(';')
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            name.eq_ignore_ascii_case("for")
                .then(|| value.trim().trim_matches('"'))
        })
        .filter(|client| !client.is_empty())
}

/// Picks the first (originating) hop of an `X-Forwarded-For` list.
fn first_hop(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()
        .map(str::trim)
        .filter(|client| !client.is_empty())
}

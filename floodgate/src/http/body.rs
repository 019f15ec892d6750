//! HTTP Body utilities

use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Frame, SizeHint};

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use crate::error::Error;

/// Boxed body with this crate's error type
pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, Error>;

/// Represents a response/request body
pub struct HttpBody {
    inner: BoxBody,
}

impl std::fmt::Debug for HttpBody {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HttpBody(..)")
    }
}

impl Body for HttpBody {
    type Data = Bytes;
    type Error = Error;

    #[inline]
    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl HttpBody {
    /// Creates an empty body
    #[inline]
    pub fn empty() -> Self {
        Self {
            inner: Empty::new()
                .map_err(|never| match never {})
                .boxed()
        }
    }

    /// Creates a body from the whole `content`
    #[inline]
    pub fn full(content: impl Into<Bytes>) -> Self {
        Self {
            inner: Full::new(content.into())
                .map_err(|never| match never {})
                .boxed()
        }
    }

    /// Collects the whole body into [`Bytes`]
    pub async fn collect_bytes(self) -> Result<Bytes, Error> {
        Ok(self.inner.collect().await?.to_bytes())
    }
}

impl From<&'static str> for HttpBody {
    #[inline]
    fn from(content: &'static str) -> Self {
        Self::full(content)
    }
}

impl From<String> for HttpBody {
    #[inline]
    fn from(content: String) -> Self {
        Self::full(content)
    }
}

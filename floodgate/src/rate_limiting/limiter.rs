//! Fixed window rate limiting middleware

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use floodgate_limiter::FixedWindowLimiter;

use super::{KeyGenerator, X_RATE_LIMIT_LIMIT, X_RATE_LIMIT_REMAINING, X_RATE_LIMIT_RESET};
use crate::{
    error::Error,
    headers::{HeaderValue, RETRY_AFTER},
    http::{HttpRequest, HttpResult, StatusCode},
    middleware::{MiddlewareFn, NextFn},
};

/// Handler invoked when a request hits the limit
pub type LimitReachedHandler = Arc<
    dyn Fn(&HttpRequest) -> HttpResult
    + Send
    + Sync
>;

/// Predicate that bypasses the limiter for a request when it returns `true`
pub type BypassPredicate = Arc<
    dyn Fn(&HttpRequest) -> bool
    + Send
    + Sync
>;

/// Fixed window rate limiting middleware.
///
/// Accounts one hit per request before the rest of the chain runs.
/// Within quota, the downstream outcome is annotated with the
/// `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
/// headers; over quota, the configured limit-reached handler responds
/// with a `Retry-After` header and downstream processing never runs.
///
/// Counting is optimistic: when a skip flag excludes the request's
/// final outcome from the quota, the hit is compensated after the fact.
/// A concurrent request for the same key may observe the count between
/// the hit and its compensation - an accepted imprecision, not a
/// correctness bug.
///
/// Built from a [`FixedWindow`] policy.
///
/// [`FixedWindow`]: super::FixedWindow
pub struct RateLimiter {
    pub(super) limiter: Arc<FixedWindowLimiter>,
    pub(super) key: KeyGenerator,
    pub(super) limit_reached: LimitReachedHandler,
    pub(super) bypass: Option<BypassPredicate>,
    pub(super) skip_failed_requests: bool,
    pub(super) skip_successful_requests: bool,
}

impl Debug for RateLimiter {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RateLimiter")
            .field(&self.limiter)
            .finish()
    }
}

impl RateLimiter {
    /// The configured ceiling for one window.
    #[inline]
    pub fn max_requests(&self) -> u32 {
        self.limiter.max_requests()
    }

    /// Runs the limiter for `req`, invoking `next` when within quota.
    ///
    /// A downstream error passes through unchanged; only its status
    /// feeds the skip-flag decision. Store failures surface as
    /// `503 Service Unavailable` when the policy is fail-closed and are
    /// invisible otherwise.
    pub async fn invoke(&self, req: HttpRequest, next: NextFn) -> HttpResult {
        if let Some(bypass) = &self.bypass {
            if bypass(&req) {
                return next(req).await;
            }
        }

        let key = (self.key)(&req)?;

        let quota = self.limiter
            .hit(&key)
            .map_err(|err| Error::from_parts(StatusCode::SERVICE_UNAVAILABLE, None, err))?;

        if quota.is_exceeded() {
            tracing::debug!(key = %key, "rate limit exceeded");
            let mut response = (self.limit_reached)(&req)?;
            response.headers_mut().insert(RETRY_AFTER, int_value(quota.reset_secs));
            return Ok(response);
        }

        let mut remaining = quota.remaining;
        let result = next(req).await;

        // The hit was taken before the outcome was known; undo it when
        // the configured skip flag matches the final status.
        let status = match &result {
            Ok(response) => response.status(),
            Err(err) => err.status,
        };
        if (self.skip_successful_requests && !is_failed(status))
            || (self.skip_failed_requests && is_failed(status))
        {
            self.limiter.compensate(&key);
            remaining += 1;
        }

        let mut response = result?;
        let headers = response.headers_mut();
        headers.insert(X_RATE_LIMIT_LIMIT, int_value(u64::from(quota.limit)));
        headers.insert(X_RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
        headers.insert(X_RATE_LIMIT_RESET, int_value(quota.reset_secs));

        Ok(response)
    }

    /// Adapts the limiter into a middleware pipeline function.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use floodgate::{Middlewares, rate_limiting::FixedWindow};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let limiter = FixedWindow::new(100, Duration::from_secs(60)).build();
    ///
    /// let mut pipeline = Middlewares::new();
    /// pipeline.add(limiter.into_middleware());
    /// # }
    /// ```
    pub fn into_middleware(self) -> MiddlewareFn {
        let limiter = Arc::new(self);
        Arc::new(move |req, next| {
            let limiter = limiter.clone();
            Box::pin(async move { limiter.invoke(req, next).await })
        })
    }
}

#[inline]
fn is_failed(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

#[inline]
fn int_value(value: u64) -> HeaderValue {
    HeaderValue::from(value)
}

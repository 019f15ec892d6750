//! Middleware tools

use futures_util::future::BoxFuture;
use std::{future::Future, sync::Arc};

use crate::{status, HttpRequest, HttpResult};

const DEFAULT_MW_CAPACITY: usize = 8;

/// Points to the next middleware or request handler
pub type NextFn = Arc<
    dyn Fn(HttpRequest) -> BoxFuture<'static, HttpResult>
    + Send
    + Sync
>;

/// Points to a middleware function
pub type MiddlewareFn = Arc<
    dyn Fn(HttpRequest, NextFn) -> BoxFuture<'static, HttpResult>
    + Send
    + Sync
>;

/// Middleware pipeline
#[derive(Clone, Default)]
pub struct Middlewares {
    pipeline: Vec<MiddlewareFn>
}

impl std::fmt::Debug for Middlewares {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Middlewares")
            .field(&self.pipeline.len())
            .finish()
    }
}

impl Middlewares {
    /// Initializes a new middleware pipeline
    pub fn new() -> Self {
        Self { pipeline: Vec::with_capacity(DEFAULT_MW_CAPACITY) }
    }

    /// Returns `true` if there are no middlewares,
    /// otherwise `false`
    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    /// Adds middleware function to the pipeline
    #[inline]
    pub fn add(&mut self, middleware: MiddlewareFn) -> &mut Self {
        self.pipeline.push(middleware);
        self
    }

    /// Adds a middleware closure to the pipeline
    ///
    /// # Examples
    /// ```no_run
    /// use floodgate::Middlewares;
    ///
    /// let mut pipeline = Middlewares::new();
    ///
    /// pipeline.wrap(|req, next| async move {
    ///     next(req).await
    /// });
    /// ```
    pub fn wrap<F, Fut>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(HttpRequest, NextFn) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult> + Send + 'static,
    {
        self.add(make_fn(middleware))
    }

    /// Adds the terminal request handler to the pipeline; its `next`
    /// argument is ignored
    ///
    /// # Examples
    /// ```no_run
    /// use floodgate::{status, Middlewares};
    ///
    /// let mut pipeline = Middlewares::new();
    ///
    /// pipeline.handle(|_req| async {
    ///     status!(200, "Hello, World!")
    /// });
    /// ```
    pub fn handle<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult> + Send + 'static,
    {
        self.wrap(move |req, _| handler(req))
    }

    /// Composes middlewares into a "Linked List" and returns head
    pub fn compose(&self) -> Option<NextFn> {
        let mut iter = self.pipeline.iter().rev();
        // Fetching the last middleware which is the request handler to be the initial `next`
        let last = iter.next()?;
        let mut next: NextFn = {
            let handler = last.clone();
            // Call the last middleware, ignoring its `next` argument with an empty placeholder
            Arc::new(move |req|
                handler(req, Arc::new(|_| Box::pin(async { status!(404) }))))
        };

        for mw in iter {
            let current_mw = mw.clone();
            let prev_next = next.clone();
            next = Arc::new(move |req| current_mw(req, prev_next.clone()));
        }

        Some(next)
    }
}

#[inline]
fn make_fn<F, Fut>(middleware: F) -> MiddlewareFn
where
    F: Fn(HttpRequest, NextFn) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResult> + Send + 'static,
{
    Arc::new(move |req, next| Box::pin(middleware(req, next)))
}

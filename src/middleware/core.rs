use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatcher::{HandlerRequest, HandlerResult};

/// The continuation handed to a middleware: the rest of the chain, ending
/// with the handler.
///
/// Calling [`Next::run`] zero times short-circuits the request; calling it
/// more than once re-runs everything downstream.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    inner: &'a (dyn Fn() -> HandlerResult + 'a),
}

impl<'a> Next<'a> {
    /// Wrap a continuation. Mostly useful for testing a middleware on its own.
    pub fn new(inner: &'a (dyn Fn() -> HandlerResult + 'a)) -> Self {
        Self { inner }
    }

    /// Run the rest of the chain and return its result.
    pub fn run(&self) -> HandlerResult {
        (self.inner)()
    }
}

/// A named cross-cutting behavior wrapped around a route's handler.
pub trait Middleware: Send + Sync {
    /// Handle a request, optionally delegating to `next`.
    ///
    /// # Errors
    ///
    /// Faults raised here, or returned by `next`, propagate to the caller of
    /// [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch) as-is.
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult {
        (**self).handle(req, next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult {
        (**self).handle(req, next)
    }
}

/// Middleware backed by a closure. Build one with [`from_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&HandlerRequest, &Next<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult {
        (self.f)(req, next)
    }
}

/// Turn a closure into a [`Middleware`].
///
/// ```rust
/// use routechain::middleware::from_fn;
///
/// let passthrough = from_fn(|_req, next| next.run());
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&HandlerRequest, &Next<'_>) -> HandlerResult + Send + Sync,
{
    FnMiddleware { f }
}

/// Name → behavior table, filled once during startup.
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`, replacing any earlier registration.
    pub fn register<M>(&mut self, name: &str, middleware: M)
    where
        M: Middleware + 'static,
    {
        if self
            .entries
            .insert(name.to_string(), Arc::new(middleware))
            .is_some()
        {
            warn!(middleware = %name, "Replaced existing middleware");
        } else {
            debug!(middleware = %name, total = self.entries.len(), "Middleware registered");
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Middleware>> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::error::DispatchError;
use crate::ids::RequestId;
use crate::middleware::Pipeline;
use crate::pattern::{normalize_path, ParamVec};
use crate::resolver::HandlerFn;
use crate::router::RouteTable;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for responses
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// What every handler, middleware and continuation returns.
pub type HandlerResult = Result<HandlerResponse, DispatchError>;

/// Request data handed to middleware and handlers.
///
/// `path_params` holds the `:name` captures of the matched pattern, in the
/// order they appear in the pattern.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method
    pub method: Method,
    /// Normalized request path (base path and trailing slash removed)
    pub path: String,
    /// Pattern of the matched route, e.g. `/users/:id`
    pub route_pattern: Arc<str>,
    /// Ordered path parameters
    pub path_params: ParamVec,
}

impl HandlerRequest {
    /// Build a request outside of dispatch, mostly useful for testing handlers
    /// and middleware in isolation. The route pattern defaults to the path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            request_id: RequestId::new(),
            method,
            route_pattern: Arc::from(path.as_str()),
            path,
            path_params: ParamVec::new(),
        }
    }

    /// Append a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((Arc::from(name), value.into()));
        self
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter values in pattern order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.path_params.iter().map(|(_, v)| v.as_str())
    }

    /// Parameter values in pattern order, collected.
    #[must_use]
    pub fn param_values(&self) -> Vec<&str> {
        self.params().collect()
    }

    /// Convert path_params to HashMap for compatibility
    /// Note: This allocates - use get_path_param() in hot paths
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Response produced by a handler.
///
/// The dispatcher passes it through without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Terminal outcome of a dispatch that did not fault.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A route matched and its pipeline produced a response
    Handled(HandlerResponse),
    /// No route matched the method and path
    NotFound,
}

impl DispatchOutcome {
    /// True when no route matched.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchOutcome::NotFound)
    }

    /// Borrow the response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&HandlerResponse> {
        match self {
            DispatchOutcome::Handled(resp) => Some(resp),
            DispatchOutcome::NotFound => None,
        }
    }

    /// Turn the outcome into a response, using a generic 404 for `NotFound`.
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        match self {
            DispatchOutcome::Handled(resp) => resp,
            DispatchOutcome::NotFound => HandlerResponse::error(404, "Not Found"),
        }
    }
}

/// A route as seen from the outside: for listings and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub pattern: String,
    pub handler: String,
    /// Effective middleware names, including any that resolved to no-ops
    pub middleware: Vec<String>,
}

pub(crate) struct Endpoint {
    pub(crate) handler: HandlerFn,
    pub(crate) pipeline: Pipeline,
}

pub(crate) struct DispatcherInner {
    pub(crate) table: RouteTable,
    /// One endpoint per route, same index as in `table`
    pub(crate) endpoints: Vec<Endpoint>,
    pub(crate) base_path: String,
}

/// The frozen, read-only routing core.
///
/// Produced by [`DispatcherBuilder::build`](super::DispatcherBuilder::build).
/// Cloning shares the same table; dispatching from many threads at once needs
/// no locking because nothing here is ever mutated.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.inner.table)
            .field("base_path", &self.inner.base_path)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub(crate) fn from_inner(inner: DispatcherInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Dispatch a request.
    ///
    /// Normalizes `raw_path`, takes the first route (in registration order)
    /// whose method and pattern match, and runs its middleware pipeline with
    /// the handler as the terminal step.
    ///
    /// The [`HandlerResponse`] comes back exactly as the pipeline returned it.
    /// The router never reads or rewrites its body or headers; only `status`
    /// is read, for the completion log.
    ///
    /// # Errors
    ///
    /// Handler and middleware faults are returned unchanged. A missing route
    /// is not an error: it yields `Ok(DispatchOutcome::NotFound)`.
    pub fn dispatch(&self, method: &Method, raw_path: &str) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_with_request_id(method, raw_path, RequestId::new())
    }

    /// Dispatch a request with a pre-determined request_id (for correlation)
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch_with_request_id(
        &self,
        method: &Method,
        raw_path: &str,
        request_id: RequestId,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(path) = normalize_path(raw_path, &self.inner.base_path) else {
            debug!(
                request_id = %request_id,
                path = %raw_path,
                base_path = %self.inner.base_path,
                "Path outside of base path"
            );
            return Ok(DispatchOutcome::NotFound);
        };

        let Some(route_match) = self.inner.table.route(method, &path) else {
            return Ok(DispatchOutcome::NotFound);
        };

        let Some(endpoint) = self.inner.endpoints.get(route_match.index) else {
            // endpoints are built one per route, so this means a broken build
            error!(
                request_id = %request_id,
                route_index = route_match.index,
                "Matched route has no endpoint"
            );
            return Ok(DispatchOutcome::NotFound);
        };

        let request = HandlerRequest {
            request_id,
            method: method.clone(),
            path,
            route_pattern: route_match.pattern,
            path_params: route_match.path_params,
        };

        debug!(
            request_id = %request_id,
            route_pattern = %request.route_pattern,
            middleware_count = endpoint.pipeline.len(),
            "Running pipeline"
        );

        let start = Instant::now();
        let terminal = || (endpoint.handler)(&request);
        match endpoint.pipeline.run(&request, &terminal) {
            Ok(resp) => {
                debug!(
                    request_id = %request_id,
                    status = resp.status,
                    latency_us = start.elapsed().as_micros() as u64,
                    "Request handled"
                );
                Ok(DispatchOutcome::Handled(resp))
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    route_pattern = %request.route_pattern,
                    error = %err,
                    latency_us = start.elapsed().as_micros() as u64,
                    "Request failed"
                );
                Err(err)
            }
        }
    }

    /// Routes in precedence (registration) order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.inner
            .table
            .iter()
            .map(|route| RouteInfo {
                method: route.method().clone(),
                pattern: route.pattern().as_str().to_string(),
                handler: route.handler().describe(),
                middleware: route.middleware().to_vec(),
            })
            .collect()
    }

    /// `(route pattern, middleware name)` pairs that resolved to no-ops
    /// because the name was never registered.
    #[must_use]
    pub fn skipped_middleware(&self) -> Vec<(String, String)> {
        self.inner
            .table
            .iter()
            .zip(&self.inner.endpoints)
            .flat_map(|(route, endpoint)| {
                endpoint
                    .pipeline
                    .skipped()
                    .iter()
                    .map(move |name| (route.pattern().as_str().to_string(), name.clone()))
            })
            .collect()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.table.len()
    }

    /// True when no routes were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.table.is_empty()
    }

    /// Mount prefix stripped from inbound paths.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }
}

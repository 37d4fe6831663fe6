//! Router core module - hot path for request routing.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::pattern::{CompiledPattern, ParamVec};
use crate::resolver::HandlerRef;

/// A registered route: method, compiled pattern, declared handler and the
/// effective middleware names (group scopes first, then the route's own).
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) pattern: CompiledPattern,
    pub(crate) handler: HandlerRef,
    pub(crate) middleware: Vec<String>,
}

impl Route {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Effective middleware names in execution order (outermost first).
    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Position of the route in registration order
    pub index: usize,
    /// Pattern of the matched route, e.g. `/users/:id`
    pub pattern: Arc<str>,
    /// Path parameters in pattern order (e.g., `/users/:id` → `[("id", "123")]`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap for compatibility with existing code
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Frozen, ordered collection of routes.
///
/// Matching is a linear scan in registration order and the first route whose
/// method and pattern both match wins. There is no specificity ranking:
/// register `/users/me` before `/users/:id` if both should be reachable.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Arc<[Route]>,
}

impl RouteTable {
    pub(crate) fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: routes.into(),
        }
    }

    /// Match a normalized path.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - The first route matching method and path
    /// * `None` - If no route matches (results in 404)
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        // RT1: Route match attempt
        debug!(method = %method, path = %path, "Route match attempt");

        for (index, route) in self.routes.iter().enumerate() {
            if route.method != *method {
                continue;
            }
            if let Some(path_params) = route.pattern.captures(path) {
                // RT2: Route matched
                debug!(
                    method = %method,
                    path = %path,
                    route_index = index,
                    route_pattern = %route.pattern.as_str(),
                    handler = %route.handler.describe(),
                    path_params = ?path_params,
                    "Route matched"
                );
                return Some(RouteMatch {
                    index,
                    pattern: route.pattern.shared_source(),
                    path_params,
                });
            }
        }

        // RT3: No route found
        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

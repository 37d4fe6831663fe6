use http::Method;
use tracing::debug;

use super::core::{Route, RouteTable};
use crate::error::RouterError;
use crate::pattern::{join_paths, CompiledPattern};
use crate::resolver::HandlerRef;

/// Methods a route may be registered for.
pub const SUPPORTED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Prefix and middleware contributed to every route registered inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupScope {
    prefix: String,
    middleware: Vec<String>,
}

impl GroupScope {
    /// A scope contributing `prefix` and no middleware.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            middleware: Vec::new(),
        }
    }

    /// Append middleware names to the scope.
    #[must_use]
    pub fn with_middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }
}

/// Handle to a just-registered route, used to append middleware to it.
///
/// The handle borrows the builder, so a route can only be extended while the
/// table is still being built.
#[derive(Debug)]
pub struct RouteHandle<'a> {
    route: &'a mut Route,
}

impl RouteHandle<'_> {
    /// Append middleware names after the ones inherited from group scopes.
    pub fn with_middleware<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    /// The route's effective pattern (group prefixes applied).
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.route.pattern.as_str()
    }

    /// The route's effective middleware so far.
    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.route.middleware
    }
}

/// Append-only route collection with a stack of active group scopes.
#[derive(Debug)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    scopes: Vec<GroupScope>,
    reject_duplicates: bool,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            scopes: Vec::new(),
            reject_duplicates: true,
        }
    }
}

impl RouteTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a route whose method and pattern shape repeat an earlier one
    /// is a configuration error (the default) or is accepted.
    #[must_use]
    pub fn reject_duplicates(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    /// Register a route.
    ///
    /// The effective pattern is the concatenation of every active scope's
    /// prefix followed by `pattern`; the effective middleware list starts with
    /// every active scope's names, outer to inner. Both are fixed now: scopes
    /// entered later never touch this route.
    ///
    /// # Errors
    ///
    /// * [`RouterError::UnsupportedMethod`] - method other than GET/POST/PUT/DELETE
    /// * [`RouterError::MalformedPattern`] - the joined pattern does not compile
    /// * [`RouterError::DuplicateRoute`] - same method and shape as an earlier route
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, RouterError> {
        let full_pattern = join_paths(
            self.scopes
                .iter()
                .map(|s| s.prefix.as_str())
                .chain(std::iter::once(pattern)),
        );

        if !SUPPORTED_METHODS.contains(&method) {
            return Err(RouterError::UnsupportedMethod {
                method,
                pattern: full_pattern,
            });
        }

        let compiled = CompiledPattern::compile(&full_pattern)?;

        if self.reject_duplicates {
            if let Some((first_index, first)) = self
                .routes
                .iter()
                .enumerate()
                .find(|(_, r)| r.method == method && r.pattern.shape() == compiled.shape())
            {
                return Err(RouterError::DuplicateRoute {
                    method,
                    pattern: full_pattern,
                    first_index,
                    first_pattern: first.pattern.as_str().to_string(),
                });
            }
        }

        let middleware: Vec<String> = self
            .scopes
            .iter()
            .flat_map(|s| s.middleware.iter().cloned())
            .collect();

        let handler = handler.into();
        debug!(
            method = %method,
            route_pattern = %compiled.as_str(),
            handler = %handler.describe(),
            middleware = ?middleware,
            scope_depth = self.scopes.len(),
            "Route registered"
        );

        self.routes.push(Route {
            method,
            pattern: compiled,
            handler,
            middleware,
        });
        let index = self.routes.len() - 1;
        Ok(RouteHandle {
            route: &mut self.routes[index],
        })
    }

    /// Register a GET route.
    ///
    /// # Errors
    ///
    /// See [`RouteTableBuilder::add_route`].
    pub fn get(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::GET, pattern, handler)
    }

    /// Register a POST route.
    ///
    /// # Errors
    ///
    /// See [`RouteTableBuilder::add_route`].
    pub fn post(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Register a PUT route.
    ///
    /// # Errors
    ///
    /// See [`RouteTableBuilder::add_route`].
    pub fn put(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// Register a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`RouteTableBuilder::add_route`].
    pub fn delete(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// Register routes inside `scope`.
    ///
    /// Groups nest to any depth. The scope is popped when `build` returns,
    /// whether or not it succeeded.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns.
    pub fn group<F>(&mut self, scope: GroupScope, build: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouterError>,
    {
        self.push_scope(scope);
        let result = build(self);
        self.pop_scope();
        result
    }

    pub(crate) fn push_scope(&mut self, scope: GroupScope) {
        debug!(prefix = %scope.prefix, middleware = ?scope.middleware, depth = self.scopes.len() + 1, "Group scope entered");
        self.scopes.push(scope);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of routes registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the routes into a [`RouteTable`].
    #[must_use]
    pub fn build(self) -> RouteTable {
        RouteTable::new(self.routes)
    }
}

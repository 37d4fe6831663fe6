use http::Method;
use tracing::{info, warn};

use super::core::{Dispatcher, DispatcherInner, Endpoint};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::middleware::{Middleware, MiddlewareRegistry, Pipeline};
use crate::resolver::{ControllerBuilder, HandlerRef, HandlerResolver};
use crate::router::{GroupScope, RouteHandle, RouteTableBuilder};

/// Build-phase object collecting routes, middleware and controllers.
///
/// Everything is registered here during application assembly; [`build`](Self::build)
/// validates the lot and freezes it into a [`Dispatcher`].
///
/// ```rust
/// use routechain::dispatcher::{DispatcherBuilder, HandlerResponse};
/// use routechain::middleware::from_fn;
/// use routechain::resolver::HandlerRef;
/// use routechain::router::GroupScope;
/// use http::Method;
///
/// let mut builder = DispatcherBuilder::new();
/// builder.register_middleware("auth", from_fn(|_req, next| next.run()));
/// builder
///     .group(GroupScope::new("/admin").with_middleware(["auth"]), |b| {
///         b.get("/users/:id", HandlerRef::func(|req| {
///             Ok(HandlerResponse::json(200, serde_json::json!({ "id": req.get_path_param("id") })))
///         }))?;
///         Ok(())
///     })
///     .unwrap();
///
/// let dispatcher = builder.build().unwrap();
/// let outcome = dispatcher.dispatch(&Method::GET, "/admin/users/42").unwrap();
/// assert_eq!(outcome.response().unwrap().status, 200);
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    config: RouterConfig,
    routes: RouteTableBuilder,
    middleware: MiddlewareRegistry,
    resolver: HandlerResolver,
}

impl DispatcherBuilder {
    /// Create a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with an explicit configuration.
    ///
    /// The base path is normalized here, so `"api"` and `"/api/"` both mount
    /// the routes under `/api`.
    #[must_use]
    pub fn with_config(mut config: RouterConfig) -> Self {
        config.base_path = config.normalized_base_path();
        Self {
            routes: RouteTableBuilder::new().reject_duplicates(config.reject_duplicates),
            config,
            ..Self::default()
        }
    }

    /// Register a route. See [`RouteTableBuilder::add_route`].
    ///
    /// # Errors
    ///
    /// Malformed patterns, unsupported methods and duplicate routes.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Into<HandlerRef>,
    ) -> Result<RouteHandle<'_>, RouterError> {
        self.routes.add_route(method, pattern, handler)
    }

    /// Register a GET route.
    ///
    /// # Errors
    ///
    /// See [`DispatcherBuilder::add_route`].
    pub fn get(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::GET, pattern, handler)
    }

    /// Register a POST route.
    ///
    /// # Errors
    ///
    /// See [`DispatcherBuilder::add_route`].
    pub fn post(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Register a PUT route.
    ///
    /// # Errors
    ///
    /// See [`DispatcherBuilder::add_route`].
    pub fn put(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// Register a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`DispatcherBuilder::add_route`].
    pub fn delete(&mut self, pattern: &str, handler: impl Into<HandlerRef>) -> Result<RouteHandle<'_>, RouterError> {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// Register routes inside a group scope.
    ///
    /// `scope` is active only while `build` runs; routes added in it get the
    /// scope's prefix and middleware ahead of their own.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns. The scope is popped either way.
    pub fn group<F>(&mut self, scope: GroupScope, build: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouterError>,
    {
        self.routes.push_scope(scope);
        let result = build(self);
        self.routes.pop_scope();
        result
    }

    /// Register a named middleware behavior.
    pub fn register_middleware<M>(&mut self, name: &str, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        self.middleware.register(name, middleware);
        self
    }

    /// Register a controller for `"Controller.method"` handler references.
    pub fn controller<C, F>(&mut self, name: &str, factory: F) -> ControllerBuilder<'_, C>
    where
        C: 'static,
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        self.resolver.controller(name, factory)
    }

    /// Validate everything and freeze it.
    ///
    /// Resolves every handler reference and middleware name once. Unregistered
    /// middleware is logged and skipped unless `strict_middleware` is set.
    ///
    /// # Errors
    ///
    /// The first configuration error found, in route order.
    pub fn build(self) -> Result<Dispatcher, RouterError> {
        let table = self.routes.build();
        let mut endpoints = Vec::with_capacity(table.len());

        for route in table.iter() {
            let pattern = route.pattern().as_str();
            let handler = self.resolver.resolve(route.handler(), pattern)?;
            let pipeline = Pipeline::build(route.middleware(), &self.middleware);

            for name in pipeline.skipped() {
                if self.config.strict_middleware {
                    return Err(RouterError::UnregisteredMiddleware {
                        name: name.clone(),
                        pattern: pattern.to_string(),
                    });
                }
                warn!(
                    method = %route.method(),
                    route_pattern = %pattern,
                    middleware = %name,
                    "Unregistered middleware will be skipped"
                );
            }

            endpoints.push(Endpoint { handler, pipeline });
        }

        let routes_summary: Vec<String> = table
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method(), r.pattern().as_str()))
            .collect();

        info!(
            routes_count = table.len(),
            middleware_count = self.middleware.len(),
            base_path = %self.config.base_path,
            routes_summary = ?routes_summary,
            "Routing table frozen"
        );

        Ok(Dispatcher::from_inner(DispatcherInner {
            table,
            endpoints,
            base_path: self.config.base_path,
        }))
    }
}

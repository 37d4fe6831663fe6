use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
use crate::error::{DispatchError, RouterError};

/// A resolved, directly callable handler.
pub type HandlerFn = Arc<dyn Fn(&HandlerRequest) -> HandlerResult + Send + Sync>;

type UserFn = Arc<dyn Fn(&HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + Sync>;

/// The handler a route was declared with.
#[derive(Clone)]
pub enum HandlerRef {
    /// A closure or free function
    Func(UserFn),
    /// A `"Controller.method"` reference, resolved at build time
    Method(String),
}

impl HandlerRef {
    /// Wrap a closure or function as a handler.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        HandlerRef::Func(Arc::new(f))
    }

    /// Reference a controller method by `"Controller.method"`.
    pub fn method(reference: impl Into<String>) -> Self {
        HandlerRef::Method(reference.into())
    }

    /// Human readable form used in logs and route listings.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            HandlerRef::Func(_) => "<fn>".to_string(),
            HandlerRef::Method(reference) => reference.clone(),
        }
    }

    /// Split a `"Controller.method"` reference into its two parts.
    fn split_reference(reference: &str) -> Result<(&str, &str), RouterError> {
        match reference.split_once('.') {
            Some((controller, method))
                if !controller.is_empty() && !method.is_empty() && !method.contains('.') =>
            {
                Ok((controller, method))
            }
            _ => Err(RouterError::MalformedHandlerRef {
                reference: reference.to_string(),
            }),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Func(_) => f.write_str("HandlerRef::Func"),
            HandlerRef::Method(reference) => write!(f, "HandlerRef::Method({reference:?})"),
        }
    }
}

impl From<&str> for HandlerRef {
    fn from(reference: &str) -> Self {
        HandlerRef::Method(reference.to_string())
    }
}

impl From<String> for HandlerRef {
    fn from(reference: String) -> Self {
        HandlerRef::Method(reference)
    }
}

#[derive(Default)]
struct ControllerEntry {
    methods: HashMap<String, HandlerFn>,
}

/// Capability table mapping controller names to their callable methods.
#[derive(Default)]
pub struct HandlerResolver {
    controllers: HashMap<String, ControllerEntry>,
}

impl HandlerResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under `name`.
    ///
    /// `factory` builds a fresh instance for every request routed to one of
    /// its methods. Methods are added on the returned builder.
    pub fn controller<C, F>(&mut self, name: &str, factory: F) -> ControllerBuilder<'_, C>
    where
        C: 'static,
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        if self.controllers.contains_key(name) {
            warn!(controller = %name, "Controller registered again - methods will be merged");
        }
        let entry = self.controllers.entry(name.to_string()).or_default();
        ControllerBuilder {
            entry,
            name: Arc::from(name),
            factory: Arc::new(factory),
        }
    }

    /// True when a controller with this name is registered.
    #[must_use]
    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    /// Resolve a handler reference into a callable.
    ///
    /// `pattern` only serves error reporting.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a `Method` reference is malformed or
    /// names an unknown controller or method.
    pub fn resolve(&self, handler: &HandlerRef, pattern: &str) -> Result<HandlerFn, RouterError> {
        match handler {
            HandlerRef::Func(f) => {
                let f = Arc::clone(f);
                Ok(Arc::new(move |req: &HandlerRequest| {
                    f(req).map_err(DispatchError::Handler)
                }))
            }
            HandlerRef::Method(reference) => {
                let (controller, method) = HandlerRef::split_reference(reference)?;
                let entry = self.controllers.get(controller).ok_or_else(|| {
                    RouterError::UnknownController {
                        controller: controller.to_string(),
                        pattern: pattern.to_string(),
                    }
                })?;
                let handler = entry.methods.get(method).ok_or_else(|| {
                    RouterError::UnknownControllerMethod {
                        controller: controller.to_string(),
                        method: method.to_string(),
                        pattern: pattern.to_string(),
                    }
                })?;
                debug!(reference = %reference, pattern = %pattern, "Controller method resolved");
                Ok(Arc::clone(handler))
            }
        }
    }
}

/// Adds methods to a registered controller.
pub struct ControllerBuilder<'a, C> {
    entry: &'a mut ControllerEntry,
    name: Arc<str>,
    factory: Arc<dyn Fn() -> anyhow::Result<C> + Send + Sync>,
}

impl<C: 'static> ControllerBuilder<'_, C> {
    /// Expose `method` under `name`, e.g. `.method("show", Users::show)`.
    pub fn method<M>(self, name: &str, method: M) -> Self
    where
        M: Fn(&C, &HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        let factory = Arc::clone(&self.factory);
        let controller = Arc::clone(&self.name);
        let handler: HandlerFn = Arc::new(move |req: &HandlerRequest| {
            let instance = factory().map_err(|source| {
                error!(
                    request_id = %req.request_id,
                    controller = %controller,
                    error = %source,
                    "Controller construction failed"
                );
                DispatchError::ControllerConstruction {
                    controller: controller.to_string(),
                    source,
                }
            })?;
            method(&instance, req).map_err(DispatchError::Handler)
        });
        self.entry.methods.insert(name.to_string(), handler);
        self
    }
}

//! # Error Types
//!
//! Two families of errors exist, matching the two phases of a router's life:
//!
//! - [`RouterError`] is raised while the route table is being assembled. Every
//!   variant is fatal: [`DispatcherBuilder::build`](crate::dispatcher::DispatcherBuilder::build)
//!   stops at the first one so a misconfigured service never starts serving.
//! - [`DispatchError`] is raised while a request is being served. Handler and
//!   middleware faults travel through it untouched; the transport layer decides
//!   how to turn them into a response.
//!
//! "No route matched" is deliberately absent from both: it is a normal outcome,
//! reported as [`DispatchOutcome::NotFound`](crate::dispatcher::DispatchOutcome::NotFound).

use http::Method;

/// Configuration errors detected during the build phase.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The path pattern cannot be compiled.
    #[error("malformed path pattern '{pattern}': {reason}")]
    MalformedPattern {
        /// The offending pattern, after group prefixes were applied
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// Only GET, POST, PUT and DELETE routes can be registered.
    #[error("unsupported method {method} for route '{pattern}'")]
    UnsupportedMethod { method: Method, pattern: String },

    /// Two routes share a method and a pattern shape, so the second can never match.
    #[error("duplicate route {method} '{pattern}' shadows route #{first_index} '{first_pattern}'")]
    DuplicateRoute {
        method: Method,
        pattern: String,
        first_index: usize,
        first_pattern: String,
    },

    /// A `"Controller.method"` reference does not have exactly two non-empty parts.
    #[error("malformed handler reference '{reference}': expected 'Controller.method'")]
    MalformedHandlerRef { reference: String },

    /// No controller with this name was registered.
    #[error("route '{pattern}' references unknown controller '{controller}'")]
    UnknownController { controller: String, pattern: String },

    /// The controller exists but does not expose the method.
    #[error("route '{pattern}' references unknown method '{controller}.{method}'")]
    UnknownControllerMethod {
        controller: String,
        method: String,
        pattern: String,
    },

    /// A route names middleware that was never registered and strict mode is on.
    #[error("route '{pattern}' uses unregistered middleware '{name}'")]
    UnregisteredMiddleware { name: String, pattern: String },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[source] anyhow::Error),
}

/// Faults raised while serving a matched request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The controller factory failed; the request cannot be served.
    #[error("controller '{controller}' could not be constructed")]
    ControllerConstruction {
        controller: String,
        #[source]
        source: anyhow::Error,
    },

    /// An error raised by a handler or a middleware, passed through unchanged.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl DispatchError {
    /// HTTP status a transport would typically use for this fault.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        500
    }

    /// True when the fault comes from wiring rather than from handler code.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, DispatchError::ControllerConstruction { .. })
    }
}

//! # routechain
//!
//! **routechain** is the request-routing and middleware-dispatch core of a web
//! framework. It maps an HTTP method and path to a handler, extracts path
//! parameters, and runs the handler inside an ordered chain of named
//! middleware. Transport, body parsing and response encoding belong to the
//! host; this crate starts at `(method, path)` and ends at a
//! [`HandlerResponse`].
//!
//! ## Architecture
//!
//! - **[`pattern`]** - compiles `/users/:id` style patterns into anchored matchers
//!   and normalizes inbound paths
//! - **[`router`]** - the ordered route table and group scopes (prefix + middleware)
//! - **[`middleware`]** - the [`Middleware`] trait, the name registry and
//!   pipeline composition, plus tracing and metrics middleware
//! - **[`resolver`]** - turns closures and `"Controller.method"` references into
//!   callable handlers
//! - **[`dispatcher`]** - the build phase ([`DispatcherBuilder`]) and the frozen,
//!   thread-safe [`Dispatcher`]
//! - **[`config`]** - router settings from env vars or YAML/TOML files
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`error`]** - build-time and dispatch-time error types
//!
//! ## Lifecycle
//!
//! Registration happens once, on a single thread, through a
//! [`DispatcherBuilder`]. [`DispatcherBuilder::build`] validates patterns,
//! handler references and middleware names, then freezes everything into a
//! [`Dispatcher`] that is cheap to clone and safe to call from any number of
//! threads.
//!
//! ```rust
//! use http::Method;
//! use routechain::{DispatcherBuilder, GroupScope, HandlerResponse};
//! use routechain::middleware::from_fn;
//! use serde_json::json;
//!
//! struct Users;
//!
//! impl Users {
//!     fn show(&self, req: &routechain::HandlerRequest) -> anyhow::Result<HandlerResponse> {
//!         Ok(HandlerResponse::json(200, json!({ "id": req.get_path_param("id") })))
//!     }
//! }
//!
//! let mut builder = DispatcherBuilder::new();
//! builder.controller("Users", || Ok(Users)).method("show", Users::show);
//! builder.register_middleware("auth", from_fn(|_req, next| next.run()));
//! builder
//!     .group(GroupScope::new("/admin").with_middleware(["auth"]), |admin| {
//!         admin.get("/users/:id", "Users.show")?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let dispatcher = builder.build().unwrap();
//! let resp = dispatcher
//!     .dispatch(&Method::GET, "/admin/users/42/")
//!     .unwrap()
//!     .into_response();
//! assert_eq!(resp.body, json!({ "id": "42" }));
//! ```
//!
//! ## Request Flow
//!
//! 1. Strip query string, base path and trailing slash
//! 2. First route (registration order) whose method and pattern match wins
//! 3. Captured segments are zipped with the pattern's parameter names
//! 4. The route's middleware run outermost-first around the handler
//! 5. No match yields [`DispatchOutcome::NotFound`]; faults come back unchanged

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod pattern;
pub mod resolver;
pub mod router;

pub use config::RouterConfig;
pub use dispatcher::{
    DispatchOutcome, Dispatcher, DispatcherBuilder, HandlerRequest, HandlerResponse,
    HandlerResult, SharedDispatcher,
};
pub use error::{DispatchError, RouterError};
pub use ids::RequestId;
pub use middleware::{Middleware, Next};
pub use resolver::HandlerRef;
pub use router::GroupScope;

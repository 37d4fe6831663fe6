//! # Resolver Module
//!
//! Turns a route's declared handler into something the dispatcher can call.
//!
//! A [`HandlerRef`] is one of two things:
//!
//! - **`Func`** - a closure or function invoked with the [`HandlerRequest`](crate::dispatcher::HandlerRequest)
//! - **`Method`** - a `"Controller.method"` reference into the controllers
//!   registered on a [`HandlerResolver`]
//!
//! Controllers are registered as a factory plus a table of methods, so no
//! reflection is involved: resolving `"Users.show"` is a pair of map lookups
//! done once at build time. Each request that reaches a controller method
//! constructs exactly one controller instance through its factory.
//!
//! ```rust
//! use routechain::dispatcher::{HandlerRequest, HandlerResponse};
//! use routechain::resolver::{HandlerRef, HandlerResolver};
//!
//! struct Users;
//!
//! impl Users {
//!     fn show(&self, req: &HandlerRequest) -> anyhow::Result<HandlerResponse> {
//!         Ok(HandlerResponse::json(200, serde_json::json!({ "id": req.get_path_param("id") })))
//!     }
//! }
//!
//! let mut resolver = HandlerResolver::new();
//! resolver.controller("Users", || Ok(Users)).method("show", Users::show);
//! let _handler = resolver.resolve(&HandlerRef::from("Users.show"), "/users/:id").unwrap();
//! ```

mod core;

pub use core::{ControllerBuilder, HandlerFn, HandlerRef, HandlerResolver};

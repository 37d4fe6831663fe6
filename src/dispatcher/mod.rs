//! # Dispatcher Module
//!
//! The dispatcher ties the other pieces together: it owns the frozen route
//! table, one resolved handler per route and one middleware pipeline per
//! route, and exposes the single [`Dispatcher::dispatch`] entry point.
//!
//! ## Lifecycle
//!
//! 1. **Build phase** - routes, groups, middleware and controllers are
//!    registered on a [`DispatcherBuilder`]
//! 2. **Freeze** - [`DispatcherBuilder::build`] compiles and resolves
//!    everything, failing fast on configuration errors
//! 3. **Serve** - [`Dispatcher::dispatch`] is called concurrently from any
//!    number of threads; nothing is mutated, so no locks are taken
//!
//! ## Request Flow
//!
//! 1. Normalize the path (query string, base path, trailing slash)
//! 2. Scan routes in registration order, first method + pattern match wins
//! 3. Zip captures with parameter names into a [`HandlerRequest`]
//! 4. Run the route's pipeline with the handler as terminal step
//!
//! No match is [`DispatchOutcome::NotFound`], not an error. Handler and
//! middleware faults come back as [`DispatchError`](crate::error::DispatchError)
//! exactly as they were raised.
//!
//! ## Replacing a Table
//!
//! [`SharedDispatcher`] holds a dispatcher behind an `ArcSwap` so a newly
//! built table can replace the old one without pausing traffic.

mod builder;
mod core;
mod shared;

pub use builder::DispatcherBuilder;
pub use core::{
    DispatchOutcome, Dispatcher, HandlerRequest, HandlerResponse, HandlerResult, HeaderVec,
    RouteInfo, MAX_INLINE_HEADERS,
};
pub use shared::SharedDispatcher;

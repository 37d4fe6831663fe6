//! # Middleware Module
//!
//! Middleware are named behaviors wrapped around a route's handler:
//! authentication gates, rate limiting, logging and the like.
//!
//! ## Contract
//!
//! A [`Middleware`] receives the request and a [`Next`] continuation. It may
//! call `next.run()` once (the common case), never (short-circuit, e.g. reject
//! before the handler runs) or several times. Whatever it returns is what the
//! middleware outside of it sees.
//!
//! ## Composition
//!
//! A route's effective middleware list is resolved against the
//! [`MiddlewareRegistry`] into a [`Pipeline`]. The first name runs outermost:
//! for `["A", "B"]` and handler `T`, a request that every layer lets through
//! runs A, then B, then T, and A sees what B (and T) returned.
//!
//! Names that were never registered are skipped. The dispatcher logs a warning
//! for each at build time, or refuses to build when `strict_middleware` is set.
//!
//! ## Built-in Middleware
//!
//! - [`TracingMiddleware`] - request span with status and latency
//! - [`MetricsMiddleware`] - request counts and latency per route

mod core;
mod metrics;
mod pipeline;
#[cfg(test)]
mod tests;
mod tracing;

pub use self::core::{from_fn, FnMiddleware, Middleware, MiddlewareRegistry, Next};
pub use self::metrics::{MetricsMiddleware, RouteStats};
pub use self::pipeline::{Continuation, Pipeline};
pub use self::tracing::TracingMiddleware;

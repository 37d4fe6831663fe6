use std::time::Instant;

use tracing::{field, info_span};

use super::core::{Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResult};

/// Wraps the rest of the chain in an `info` span and records the outcome.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            route = %req.route_pattern,
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let start = Instant::now();
        let result = span.in_scope(|| next.run());

        let status = match &result {
            Ok(resp) => resp.status,
            Err(err) => err.status_code(),
        };
        span.record("status", status);
        span.record("latency_ms", start.elapsed().as_millis() as u64);
        result
    }
}

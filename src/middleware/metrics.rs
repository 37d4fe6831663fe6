use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::core::{Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResult};

/// Counters for one route, keyed by `"METHOD /pattern"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    pub requests: u64,
    /// Requests that faulted or answered with a 5xx status
    pub errors: u64,
    pub total_latency: Duration,
}

impl RouteStats {
    /// Mean latency, zero when nothing was recorded.
    #[must_use]
    pub fn mean_latency(&self) -> Duration {
        if self.requests == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total_latency.as_nanos() / u128::from(self.requests);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }
}

/// Middleware collecting request counts and latency.
///
/// Global counters are atomics; per-route counters live in a `DashMap` so
/// concurrent requests on different routes do not contend.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    per_route: DashMap<String, RouteStats>,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all requests, zero before the first one.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Counters for one route.
    #[must_use]
    pub fn route_stats(&self, method: &http::Method, pattern: &str) -> Option<RouteStats> {
        self.per_route
            .get(&format!("{method} {pattern}"))
            .map(|entry| *entry.value())
    }

    /// Snapshot of all per-route counters.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, RouteStats)> {
        let mut all: Vec<(String, RouteStats)> = self
            .per_route
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

impl Middleware for MetricsMiddleware {
    fn handle(&self, req: &HandlerRequest, next: &Next<'_>) -> HandlerResult {
        let start = Instant::now();
        let result = next.run();
        let elapsed = start.elapsed();

        let failed = match &result {
            Ok(resp) => resp.status >= 500,
            Err(_) => true,
        };

        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);

        let mut stats = self
            .per_route
            .entry(format!("{} {}", req.method, req.route_pattern))
            .or_default();
        stats.requests += 1;
        stats.total_latency += elapsed;
        if failed {
            stats.errors += 1;
        }

        result
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Method;
use serde_json::json;

use super::{
    from_fn, MetricsMiddleware, MiddlewareRegistry, Next, Pipeline, RouteStats, TracingMiddleware,
};
use crate::dispatcher::{HandlerRequest, HandlerResponse, HandlerResult};
use crate::error::DispatchError;

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(log: &Log, label: &'static str) -> impl super::Middleware {
    let log = Arc::clone(log);
    from_fn(move |_req, next| {
        log.lock().unwrap().push(format!("{label}:before"));
        let result = next.run();
        log.lock().unwrap().push(format!("{label}:after"));
        result
    })
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn request() -> HandlerRequest {
    HandlerRequest::new(Method::GET, "/things")
}

#[test]
fn test_first_name_runs_outermost() {
    let log: Log = Arc::default();
    let mut registry = MiddlewareRegistry::new();
    registry.register("A", recorder(&log, "A"));
    registry.register("B", recorder(&log, "B"));

    let pipeline = Pipeline::build(&names(&["A", "B"]), &registry);
    let req = request();
    let terminal_log = Arc::clone(&log);
    let terminal = move || -> HandlerResult {
        terminal_log.lock().unwrap().push("T".to_string());
        Ok(HandlerResponse::json(200, json!(null)))
    };
    pipeline.run(&req, &terminal).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        ["A:before", "B:before", "T", "B:after", "A:after"]
    );
}

#[test]
fn test_outer_layer_observes_inner_result() {
    let mut registry = MiddlewareRegistry::new();
    registry.register(
        "wrap",
        from_fn(|_req, next| {
            let mut resp = next.run()?;
            resp.body = json!({ "wrapped": resp.body });
            Ok(resp)
        }),
    );
    registry.register(
        "tag",
        from_fn(|_req, next| {
            let mut resp = next.run()?;
            resp.set_header("x-tag", "inner".to_string());
            Ok(resp)
        }),
    );

    let pipeline = Pipeline::build(&names(&["wrap", "tag"]), &registry);
    let req = request();
    let resp = pipeline
        .run(&req, &|| Ok(HandlerResponse::json(200, json!("payload"))))
        .unwrap();
    assert_eq!(resp.body, json!({ "wrapped": "payload" }));
    assert_eq!(resp.get_header("x-tag"), Some("inner"));
}

#[test]
fn test_short_circuit_skips_rest_of_chain() {
    let log: Log = Arc::default();
    let mut registry = MiddlewareRegistry::new();
    registry.register(
        "deny",
        from_fn(|_req, _next| Ok(HandlerResponse::error(401, "Unauthorized"))),
    );
    registry.register("B", recorder(&log, "B"));

    let pipeline = Pipeline::build(&names(&["deny", "B"]), &registry);
    let req = request();
    let terminal_log = Arc::clone(&log);
    let terminal = move || -> HandlerResult {
        terminal_log.lock().unwrap().push("T".to_string());
        Ok(HandlerResponse::json(200, json!(null)))
    };
    let resp = pipeline.run(&req, &terminal).unwrap();

    assert_eq!(resp.status, 401);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_continuation_may_run_more_than_once() {
    let calls = Arc::new(Mutex::new(0u32));
    let mut registry = MiddlewareRegistry::new();
    registry.register(
        "retry",
        from_fn(|_req, next| match next.run() {
            Err(_) => next.run(),
            ok => ok,
        }),
    );

    let pipeline = Pipeline::build(&names(&["retry"]), &registry);
    let req = request();
    let counter = Arc::clone(&calls);
    let terminal = move || -> HandlerResult {
        let mut n = counter.lock().unwrap();
        *n += 1;
        if *n == 1 {
            Err(anyhow::anyhow!("flaky").into())
        } else {
            Ok(HandlerResponse::json(200, json!(*n)))
        }
    };
    let resp = pipeline.run(&req, &terminal).unwrap();
    assert_eq!(resp.body, json!(2));
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[test]
fn test_unregistered_names_are_skipped() {
    let log: Log = Arc::default();
    let mut registry = MiddlewareRegistry::new();
    registry.register("A", recorder(&log, "A"));

    let pipeline = Pipeline::build(&names(&["ghost", "A", "phantom"]), &registry);
    assert_eq!(pipeline.len(), 1);
    assert_eq!(pipeline.names(), ["A"]);
    assert_eq!(pipeline.skipped(), ["ghost", "phantom"]);

    let req = request();
    let resp = pipeline
        .run(&req, &|| Ok(HandlerResponse::json(204, json!(null))))
        .unwrap();
    assert_eq!(resp.status, 204);
    assert_eq!(*log.lock().unwrap(), ["A:before", "A:after"]);
}

#[test]
fn test_duplicate_names_run_twice() {
    let log: Log = Arc::default();
    let mut registry = MiddlewareRegistry::new();
    registry.register("A", recorder(&log, "A"));

    let pipeline = Pipeline::build(&names(&["A", "A"]), &registry);
    let req = request();
    pipeline
        .run(&req, &|| Ok(HandlerResponse::json(200, json!(null))))
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        ["A:before", "A:before", "A:after", "A:after"]
    );
}

#[test]
fn test_fault_propagates_unchanged() {
    let mut registry = MiddlewareRegistry::new();
    registry.register("pass", from_fn(|_req, next| next.run()));

    let pipeline = Pipeline::build(&names(&["pass"]), &registry);
    let req = request();
    let err = pipeline
        .run(&req, &|| Err(anyhow::anyhow!("boom").into()))
        .unwrap_err();
    match err {
        DispatchError::Handler(inner) => assert_eq!(inner.to_string(), "boom"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_compose_returns_reusable_continuation() {
    let mut registry = MiddlewareRegistry::new();
    registry.register(
        "count",
        from_fn(|req, next| {
            let mut resp = next.run()?;
            resp.set_header("x-path", req.path.clone());
            Ok(resp)
        }),
    );
    let pipeline = Pipeline::build(&names(&["count"]), &registry);
    let req = request();
    let terminal = || -> HandlerResult { Ok(HandlerResponse::json(200, json!(null))) };
    let chain = pipeline.compose(&req, &terminal);
    assert_eq!(chain().unwrap().get_header("x-path"), Some("/things"));
    assert_eq!(chain().unwrap().status, 200);
}

#[test]
fn test_registry_replace_and_names() {
    let mut registry = MiddlewareRegistry::new();
    assert!(registry.is_empty());
    registry.register("b", from_fn(|_req, next| next.run()));
    registry.register("a", from_fn(|_req, next| next.run()));
    registry.register(
        "a",
        from_fn(|_req, _next| Ok(HandlerResponse::error(418, "teapot"))),
    );
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), ["a", "b"]);
    assert!(registry.contains("a"));

    let pipeline = Pipeline::build(&names(&["a"]), &registry);
    let req = request();
    let resp = pipeline
        .run(&req, &|| Ok(HandlerResponse::json(200, json!(null))))
        .unwrap();
    assert_eq!(resp.status, 418);
}

#[test]
fn test_next_can_wrap_plain_closure() {
    let inner = || -> HandlerResult { Ok(HandlerResponse::json(200, json!("direct"))) };
    let next = Next::new(&inner);
    let mw = TracingMiddleware;
    let resp = super::Middleware::handle(&mw, &request(), &next).unwrap();
    assert_eq!(resp.body, json!("direct"));
}

#[test]
fn test_metrics_middleware_counts() {
    let metrics = Arc::new(MetricsMiddleware::new());
    assert_eq!(metrics.request_count(), 0);
    assert_eq!(metrics.average_latency().as_nanos(), 0);

    let mut registry = MiddlewareRegistry::new();
    registry.register("metrics", Arc::clone(&metrics));
    let pipeline = Pipeline::build(&names(&["metrics"]), &registry);

    let req = HandlerRequest::new(Method::GET, "/users/1");
    for _ in 0..3 {
        pipeline
            .run(&req, &|| Ok(HandlerResponse::json(200, json!(null))))
            .unwrap();
    }
    pipeline
        .run(&req, &|| Ok(HandlerResponse::error(503, "down")))
        .unwrap();
    assert!(pipeline
        .run(&req, &|| Err(anyhow::anyhow!("boom").into()))
        .is_err());

    assert_eq!(metrics.request_count(), 5);
    let stats = metrics.route_stats(&Method::GET, "/users/1").unwrap();
    assert_eq!(stats.requests, 5);
    assert_eq!(stats.errors, 2);
    assert_eq!(metrics.snapshot().len(), 1);
    assert!(metrics.route_stats(&Method::POST, "/users/1").is_none());
}

#[test]
fn test_route_stats_mean_latency_with_large_counts() {
    assert_eq!(RouteStats::default().mean_latency(), Duration::ZERO);

    let at_u32_boundary = RouteStats {
        requests: 1 << 32,
        errors: 0,
        total_latency: Duration::from_secs(1 << 32),
    };
    assert_eq!(at_u32_boundary.mean_latency(), Duration::from_secs(1));

    let past_boundary = RouteStats {
        requests: (1 << 32) + 2,
        errors: 0,
        total_latency: Duration::from_secs((1 << 32) + 2),
    };
    assert_eq!(past_boundary.mean_latency(), Duration::from_secs(1));

    let small = RouteStats {
        requests: 4,
        errors: 1,
        total_latency: Duration::from_millis(10),
    };
    assert_eq!(small.mean_latency(), Duration::from_micros(2500));
}

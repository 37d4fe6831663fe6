use std::sync::Arc;
use std::thread;

use http::Method;
use routechain::{Dispatcher, DispatcherBuilder, HandlerRef, HandlerResponse, SharedDispatcher};
use serde_json::json;

fn versioned(version: u32) -> Dispatcher {
    let mut builder = DispatcherBuilder::new();
    builder
        .get(
            "/version",
            HandlerRef::func(move |_| Ok(HandlerResponse::json(200, json!(version)))),
        )
        .unwrap();
    builder.build().unwrap()
}

#[test]
fn test_store_replaces_table() {
    let shared = SharedDispatcher::new(versioned(1));
    let resp = shared.dispatch(&Method::GET, "/version").unwrap().into_response();
    assert_eq!(resp.body, json!(1));

    let previous = shared.store(versioned(2));
    let resp = shared.dispatch(&Method::GET, "/version").unwrap().into_response();
    assert_eq!(resp.body, json!(2));

    // the old table still works for whoever holds it
    let old = previous.dispatch(&Method::GET, "/version").unwrap().into_response();
    assert_eq!(old.body, json!(1));
}

#[test]
fn test_snapshot_is_stable_across_store() {
    let shared = SharedDispatcher::new(versioned(1));
    let snapshot = shared.load();
    shared.store(DispatcherBuilder::new().build().unwrap());

    assert_eq!(snapshot.len(), 1);
    assert!(shared.load().is_empty());
    assert!(shared.dispatch(&Method::GET, "/version").unwrap().is_not_found());
}

#[test]
fn test_concurrent_readers_during_store() {
    let shared = Arc::new(SharedDispatcher::new(versioned(1)));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..500 {
                    let resp = shared
                        .dispatch(&Method::GET, "/version")
                        .unwrap()
                        .into_response();
                    let v = resp.body.as_u64().unwrap();
                    assert!(v == 1 || v == 2);
                }
            })
        })
        .collect();

    shared.store(versioned(2));
    for reader in readers {
        reader.join().unwrap();
    }
    let resp = shared.dispatch(&Method::GET, "/version").unwrap().into_response();
    assert_eq!(resp.body, json!(2));
}

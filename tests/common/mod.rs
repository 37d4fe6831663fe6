#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use routechain::middleware::{from_fn, Middleware};
use routechain::{DispatcherBuilder, HandlerRequest, HandlerResponse};
use serde_json::json;

/// Shared event log for ordering assertions.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::default()
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware that logs `<label>:before` / `<label>:after` around `next`.
pub fn recording(log: &EventLog, label: &'static str) -> impl Middleware {
    let log = Arc::clone(log);
    from_fn(move |_req, next| {
        log.lock().unwrap().push(format!("{label}:before"));
        let result = next.run();
        log.lock().unwrap().push(format!("{label}:after"));
        result
    })
}

/// Controller counting its constructions.
pub struct Users {
    pub log: EventLog,
}

impl Users {
    pub fn show(&self, req: &HandlerRequest) -> anyhow::Result<HandlerResponse> {
        self.log.lock().unwrap().push("T".to_string());
        Ok(HandlerResponse::json(
            200,
            json!({ "id": req.get_path_param("id"), "route": &*req.route_pattern }),
        ))
    }

    pub fn me(&self, _req: &HandlerRequest) -> anyhow::Result<HandlerResponse> {
        Ok(HandlerResponse::json(200, json!({ "id": "me" })))
    }

    pub fn fail(&self, _req: &HandlerRequest) -> anyhow::Result<HandlerResponse> {
        anyhow::bail!("users backend unavailable")
    }
}

/// Register the `Users` controller; returns its construction counter.
pub fn register_users(builder: &mut DispatcherBuilder, log: &EventLog) -> Arc<AtomicUsize> {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let log = Arc::clone(log);
    builder
        .controller("Users", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Users {
                log: Arc::clone(&log),
            })
        })
        .method("show", Users::show)
        .method("me", Users::me)
        .method("fail", Users::fail);
    constructed
}

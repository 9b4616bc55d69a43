//! Kubernetes health probes, answered before the request reaches routing.
//!
//! `GET /healthz` always answers 200 while the process can serve anything at
//! all. `GET /readyz` consults an optional readiness check and answers 503
//! until it passes, which keeps an instance out of rotation while it warms up.
//!
//! ```rust
//! use ramify::RouterBuilder;
//! use ramify::middleware::HealthCheck;
//!
//! let mut builder = RouterBuilder::new();
//! builder.use_middleware(HealthCheck::new()).unwrap();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::Middleware;
use crate::method::Method;
use crate::response::{CONTENT_LENGTH, CONTENT_TYPE, Response};
use crate::router::App;
use crate::status::Status;

type ReadyFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Answers `GET /healthz` with `ok` and `GET /readyz` with `ready` (or 503
/// when the readiness check says no). Every other request passes through.
#[derive(Clone)]
pub struct HealthCheck {
    ready: ReadyFn,
}

impl HealthCheck {
    /// Always ready.
    pub fn new() -> Self {
        Self { ready: Arc::new(|| true) }
    }

    /// Gates `/readyz` on `ready`, e.g. a warm-up flag or a dependency ping.
    pub fn with_readiness(ready: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self { ready: Arc::new(ready) }
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for HealthCheck {
    fn wrap(&self, next: App) -> App {
        let ready = Arc::clone(&self.ready);
        App::new(move |env| {
            if Method::Get != *env.method() {
                return next.call(env);
            }
            match env.path() {
                "/healthz" => Ok(plain(Status::Ok, "ok")),
                "/readyz" if ready() => Ok(plain(Status::Ok, "ready")),
                "/readyz" => Ok(plain(Status::ServiceUnavailable, "not ready")),
                _ => next.call(env),
            }
        })
    }
}

fn plain(status: Status, body: &str) -> Response {
    let headers = HashMap::from([
        (CONTENT_TYPE.to_owned(), "text/plain".to_owned()),
        (CONTENT_LENGTH.to_owned(), body.len().to_string()),
    ]);
    Response::new(status, headers, vec![body.to_owned()])
}

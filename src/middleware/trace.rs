use std::time::Instant;

use tracing::{info, info_span, warn};

use super::Middleware;
use crate::router::App;

/// One span and one event per request: method, path, status, latency.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn wrap(&self, next: App) -> App {
        App::new(move |env| {
            let span = info_span!("request", method = env.method(), path = env.path());
            let _entered = span.enter();
            let started = Instant::now();

            let result = next.call(env);
            let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            match &result {
                Ok(res) => info!(status = res.status, latency_us, "request finished"),
                Err(e) => warn!(error = %e, latency_us, "request failed"),
            }
            result
        })
    }
}

//! Middleware layer.
//!
//! A middleware receives the next [`App`] in the chain and returns a new
//! one. Registration order is outermost-first: the first middleware added to
//! a [`RouterBuilder`](crate::RouterBuilder) sees the request first and the
//! response last.
//!
//! Built-in middleware:
//! - [`Trace`]: per-request span with method, path, status, latency
//! - [`SetHeader`]: response header applied where the app did not set it
//! - [`HealthCheck`]: answers `/healthz` and `/readyz` before routing
//! - [`from_fn`]: any `Fn(&Env, &App) -> Result<Response, Error>`

mod health;
mod set_header;
mod trace;

use std::sync::Arc;

pub use health::HealthCheck;
pub use set_header::SetHeader;
pub use trace::Trace;

use crate::env::Env;
use crate::error::Error;
use crate::response::Response;
use crate::router::App;

/// Wraps an [`App`] into another [`App`].
///
/// The middleware value itself carries its construction arguments; `wrap`
/// is called again, from scratch, whenever the router configuration changes.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: App) -> App;
}

/// Folds `middleware` around `base`, last registered innermost.
pub(crate) fn build_app(base: App, middleware: &[Arc<dyn Middleware>]) -> App {
    middleware
        .iter()
        .rev()
        .fold(base, |app, m| m.wrap(app))
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Middleware from a closure that gets the request environment and the next
/// app.
///
/// ```rust
/// use ramify::middleware::from_fn;
///
/// let powered_by = from_fn(|env, next| {
///     let mut res = next.call(env)?;
///     res.headers.insert("X-Powered-By".into(), "ramify".into());
///     Ok(res)
/// });
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&Env, &App) -> Result<Response, Error> + Send + Sync + 'static,
{
    FromFn(Arc::new(f))
}

/// See [`from_fn`].
pub struct FromFn<F>(Arc<F>);

impl<F> Middleware for FromFn<F>
where
    F: Fn(&Env, &App) -> Result<Response, Error> + Send + Sync + 'static,
{
    fn wrap(&self, next: App) -> App {
        let f = Arc::clone(&self.0);
        App::new(move |env| f(env, &next))
    }
}

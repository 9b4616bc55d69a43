//! HTTP gateway and graceful shutdown.
//!
//! The router itself is synchronous. The server accepts connections on
//! tokio, turns each hyper request into an [`Env`], and runs
//! [`Router::handle`] on tokio's blocking pool, so concurrency comes from the
//! worker threads calling into one shared router.
//!
//! # Shutdown
//!
//! SIGTERM or Ctrl-C stops the accept loop. Connections already accepted
//! keep their tasks and are drained before [`Server::serve`] returns, so a
//! request in progress still gets its response.

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::env::{self, Env};
use crate::error::Error;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use ramify::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr })
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "ramify listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown first, so a SIGTERM stops accepting even when more
                // connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = router.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| dispatch(router.clone(), req));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("ramify stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request. Router errors and panics become a bare 500; hyper
/// never sees an error.
async fn dispatch<B>(
    router: Router,
    req: hyper::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let env = env_from_request(&req);
    let handled = tokio::task::spawn_blocking(move || router.handle(&env)).await;

    let response = match handled {
        Ok(Ok(res)) => into_http(res),
        Ok(Err(e)) => {
            warn!(method = %req.method(), path = req.uri().path(), error = %e, "request aborted");
            internal_error()
        }
        Err(e) => {
            error!(method = %req.method(), path = req.uri().path(), "router task failed: {e}");
            internal_error()
        }
    };
    Ok(response)
}

/// `REQUEST_METHOD`, `PATH_INFO`, `QUERY_STRING`, and one `HTTP_*` entry per
/// header (repeated headers are joined with `, `).
pub(crate) fn env_from_request<B>(req: &hyper::Request<B>) -> Env {
    let mut env = Env::new(req.method().as_str(), req.uri().path());
    if let Some(query) = req.uri().query() {
        env.insert(env::QUERY_STRING, query);
    }
    for name in req.headers().keys() {
        let value = req
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        env.insert(env::header_key(name.as_str()), value);
    }
    env
}

/// Converts a finalized response. Headers that are not valid HTTP are
/// dropped with a warning; an out-of-range status becomes 500.
pub(crate) fn into_http(res: Response) -> http::Response<Full<Bytes>> {
    let mut out = http::Response::new(Full::new(Bytes::from(res.body.concat())));
    *out.status_mut() = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in res.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
    }
    out
}

fn internal_error() -> http::Response<Full<Bytes>> {
    let mut out = http::Response::new(Full::new(Bytes::new()));
    *out.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    out
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on Windows).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

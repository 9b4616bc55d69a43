//! # ramify
//!
//! A tree router for HTTP. Routes are plain Rust code: nested blocks that
//! try to match a prefix of the path, consume it, and either branch further
//! or answer. The first block that answers wins; everything still pending,
//! at any depth, is skipped.
//!
//! ## The contract
//!
//! - Matching is incremental. Each matcher eats one or more `/segment`s from
//!   the *remaining* path, so nested blocks only ever see what is left.
//! - A failed attempt puts the path back exactly as it was.
//! - A request produces exactly one response: from the first match, or a
//!   default 404 when nothing matched.
//! - Configuration happens once, at startup. A frozen [`RouterBuilder`] or a
//!   built [`Router`] cannot change.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ramify::{Flow, Request, RouterBuilder, Segment, Server, Status};
//! use ramify::middleware::Trace;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ramify::Error> {
//!     let mut app = RouterBuilder::new();
//!     app.route(routes)?.use_middleware(Trace)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app.build()).await
//! }
//!
//! fn routes(r: &mut Request) -> Flow {
//!     r.root(|_| "home")?;
//!     r.on("users", |r| {
//!         r.get(Segment, |r| format!("user {}", r.capture(0).unwrap_or_default()))?;
//!         r.post((), |r| {
//!             r.response().set_status(Status::Created);
//!             "created"
//!         })
//!     })
//! }
//! ```

mod cache;
mod env;
mod error;
mod handler;
mod matcher;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;
pub mod plugin;

pub use cache::Cache;
pub use env::{Env, PATH_INFO, QUERY_STRING, REQUEST_METHOD};
pub use error::Error;
pub use handler::{Flow, Halt, IntoBody};
pub use matcher::{Matcher, Matchers, Segment, Term};
pub use method::Method;
pub use request::Request;
pub use response::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, Response, ResponseBuilder};
pub use router::{App, Options, Router, RouterBuilder};
pub use server::Server;
pub use status::Status;

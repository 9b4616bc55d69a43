//! Minimal ramify example: nested routes, captures, a redirect, health probes.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users
//!   curl -i http://localhost:3000/old
//!   curl http://localhost:3000/healthz

use ramify::{Flow, Request, RouterBuilder, Segment, Server, Status};

#[tokio::main]
async fn main() -> Result<(), ramify::Error> {
    tracing_subscriber::fmt::init();

    let mut app = RouterBuilder::new();
    app.route(routes)?
        .load_plugin("trace")?
        .load_plugin("health")?
        .freeze();

    Server::bind("0.0.0.0:3000")?.serve(app.build()).await
}

fn routes(r: &mut Request) -> Flow {
    r.root(|_| "<h1>ramify</h1>")?;

    r.on("users", |r| {
        // GET /users/:id
        r.get(Segment, |r| {
            let id = r.capture(0).unwrap_or_default().to_owned();
            r.response().set_header("Content-Type", "application/json");
            format!(r#"{{"id":"{id}","name":"alice"}}"#)
        })?;

        // POST /users
        r.post((), |r| {
            r.response().set_status(Status::Created);
            r.response().set_header("Location", "/users/99");
            r#"{"id":"99"}"#
        })
    })?;

    r.on("old", |r| r.redirect("/"))
}

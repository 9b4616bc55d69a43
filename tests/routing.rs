use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ramify::middleware::{SetHeader, from_fn};
use ramify::{
    CONTENT_LENGTH, CONTENT_TYPE, Env, Error, Flow, Request, Response, Router, RouterBuilder,
    Segment, Status, Term,
};

fn router(routes: impl Fn(&mut Request) -> Flow + Send + Sync + 'static) -> Router {
    let mut b = RouterBuilder::new();
    b.route(routes).unwrap();
    b.build()
}

fn call(router: &Router, method: &str, path: &str) -> Response {
    router.handle(&Env::new(method, path)).unwrap()
}

fn root_only(r: &mut Request) -> Flow {
    r.root(|_| "ROOT!")
}

#[test]
fn get_root() {
    let res = call(&router(root_only), "GET", "/");
    assert_eq!(res.status, 200);
    assert_eq!(res.headers.len(), 2);
    assert_eq!(res.header(CONTENT_TYPE), Some("text/html"));
    assert_eq!(res.header(CONTENT_LENGTH), Some("5"));
    assert_eq!(res.body, ["ROOT!"]);
}

#[test]
fn unmatched_path_is_an_empty_404() {
    let res = call(&router(root_only), "GET", "/missing");
    assert_eq!(res.status, 404);
    assert_eq!(res.header(CONTENT_TYPE), Some("text/html"));
    assert_eq!(res.header(CONTENT_LENGTH), Some("0"));
    assert!(res.body.is_empty());
}

#[test]
fn nested_segments_are_consumed_before_the_handler() {
    let app = router(|r| {
        r.on("hello", |r| {
            r.get("world", |r| {
                assert_eq!(r.remaining_path(), "");
                assert_eq!(r.matched_path(), "/hello/world");
                "X world"
            })
        })
    });
    assert_eq!(call(&app, "GET", "/hello/world").body, ["X world"]);
}

#[test]
fn first_match_wins_across_nesting_levels() {
    let evaluated = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&evaluated);

    let app = router(move |r| {
        let seen = Arc::clone(&seen);
        r.on("a", move |r| {
            r.get("b", |_| "first")?;
            seen.fetch_add(1, Ordering::SeqCst);
            r.get("b", |_| "shadowed")
        })?;
        r.get(("a", "b"), |_| "outer")
    });

    assert_eq!(call(&app, "GET", "/a/b").body, ["first"]);
    assert_eq!(evaluated.load(Ordering::SeqCst), 0);
}

#[test]
fn exactly_one_handler_runs_per_request() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let app = router(move |r| {
        let c = Arc::clone(&counter);
        let bump = move |_: &mut Request| {
            c.fetch_add(1, Ordering::SeqCst);
            "hit"
        };
        r.get("x", bump.clone())?;
        r.get("x", bump.clone())?;
        r.is("x", bump)
    });

    for _ in 0..3 {
        call(&app, "GET", "/x");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[test]
fn failed_branches_do_not_leak_path_state() {
    let app = router(|r| {
        r.on(("users", "admin"), |r| r.get("panel", |_| "admin"))?;
        r.on(("users", Segment), |r| {
            let id = r.capture(0).unwrap_or_default().to_owned();
            r.get("posts", move |_| format!("posts of {id}"))
        })
    });
    assert_eq!(call(&app, "GET", "/users/7/posts").body, ["posts of 7"]);
    assert_eq!(call(&app, "GET", "/users/admin/panel").body, ["admin"]);
}

#[test]
fn failed_sibling_keeps_enclosing_captures() {
    let app = router(|r| {
        r.on(("users", Segment), |r| {
            r.get("edit", |_| "edit form")?;
            r.post("edit", |_| "saved")?;
            r.get((), |r| format!("user {}", r.capture(0).unwrap_or("?")))
        })
    });
    assert_eq!(call(&app, "GET", "/users/7").body, ["user 7"]);
    assert_eq!(call(&app, "GET", "/users/7/edit").body, ["edit form"]);
}

#[test]
fn literal_needs_a_segment_boundary() {
    let app = router(|r| r.is("user", |_| "user"));
    assert_eq!(call(&app, "GET", "/user").status, 200);
    assert_eq!(call(&app, "GET", "/users").status, 404);
    assert_eq!(call(&app, "GET", "/user/1").status, 404);
}

#[test]
fn branch_without_inner_match_halts_with_404() {
    let app = router(|r| {
        r.on("api", |r| r.get("v1", |_| "v1"))?;
        r.is(("api", "v2"), |_| "unreachable")
    });
    let res = call(&app, "GET", "/api/v2");
    assert_eq!(res.status, 404);
    assert!(res.body.is_empty());
}

#[test]
fn verbs_gate_on_method() {
    let app = router(|r| {
        r.on("items", |r| {
            r.get((), |_| "list")?;
            r.post((), |r| {
                r.response().set_status(Status::Created);
                "created"
            })?;
            r.delete(Segment, |r| {
                r.response().set_status(Status::NoContent);
            })
        })
    });

    assert_eq!(call(&app, "GET", "/items").body, ["list"]);
    let created = call(&app, "POST", "/items");
    assert_eq!((created.status, created.body_string().as_str()), (201, "created"));

    let deleted = call(&app, "DELETE", "/items/3");
    assert_eq!(deleted.status, 204);
    assert_eq!(deleted.header(CONTENT_TYPE), None);
    assert_eq!(deleted.header(CONTENT_LENGTH), None);

    assert_eq!(call(&app, "PUT", "/items").status, 404);
}

#[test]
fn explicit_terminal_matcher() {
    let app = router(|r| r.on(("docs", Term), |_| Ok(())));
    assert_eq!(call(&app, "GET", "/docs").status, 404);
    let app = router(|r| {
        r.on(("docs", Term), |r| {
            r.response().write("index");
            Ok(())
        })
    });
    assert_eq!(call(&app, "GET", "/docs").body, ["index"]);
    assert_eq!(call(&app, "GET", "/docs/intro").body.len(), 0);
}

#[test]
fn handler_headers_match_defaults_regardless_of_case() {
    let app = router(|r| {
        r.get("json", |r| {
            r.response().set_header("content-type", "application/json");
            "{}"
        })?;
        r.get("sized", |r| {
            r.response().set_header("content-length", "2");
            "ok"
        })
    });

    let res = call(&app, "GET", "/json");
    assert_eq!(res.headers.len(), 2);
    assert_eq!(res.header(CONTENT_TYPE), Some("application/json"));
    assert_eq!(res.header(CONTENT_LENGTH), Some("2"));

    let res = call(&app, "GET", "/sized");
    assert_eq!(res.headers.len(), 2);
    assert_eq!(res.header("Content-Length"), Some("2"));
}

#[test]
fn content_length_is_the_byte_sum_of_all_chunks() {
    let app = router(|r| {
        r.get("multi", |r| {
            r.response().write("ab");
            r.response().write("ü");
            r.response().write("");
        })
    });
    let res = call(&app, "GET", "/multi");
    assert_eq!(res.header(CONTENT_LENGTH), Some("4"));
    assert_eq!(res.body, ["ab", "ü", ""]);
}

#[test]
fn unsupported_handler_result_aborts_the_request() {
    let app = router(|r| r.get("bad", |_| true));
    assert!(matches!(
        app.handle(&Env::new("GET", "/bad")),
        Err(Error::UnsupportedHandlerResult(_))
    ));
}

#[test]
fn handler_errors_propagate_without_a_response() {
    let app = router(|r| {
        r.get("fail", |_| -> Result<&'static str, Error> {
            Err(Error::PluginRegistration("nope".into()))
        })
    });
    assert!(app.handle(&Env::new("GET", "/fail")).is_err());
}

#[test]
fn redirect_halts_routing() {
    let app = router(|r| {
        r.on("old", |r| r.redirect_with("/new", Status::MovedPermanently))?;
        r.get("old", |_| "never")
    });
    let res = call(&app, "GET", "/old/page");
    assert_eq!(res.status, 301);
    assert_eq!(res.header("Location"), Some("/new"));
    assert_eq!(res.header(CONTENT_LENGTH), Some("0"));
}

#[test]
fn middleware_wraps_the_finalized_response() {
    let mut b = RouterBuilder::new();
    b.route(root_only)
        .unwrap()
        .use_middleware(from_fn(|env, next| {
            let mut res = next.call(env)?;
            res.body.push("!".into());
            Ok(res)
        }))
        .unwrap()
        .use_middleware(SetHeader::new("X-Outer", "1"))
        .unwrap();
    let res = b.build().handle(&Env::new("GET", "/")).unwrap();
    assert_eq!(res.body, ["ROOT!", "!"]);
    assert_eq!(res.header("X-Outer"), Some("1"));
}

#[test]
fn freeze_leaves_the_application_unchanged() {
    let mut b = RouterBuilder::new();
    b.route(root_only).unwrap();
    b.freeze();

    let err = b.use_middleware(SetHeader::new("X", "1")).err();
    assert!(matches!(err, Some(Error::ConfigurationFrozen(_))));
    let err = b.route(|r| r.root(|_| "other")).err();
    assert!(matches!(err, Some(Error::ConfigurationFrozen(_))));

    let res = b.build().handle(&Env::new("GET", "/")).unwrap();
    assert_eq!(res.body, ["ROOT!"]);
    assert_eq!(res.header("X"), None);
}

#[test]
fn builtin_plugins_load_by_name() {
    let mut b = RouterBuilder::new();
    b.route(root_only).unwrap().load_plugin("health").unwrap();
    let router = b.build();

    assert_eq!(call(&router, "GET", "/healthz").body, ["ok"]);
    assert_eq!(call(&router, "GET", "/").body, ["ROOT!"]);
}

#[test]
fn unknown_plugin_is_a_registration_error() {
    let mut b = RouterBuilder::new();
    assert!(matches!(b.load_plugin("does-not-exist"), Err(Error::PluginRegistration(_))));
}

//! Per-request matching state and the route-block API.
//!
//! A [`Request`] is created for every call into the router and dropped when
//! the response leaves it. It owns the remaining path, the captures of the
//! current match attempt, and the [`ResponseBuilder`] that handlers write to.

use tracing::debug;

use crate::env::{self, Env};
use crate::handler::{Flow, Halt, IntoBody};
use crate::matcher::Matchers;
use crate::method::Method;
use crate::response::{Response, ResponseBuilder};
use crate::status::Status;

/// An incoming request, as seen by route blocks.
///
/// ```rust
/// use ramify::{Flow, Request, Segment};
///
/// fn routes(r: &mut Request) -> Flow {
///     r.root(|_| "home")?;
///     r.on("users", |r| {
///         r.get(Segment, |r| format!("user {}", r.capture(0).unwrap_or("?")))?;
///         r.post((), |r| {
///             r.response().set_status(201u16);
///             "created"
///         })
///     })
/// }
/// ```
#[derive(Debug)]
pub struct Request {
    env: Env,
    method: String,
    path: String,
    remaining_path: String,
    captures: Vec<String>,
    response: ResponseBuilder,
}

impl Request {
    /// A request for `env` whose response defaults to `Content-Type:
    /// text/html`. The router passes its configured defaults instead.
    pub fn new(env: &Env) -> Self {
        Self::with_response(env, ResponseBuilder::new())
    }

    pub(crate) fn with_response(env: &Env, response: ResponseBuilder) -> Self {
        let path = match env.path() {
            p if p.is_empty() || p.starts_with('/') => p.to_owned(),
            p => format!("/{p}"),
        };
        Self {
            env: env.clone(),
            method: env.method().to_owned(),
            remaining_path: path.clone(),
            path,
            captures: Vec::new(),
            response,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn env(&self) -> &Env { &self.env }
    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }

    /// The part of the path no matcher has consumed yet.
    pub fn remaining_path(&self) -> &str { &self.remaining_path }

    /// The part of the path already consumed.
    pub fn matched_path(&self) -> &str {
        &self.path[..self.path.len() - self.remaining_path.len()]
    }

    /// Captures of the current match attempt, in matcher order.
    ///
    /// Every `on`/`is`/verb call with arguments starts a new attempt and
    /// clears them, so read what you need before nesting further. An
    /// argument-less verb keeps the captures of its enclosing block.
    pub fn captures(&self) -> &[String] { &self.captures }

    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }

    pub fn query_string(&self) -> &str {
        self.env.get(env::QUERY_STRING).unwrap_or_default()
    }

    /// Request header, looked up through its `HTTP_*` environment key.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.env.get(&env::header_key(name))
    }

    /// The response under construction.
    pub fn response(&mut self) -> &mut ResponseBuilder { &mut self.response }

    // ── Matching primitives ───────────────────────────────────────────────────

    /// Consumes `/segment` when it is followed by `/` or the end of the path.
    /// Leaves the remaining path untouched otherwise.
    pub fn match_literal(&mut self, segment: &str) -> bool {
        let consumed = match self
            .remaining_path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(segment))
        {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                self.remaining_path.len() - rest.len()
            }
            _ => return false,
        };
        self.remaining_path.drain(..consumed);
        true
    }

    /// `true` iff the whole path has been consumed.
    pub fn match_terminal(&self) -> bool {
        self.remaining_path.is_empty()
    }

    /// Consumes one non-empty `/segment` and captures it.
    pub fn match_segment(&mut self) -> bool {
        let Some(after) = self.remaining_path.strip_prefix('/') else {
            return false;
        };
        let end = after.find('/').unwrap_or(after.len());
        if end == 0 {
            return false;
        }
        let segment = after[..end].to_owned();
        self.remaining_path.drain(..=end);
        self.captures.push(segment);
        true
    }

    /// Runs `matchers` left to right. When one fails, the remaining path and
    /// the captures are put back to where they were before the first one
    /// ran; when all succeed the consumed state is kept.
    pub fn match_all<M: Matchers + ?Sized>(&mut self, matchers: &M) -> bool {
        self.restoring(|r| matchers.match_each(r))
    }

    /// [`match_all`](Request::match_all) for verbs: the method must equal
    /// `method`, and when path arguments are given the path must be fully
    /// consumed after them.
    pub fn match_verb<M: Matchers + ?Sized>(&mut self, method: Method, matchers: &M) -> bool {
        if method != *self.method {
            return false;
        }
        matchers.is_empty() || self.attempt(matchers, true)
    }

    fn restoring(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let saved = (self.remaining_path.clone(), self.captures.clone());
        if f(self) {
            return true;
        }
        (self.remaining_path, self.captures) = saved;
        false
    }

    /// One match attempt: fresh captures, then every matcher, then
    /// optionally a terminal check. A failed attempt leaves path and
    /// captures as the enclosing block had them.
    fn attempt<M: Matchers + ?Sized>(&mut self, matchers: &M, terminal: bool) -> bool {
        self.restoring(|r| {
            r.captures.clear();
            matchers.match_each(r) && (!terminal || r.match_terminal())
        })
    }

    // ── Route blocks ──────────────────────────────────────────────────────────

    /// Branch: when `matchers` match, runs the nested `block` and halts with
    /// whatever response it left behind, even if nothing inside matched.
    pub fn on<M, F>(&mut self, matchers: M, block: F) -> Flow
    where
        M: Matchers,
        F: FnOnce(&mut Request) -> Flow,
    {
        if !self.attempt(&matchers, false) {
            return Ok(());
        }
        debug!(matched = self.matched_path(), "branch entered");
        block(self)?;
        self.halt()
    }

    /// Like [`on`](Request::on) but also requires the path to be fully
    /// consumed, and runs a handler instead of a nested block.
    pub fn is<M, F, R>(&mut self, matchers: M, handler: F) -> Flow
    where
        M: Matchers,
        F: FnOnce(&mut Request) -> R,
        R: IntoBody,
    {
        if !self.attempt(&matchers, true) {
            return Ok(());
        }
        self.run(handler)
    }

    /// `GET` on `/` (or an empty path).
    pub fn root<F, R>(&mut self, handler: F) -> Flow
    where
        F: FnOnce(&mut Request) -> R,
        R: IntoBody,
    {
        if Method::Get != *self.method || !matches!(self.remaining_path.as_str(), "" | "/") {
            return Ok(());
        }
        self.run(handler)
    }

    /// Verb-gated handler. Without matchers (`()`) only the method is
    /// checked; with matchers the path must also be fully consumed.
    pub fn verb<M, F, R>(&mut self, method: Method, matchers: M, handler: F) -> Flow
    where
        M: Matchers,
        F: FnOnce(&mut Request) -> R,
        R: IntoBody,
    {
        if !self.match_verb(method, &matchers) {
            return Ok(());
        }
        self.run(handler)
    }

    pub fn get<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Get, m, f)
    }

    pub fn post<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Post, m, f)
    }

    pub fn put<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Put, m, f)
    }

    pub fn patch<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Patch, m, f)
    }

    pub fn delete<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Delete, m, f)
    }

    pub fn head<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Head, m, f)
    }

    pub fn options<M: Matchers, F: FnOnce(&mut Request) -> R, R: IntoBody>(&mut self, m: M, f: F) -> Flow {
        self.verb(Method::Options, m, f)
    }

    /// Finalizes the response as it stands and stops routing.
    pub fn halt(&mut self) -> Flow {
        let response = self.finish();
        debug!(status = response.status, path = %self.path, "halt");
        Err(Halt::Handled(response))
    }

    /// Finalizes the response, leaving an empty builder behind. The router
    /// calls this once per request: from [`halt`](Request::halt), or after
    /// the route specification returned without matching.
    pub(crate) fn finish(&mut self) -> Response {
        std::mem::take(&mut self.response).finalize()
    }

    /// `302 Found` to `location`, then halt.
    pub fn redirect(&mut self, location: &str) -> Flow {
        self.redirect_with(location, Status::Found)
    }

    pub fn redirect_with(&mut self, location: &str, status: impl Into<u16>) -> Flow {
        self.response.redirect(location, status);
        self.halt()
    }

    /// Runs a matched handler, writes its string result if nothing was
    /// written yet, and halts.
    fn run<F, R>(&mut self, handler: F) -> Flow
    where
        F: FnOnce(&mut Request) -> R,
        R: IntoBody,
    {
        debug!(method = %self.method, path = %self.path, "handler matched");
        if let Some(body) = handler(self).into_body()? {
            if self.response.is_empty() {
                self.response.write(body);
            }
        }
        self.halt()
    }
}

//! Per-request response accumulation and the finalized wire [`Response`].
//!
//! Handlers never build a [`Response`] directly. They write into the
//! request's [`ResponseBuilder`] (or just return a string) and the router
//! finalizes it exactly once, when the first route matches or when nothing
//! matched at all.

use std::collections::HashMap;

use crate::status::{self, Status};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const LOCATION: &str = "Location";

/// Headers every response carries unless configured otherwise.
pub(crate) fn default_headers() -> HashMap<String, String> {
    HashMap::from([(CONTENT_TYPE.to_owned(), "text/html".to_owned())])
}

// ── Header maps ──────────────────────────────────────────────────────────────
//
// Names are case-insensitive. A map holds at most one spelling of each name;
// the most recent write decides which.

fn key_of<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a String> {
    headers.keys().find(|k| k.eq_ignore_ascii_case(name))
}

pub(crate) fn get_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    key_of(headers, name).and_then(|k| headers.get(k)).map(String::as_str)
}

pub(crate) fn insert_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    remove_header(headers, &name);
    headers.insert(name, value);
}

pub(crate) fn remove_header(headers: &mut HashMap<String, String>, name: &str) -> Option<String> {
    let key = key_of(headers, name)?.clone();
    headers.remove(&key)
}

/// Inserts `name` only when no spelling of it is present.
pub(crate) fn insert_header_if_absent(
    headers: &mut HashMap<String, String>,
    name: String,
    value: impl FnOnce() -> String,
) {
    if key_of(headers, &name).is_none() {
        headers.insert(name, value());
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A finalized response: the `(status, headers, body)` triple handed back to
/// the gateway.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<String>,
}

impl Response {
    /// Builds a response from parts. Mostly useful in middleware that answers
    /// without calling the next app.
    pub fn new(status: impl Into<u16>, headers: HashMap<String, String>, body: Vec<String>) -> Self {
        Self { status: status.into(), headers, body }
    }

    /// Header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        get_header(&self.headers, name)
    }

    /// Body chunks joined into one string.
    pub fn body_string(&self) -> String {
        self.body.concat()
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Mutable response state for one request.
///
/// Status is left unset until a handler sets it; [`finalize`] picks 200 or
/// 404 depending on whether anything was written. Header names are matched
/// without regard to ASCII case.
///
/// [`finalize`]: ResponseBuilder::finalize
#[derive(Debug)]
pub struct ResponseBuilder {
    status: Option<u16>,
    headers: HashMap<String, String>,
    body: Vec<String>,
    length: usize,
    defaults: HashMap<String, String>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::with_defaults(default_headers())
    }
}

impl ResponseBuilder {
    /// A builder whose only default header is `Content-Type: text/html`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that applies `defaults` at finalize time where the handler
    /// did not set a value itself. An empty map means no defaults at all.
    pub fn with_defaults(defaults: HashMap<String, String>) -> Self {
        Self {
            status: None,
            headers: HashMap::new(),
            body: Vec::new(),
            length: 0,
            defaults,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn set_status(&mut self, code: impl Into<u16>) {
        self.status = Some(code.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        get_header(&self.headers, name)
    }

    /// Sets `name`, replacing the value under any other spelling of it.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.headers, name.into(), value.into());
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        remove_header(&mut self.headers, name)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Appends a body chunk.
    pub fn write(&mut self, chunk: impl Into<String>) {
        let chunk = chunk.into();
        self.length += chunk.len();
        self.body.push(chunk);
    }

    /// `true` until the first byte is written.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Total byte length written so far.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Sets `Location` and the redirect status. Does not halt routing; use
    /// [`Request::redirect`](crate::Request::redirect) for that.
    pub fn redirect(&mut self, location: impl Into<String>, code: impl Into<u16>) {
        self.set_header(LOCATION, location);
        self.set_status(code);
    }

    /// Turns the accumulated state into the wire response.
    ///
    /// 1. status: explicit value, else 404 for an empty body and 200 otherwise
    /// 2. default headers fill in whatever the handler left unset
    /// 3. bodiless statuses (1xx, 204, 205, 304) with no body lose `Content-Type`
    /// 4. everything else gets `Content-Length` unless the handler set one
    pub fn finalize(self) -> Response {
        let Self { status, mut headers, body, length, defaults } = self;
        let empty = length == 0;

        let status = status.unwrap_or(if empty {
            Status::NotFound.code()
        } else {
            Status::Ok.code()
        });

        for (name, value) in defaults {
            insert_header_if_absent(&mut headers, name, || value);
        }

        if empty && status::forbids_body(status) {
            remove_header(&mut headers, CONTENT_TYPE);
        } else {
            insert_header_if_absent(&mut headers, CONTENT_LENGTH.to_owned(), || length.to_string());
        }

        Response { status, headers, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_defaults() -> HashMap<String, String> {
        default_headers()
    }

    #[test]
    fn empty_body_defaults_to_404_with_zero_length() {
        let res = ResponseBuilder::with_defaults(html_defaults()).finalize();
        assert_eq!(res.status, 404);
        assert_eq!(res.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(res.header(CONTENT_LENGTH), Some("0"));
        assert!(res.body.is_empty());
    }

    #[test]
    fn written_body_defaults_to_200() {
        let mut b = ResponseBuilder::with_defaults(html_defaults());
        b.write("ROOT!");
        let res = b.finalize();
        assert_eq!(res.status, 200);
        assert_eq!(res.header(CONTENT_LENGTH), Some("5"));
        assert_eq!(res.body, vec!["ROOT!".to_owned()]);
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let mut b = ResponseBuilder::new();
        b.write("héllo");
        b.write("→");
        assert_eq!(b.length(), 6 + 3);
        assert_eq!(b.finalize().header(CONTENT_LENGTH), Some("9"));
    }

    #[test]
    fn explicit_headers_win_over_defaults() {
        let mut b = ResponseBuilder::with_defaults(html_defaults());
        b.set_header(CONTENT_TYPE, "application/json");
        b.set_header(CONTENT_LENGTH, "42");
        b.write("{}");
        let res = b.finalize();
        assert_eq!(res.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(res.header(CONTENT_LENGTH), Some("42"));
    }

    #[test]
    fn header_names_ignore_case() {
        let mut b = ResponseBuilder::new();
        b.set_header("content-type", "application/json");
        b.set_header("content-length", "7");
        b.write("{}");
        let res = b.finalize();
        assert_eq!(res.headers.len(), 2);
        assert_eq!(res.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(res.header(CONTENT_LENGTH), Some("7"));
    }

    #[test]
    fn later_spelling_replaces_earlier_one() {
        let mut b = ResponseBuilder::new();
        b.set_header("X-Token", "a");
        b.set_header("x-token", "b");
        assert_eq!(b.headers().len(), 1);
        assert_eq!(b.header("X-TOKEN"), Some("b"));
        assert_eq!(b.remove_header("X-Token"), Some("b".to_owned()));
        assert!(b.headers().is_empty());
    }

    #[test]
    fn new_builder_defaults_to_html() {
        let mut b = ResponseBuilder::new();
        b.write("hi");
        assert_eq!(b.finalize().header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(ResponseBuilder::with_defaults(HashMap::new()).finalize().headers.len(), 1);
    }

    #[test]
    fn lowercase_content_type_is_dropped_for_bodiless_statuses() {
        let mut b = ResponseBuilder::with_defaults(HashMap::new());
        b.set_header("content-type", "text/plain");
        b.set_status(Status::NotModified);
        assert!(b.finalize().headers.is_empty());
    }

    #[test]
    fn bodiless_statuses_drop_content_type() {
        for code in [100u16, 101, 204, 205, 304] {
            let mut b = ResponseBuilder::with_defaults(html_defaults());
            b.set_status(code);
            let res = b.finalize();
            assert_eq!(res.status, code);
            assert_eq!(res.header(CONTENT_TYPE), None, "{code}");
            assert_eq!(res.header(CONTENT_LENGTH), None, "{code}");
        }
    }

    #[test]
    fn bodiless_status_with_body_keeps_headers() {
        let mut b = ResponseBuilder::with_defaults(html_defaults());
        b.set_status(Status::NoContent);
        b.write("x");
        let res = b.finalize();
        assert_eq!(res.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(res.header(CONTENT_LENGTH), Some("1"));
    }

    #[test]
    fn redirect_sets_location_and_status() {
        let mut b = ResponseBuilder::new();
        b.redirect("/login", Status::Found);
        let res = b.finalize();
        assert_eq!(res.status, 302);
        assert_eq!(res.header(LOCATION), Some("/login"));
    }
}

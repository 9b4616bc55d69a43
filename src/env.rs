//! The gateway environment handed to [`Router::handle`](crate::Router::handle).
//!
//! CGI-style string keys: `REQUEST_METHOD` and `PATH_INFO` are required,
//! `QUERY_STRING` and `HTTP_*` header entries are optional.

use std::collections::HashMap;

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const PATH_INFO: &str = "PATH_INFO";
pub const QUERY_STRING: &str = "QUERY_STRING";

/// One request's environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// An environment for `method` on `path`.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let mut env = Self::default();
        env.insert(REQUEST_METHOD, method);
        env.insert(PATH_INFO, path);
        env
    }

    /// Chaining form of [`insert`](Env::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a request header as `HTTP_<NAME>`, upper-cased with `-` → `_`.
    pub fn with_header(self, name: &str, value: impl Into<String>) -> Self {
        self.with(header_key(name), value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// `REQUEST_METHOD`, or `""` when the gateway left it out.
    pub fn method(&self) -> &str {
        self.get(REQUEST_METHOD).unwrap_or_default()
    }

    /// `PATH_INFO`, or `""` (the root) when absent.
    pub fn path(&self) -> &str {
        self.get(PATH_INFO).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// `content-type` → `HTTP_CONTENT_TYPE`.
pub(crate) fn header_key(name: &str) -> String {
    let mut key = String::with_capacity(5 + name.len());
    key.push_str("HTTP_");
    key.extend(name.chars().map(|c| match c {
        '-' => '_',
        c => c.to_ascii_uppercase(),
    }));
    key
}

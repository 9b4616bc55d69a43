use super::Middleware;
use crate::response;
use crate::router::App;

/// Adds a response header unless the inner app already set it.
#[derive(Clone, Debug)]
pub struct SetHeader {
    name: String,
    value: String,
}

impl SetHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl Middleware for SetHeader {
    fn wrap(&self, next: App) -> App {
        let (name, value) = (self.name.clone(), self.value.clone());
        App::new(move |env| {
            let mut res = next.call(env)?;
            response::insert_header_if_absent(&mut res.headers, name.clone(), || value.clone());
            Ok(res)
        })
    }
}

//! Router configuration and the composed application.
//!
//! Configuration happens on a [`RouterBuilder`] during startup: set the route
//! specification, add middleware, load plugins, tweak options. Every change
//! rebuilds the whole [`App`] from scratch; nothing is patched in place.
//! [`RouterBuilder::build`] hands out the immutable [`Router`] that serves
//! requests, possibly from many threads at once.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::env::Env;
use crate::error::Error;
use crate::handler::{BoxedHandler, Flow, Halt};
use crate::middleware::{self, Middleware};
use crate::plugin::{self, Plugin, PluginRegistry};
use crate::request::Request;
use crate::response::{self, Response, ResponseBuilder};

// ── App ───────────────────────────────────────────────────────────────────────

/// A callable application: the route dispatcher, possibly wrapped in
/// middleware. Cheap to clone.
#[derive(Clone)]
pub struct App(Arc<dyn Fn(&Env) -> Result<Response, Error> + Send + Sync + 'static>);

impl App {
    pub fn new(f: impl Fn(&Env) -> Result<Response, Error> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, env: &Env) -> Result<Response, Error> {
        (self.0)(env)
    }
}

/// Runs the route specification for one request.
fn dispatcher(route: Option<BoxedHandler>, defaults: HashMap<String, String>) -> App {
    App::new(move |env| {
        let mut req = Request::with_response(env, ResponseBuilder::with_defaults(defaults.clone()));
        let flow = match &route {
            Some(route) => route(&mut req),
            None => Ok(()),
        };
        match flow {
            Ok(()) => Ok(req.finish()),
            Err(Halt::Handled(res)) => Ok(res),
            Err(Halt::Error(e)) => {
                warn!(method = req.method(), path = req.path(), error = %e, "route block failed");
                Err(e)
            }
        }
    })
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Router-wide settings.
#[derive(Clone, Debug)]
pub struct Options {
    /// Headers applied at finalize time where the handler set none.
    pub default_headers: HashMap<String, String>,
    /// Free-form settings, mostly for plugins.
    pub settings: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_headers: response::default_headers(),
            settings: HashMap::new(),
        }
    }
}

// ── RouterBuilder ─────────────────────────────────────────────────────────────

/// Mutable router configuration.
///
/// ```rust
/// use ramify::{Env, RouterBuilder};
/// use ramify::middleware::Trace;
///
/// let mut builder = RouterBuilder::new();
/// builder
///     .route(|r| {
///         r.root(|_| "ROOT!")?;
///         r.on("hello", |r| r.get("world", |_| "X world"))
///     })?
///     .use_middleware(Trace)?;
///
/// let router = builder.build();
/// let res = router.handle(&Env::new("GET", "/hello/world"))?;
/// assert_eq!(res.body, ["X world"]);
/// # Ok::<(), ramify::Error>(())
/// ```
pub struct RouterBuilder {
    route: Option<BoxedHandler>,
    middleware: Vec<Arc<dyn Middleware>>,
    options: Options,
    plugins: Vec<String>,
    frozen: bool,
    app: App,
}

impl RouterBuilder {
    pub fn new() -> Self {
        let options = Options::default();
        let app = dispatcher(None, options.default_headers.clone());
        Self {
            route: None,
            middleware: Vec::new(),
            options,
            plugins: Vec::new(),
            frozen: false,
            app,
        }
    }

    /// A child configuration. Middleware, options and the loaded-plugin set
    /// are copied; the route specification is shared. The child starts
    /// unfrozen whatever the parent's state.
    pub fn derive(&self) -> Self {
        Self {
            route: self.route.clone(),
            middleware: self.middleware.clone(),
            options: self.options.clone(),
            plugins: self.plugins.clone(),
            frozen: false,
            app: self.app.clone(),
        }
    }

    /// Sets (replaces) the route specification.
    pub fn route<F>(&mut self, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(&mut Request) -> Flow + Send + Sync + 'static,
    {
        self.ensure_mutable("change the route specification")?;
        self.route = Some(Arc::new(handler));
        self.rebuild();
        Ok(self)
    }

    /// Appends `middleware`; it wraps everything registered after it.
    pub fn use_middleware(&mut self, middleware: impl Middleware) -> Result<&mut Self, Error> {
        self.ensure_mutable("add middleware")?;
        self.middleware.push(Arc::new(middleware));
        self.rebuild();
        Ok(self)
    }

    pub fn set_default_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        self.ensure_mutable("change default headers")?;
        response::insert_header(&mut self.options.default_headers, name.into(), value.into());
        self.rebuild();
        Ok(self)
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, Error> {
        self.ensure_mutable("change options")?;
        self.options.settings.insert(key.into(), value.into());
        Ok(self)
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.settings.get(key).map(String::as_str)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Loads `plugin` (dependencies come from the process-wide registry).
    pub fn plugin(&mut self, plugin: impl Plugin) -> Result<&mut Self, Error> {
        self.ensure_mutable("load a plugin")?;
        self.install(plugin::registry(), Arc::new(plugin))?;
        Ok(self)
    }

    /// Loads the plugin registered as `name` in the process-wide registry.
    pub fn load_plugin(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.load_plugin_from(plugin::registry(), name)
    }

    pub fn load_plugin_from(&mut self, registry: &PluginRegistry, name: &str) -> Result<&mut Self, Error> {
        self.ensure_mutable("load a plugin")?;
        let plugin = registry.get(name)?;
        self.install(registry, plugin)?;
        Ok(self)
    }

    /// Names of the plugins loaded so far, in load order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Rejects every further configuration change.
    pub fn freeze(&mut self) -> &mut Self {
        self.frozen = true;
        debug!("router configuration frozen");
        self
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The application as currently configured.
    pub fn app(&self) -> App {
        self.app.clone()
    }

    /// The immutable router.
    pub fn build(self) -> Router {
        info!(
            middleware = self.middleware.len(),
            plugins = self.plugins.len(),
            has_routes = self.route.is_some(),
            "router built"
        );
        Router { app: self.app, options: Arc::new(self.options) }
    }

    fn ensure_mutable(&self, action: &'static str) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::ConfigurationFrozen(action));
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        let base = dispatcher(self.route.clone(), self.options.default_headers.clone());
        self.app = middleware::build_app(base, &self.middleware);
        debug!(middleware = self.middleware.len(), "application rebuilt");
    }

    fn install(&mut self, registry: &PluginRegistry, plugin: Arc<dyn Plugin>) -> Result<(), Error> {
        let name = plugin.name().to_owned();
        if self.plugins.contains(&name) {
            return Ok(());
        }
        // Recorded up front so a dependency cycle terminates.
        self.plugins.push(name.clone());

        let loaded = plugin
            .dependencies()
            .iter()
            .try_for_each(|dep| self.install(registry, registry.get(dep)?))
            .and_then(|()| plugin.configure(self));
        if let Err(e) = loaded {
            self.plugins.retain(|p| *p != name);
            return Err(match e {
                Error::PluginRegistration(_) => e,
                other => Error::PluginRegistration(format!("`{name}`: {other}")),
            });
        }
        info!(plugin = %name, "plugin loaded");
        Ok(())
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The built, immutable application. Clone it freely across threads.
#[derive(Clone)]
pub struct Router {
    app: App,
    options: Arc<Options>,
}

impl Router {
    /// Serves one request.
    pub fn handle(&self, env: &Env) -> Result<Response, Error> {
        self.app.call(env)
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

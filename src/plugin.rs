//! Named configuration bundles.
//!
//! A plugin is loaded into a [`RouterBuilder`] either directly
//! ([`RouterBuilder::plugin`]) or by name from a [`PluginRegistry`]
//! ([`RouterBuilder::load_plugin`]). Loading runs the plugin's dependencies
//! first, then its [`configure`](Plugin::configure) hook against the builder.
//! Each plugin is configured at most once per builder.
//!
//! Plugins do their work through the builder's ordinary API (middleware,
//! default headers, settings), so a frozen builder rejects them like any
//! other change.
//!
//! ```rust
//! use ramify::{Error, RouterBuilder};
//! use ramify::plugin::Plugin;
//!
//! struct Json;
//!
//! impl Plugin for Json {
//!     fn name(&self) -> &str { "json" }
//!
//!     fn configure(&self, builder: &mut RouterBuilder) -> Result<(), Error> {
//!         builder.set_default_header("Content-Type", "application/json")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut builder = RouterBuilder::new();
//! builder.plugin(Json).unwrap();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::cache::Cache;
use crate::error::Error;
use crate::middleware::{HealthCheck, Trace};
use crate::router::RouterBuilder;

/// A named bundle of configuration.
pub trait Plugin: Send + Sync + 'static {
    /// Registry key. Also how the builder remembers that it was loaded.
    fn name(&self) -> &str;

    /// Names of plugins to load before this one, looked up in the registry
    /// the plugin is loaded from.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Class-level hook: adjust the builder.
    fn configure(&self, builder: &mut RouterBuilder) -> Result<(), Error>;
}

/// Plugins by name.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Cache<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `health` and `trace` plugins.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Health);
        registry.register(Tracing);
        registry
    }

    /// Registers `plugin` under its name, replacing any earlier one.
    pub fn register(&self, plugin: impl Plugin) {
        let plugin: Arc<dyn Plugin> = Arc::new(plugin);
        self.plugins.set(plugin.name().to_owned(), plugin);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Plugin>, Error> {
        self.plugins
            .get(name)
            .ok_or_else(|| Error::PluginRegistration(format!("no plugin registered as `{name}`")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.get(name).is_some()
    }
}

static REGISTRY: LazyLock<PluginRegistry> = LazyLock::new(PluginRegistry::with_builtins);

/// The process-wide registry used by [`RouterBuilder::load_plugin`].
pub fn registry() -> &'static PluginRegistry {
    &REGISTRY
}

/// Adds `plugin` to the process-wide registry.
pub fn register_plugin(plugin: impl Plugin) {
    registry().register(plugin);
}

// ── Built-ins ─────────────────────────────────────────────────────────────────

/// `health`: installs [`HealthCheck`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Health;

impl Plugin for Health {
    fn name(&self) -> &str {
        "health"
    }

    fn configure(&self, builder: &mut RouterBuilder) -> Result<(), Error> {
        builder.use_middleware(HealthCheck::new())?;
        Ok(())
    }
}

/// `trace`: installs the [`Trace`] middleware.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tracing;

impl Plugin for Tracing {
    fn name(&self) -> &str {
        "trace"
    }

    fn configure(&self, builder: &mut RouterBuilder) -> Result<(), Error> {
        builder.use_middleware(Trace)?;
        Ok(())
    }
}

/// `default_headers`: merges headers into the finalize-time defaults.
#[derive(Clone, Debug, Default)]
pub struct DefaultHeaders {
    headers: HashMap<String, String>,
}

impl DefaultHeaders {
    pub fn new<K, V>(headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers = headers.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { headers }
    }
}

impl Plugin for DefaultHeaders {
    fn name(&self) -> &str {
        "default_headers"
    }

    fn configure(&self, builder: &mut RouterBuilder) -> Result<(), Error> {
        for (name, value) in &self.headers {
            builder.set_default_header(name.clone(), value.clone())?;
        }
        Ok(())
    }
}

//! Unified error type.

use thiserror::Error as ThisError;

/// The error type returned by ramify's fallible operations.
///
/// A route that does not match is *not* an error: it falls through to the
/// next clause or to the default 404. `Error` covers the things that are
/// actually wrong: a handler returning something that cannot become a body,
/// configuration touched after [`RouterBuilder::freeze`], a plugin that
/// cannot be loaded, and the gateway adapter's socket failures.
///
/// [`RouterBuilder::freeze`]: crate::RouterBuilder::freeze
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// A route block produced a value outside {string, nothing, `false`}.
    #[error("unsupported block result: {0}")]
    UnsupportedHandlerResult(String),

    /// A mutation was attempted on a frozen [`RouterBuilder`](crate::RouterBuilder).
    #[error("configuration is frozen: cannot {0}")]
    ConfigurationFrozen(&'static str),

    /// A named plugin is unknown or failed to configure itself.
    #[error("plugin registration failed: {0}")]
    PluginRegistration(String),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

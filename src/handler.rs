//! Route blocks, their results, and the halt signal that carries a finished
//! response out of any depth of nesting.
//!
//! # How "first match wins" unwinds
//!
//! Every match method on [`Request`] returns a [`Flow`]:
//!
//! ```text
//! Ok(())                     ← nothing matched here, try the next clause
//! Err(Halt::Handled(resp))   ← a clause matched; resp is already finalized
//! Err(Halt::Error(e))        ← a block failed; nothing was finalized
//! ```
//!
//! Route blocks call match methods with `?`, so the first success skips its
//! remaining siblings *and* every pending sibling in each enclosing block:
//!
//! ```text
//! route:   r.on("a", |r| {              ← on("a") matched
//!              r.get("b", |_| "B")?;    ← matched → Err(Handled) …
//!              r.get("c", |_| "C")?;    ← … never evaluated
//!          })?;                         ← `?` forwards Err(Handled) upward
//!          r.get("d", |_| "D")?;        ← never evaluated
//! ```
//!
//! The dispatcher turns `Err(Handled)` back into the response and treats a
//! normal return as "nothing matched" (default 404).
//!
//! Blocks passed to `route` and `on` are sub-trees and return [`Flow`].
//! Blocks passed to `is`, `root` and the verb helpers are handlers: they
//! return anything that implements [`IntoBody`].

use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

// ── Halt / Flow ───────────────────────────────────────────────────────────────

/// Why route evaluation stopped early.
#[derive(Debug)]
pub enum Halt {
    /// A clause matched and the response has been finalized.
    Handled(Response),
    /// A block failed. The request is aborted without a response.
    Error(Error),
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Self::Error(e)
    }
}

/// Result of evaluating a match clause. `Ok(())` means "no match".
pub type Flow = Result<(), Halt>;

// ── IntoBody ──────────────────────────────────────────────────────────────────

/// Conversion of a block's return value into a body contribution.
///
/// | Returned            | Effect                                          |
/// |---------------------|-------------------------------------------------|
/// | `&str`, `String`    | written, if nothing was written to the body yet |
/// | `()`, `false`       | nothing                                         |
/// | `true`              | [`Error::UnsupportedHandlerResult`]             |
/// | `Option<T>`         | `None` is nothing, `Some` delegates to `T`      |
/// | `Result<T, E>`      | `Err` halts (a nested [`Flow`] forwards its halt) |
pub trait IntoBody {
    fn into_body(self) -> Result<Option<String>, Halt>;
}

impl IntoBody for () {
    fn into_body(self) -> Result<Option<String>, Halt> {
        Ok(None)
    }
}

impl IntoBody for &str {
    fn into_body(self) -> Result<Option<String>, Halt> {
        Ok(Some(self.to_owned()))
    }
}

impl IntoBody for String {
    fn into_body(self) -> Result<Option<String>, Halt> {
        Ok(Some(self))
    }
}

impl IntoBody for bool {
    fn into_body(self) -> Result<Option<String>, Halt> {
        if self {
            Err(Error::UnsupportedHandlerResult("true".to_owned()).into())
        } else {
            Ok(None)
        }
    }
}

impl<T: IntoBody> IntoBody for Option<T> {
    fn into_body(self) -> Result<Option<String>, Halt> {
        self.map_or(Ok(None), IntoBody::into_body)
    }
}

impl<T, E> IntoBody for Result<T, E>
where
    T: IntoBody,
    E: Into<Halt>,
{
    fn into_body(self) -> Result<Option<String>, Halt> {
        self.map_err(Into::into)?.into_body()
    }
}

// ── Route specification ───────────────────────────────────────────────────────

/// A type-erased route specification shared across concurrent requests.
///
/// `Arc` so that a rebuilt or derived configuration reuses the same closure
/// instead of requiring it to be `Clone`.
pub(crate) type BoxedHandler = Arc<dyn Fn(&mut Request) -> Flow + Send + Sync + 'static>;

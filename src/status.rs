//! HTTP status codes as a typed enum.
//!
//! Anything that takes a status accepts `impl Into<u16>`, so both a bare
//! code and a [`Status`] work:
//!
//! ```rust
//! use ramify::{Request, Status};
//!
//! fn created(r: &mut Request) {
//!     r.response().set_status(Status::Created);
//!     r.response().set_status(201u16);
//! }
//! ```

macro_rules! statuses {
    ($($name:ident = $code:literal,)*) => {
        /// IANA-registered HTTP status codes.
        #[allow(clippy::enum_variant_names)]
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Status {
            $($name,)*
        }

        impl Status {
            /// Numeric code, e.g. `404` for [`Status::NotFound`].
            pub const fn code(self) -> u16 {
                match self {
                    $(Self::$name => $code,)*
                }
            }

            /// Reverse lookup. Unregistered codes yield `None`.
            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

statuses! {
    // 1xx
    Continue = 100,
    SwitchingProtocols = 101,
    Processing = 102,
    EarlyHints = 103,
    // 2xx
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NonAuthoritativeInformation = 203,
    NoContent = 204,
    ResetContent = 205,
    PartialContent = 206,
    // 3xx
    MultipleChoices = 300,
    MovedPermanently = 301,
    Found = 302,
    SeeOther = 303,
    NotModified = 304,
    TemporaryRedirect = 307,
    PermanentRedirect = 308,
    // 4xx
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    NotAcceptable = 406,
    Conflict = 409,
    Gone = 410,
    UnprocessableContent = 422,
    TooManyRequests = 429,
    // 5xx
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
    GatewayTimeout = 504,
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}

/// Statuses that must not carry a body, and therefore no `Content-Type`
/// either: every 1xx, 204, 205 and 304.
pub(crate) fn forbids_body(code: u16) -> bool {
    matches!(code, 100..=199 | 204 | 205 | 304)
}

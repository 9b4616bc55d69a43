//! Path matchers.
//!
//! A matcher is a predicate with a side effect: on success it may consume a
//! prefix of the request's remaining path and push captures. Matchers never
//! undo their own partial work; [`Request::match_all`] restores the state of
//! a whole argument list when any member fails.
//!
//! | Matcher           | Matches when                                  | Consumes      |
//! |-------------------|-----------------------------------------------|---------------|
//! | `"users"`         | remaining path starts with `/users` + `/` or end | `/users`   |
//! | [`Segment`]       | remaining path starts with a non-empty segment | `/x`, captures `x` |
//! | [`Term`]          | remaining path is empty                       | nothing       |
//! | `true` / `false`  | always / never                                | nothing       |
//! | [`Method`]        | request method is equal                       | nothing       |

use crate::method::Method;
use crate::request::Request;

/// A single path predicate.
pub trait Matcher {
    fn try_match(&self, req: &mut Request) -> bool;
}

/// Requires that the whole path has been consumed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Term;

/// Captures one non-empty path segment.
///
/// `("users", Segment)` against `/users/42/posts` leaves `/posts` and
/// captures `"42"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Segment;

impl Matcher for str {
    fn try_match(&self, req: &mut Request) -> bool {
        req.match_literal(self)
    }
}

impl Matcher for String {
    fn try_match(&self, req: &mut Request) -> bool {
        req.match_literal(self)
    }
}

impl Matcher for Term {
    fn try_match(&self, req: &mut Request) -> bool {
        req.match_terminal()
    }
}

impl Matcher for Segment {
    fn try_match(&self, req: &mut Request) -> bool {
        req.match_segment()
    }
}

impl Matcher for bool {
    fn try_match(&self, _req: &mut Request) -> bool {
        *self
    }
}

impl Matcher for Method {
    fn try_match(&self, req: &mut Request) -> bool {
        *self == *req.method()
    }
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn try_match(&self, req: &mut Request) -> bool {
        (**self).try_match(req)
    }
}

// ── Argument lists ────────────────────────────────────────────────────────────

/// An ordered list of matchers, as accepted by `on`, `is` and the verbs.
///
/// Implemented for `()` (no arguments), single matchers, arrays, `Vec`s, and
/// tuples of up to six matchers.
pub trait Matchers {
    /// Runs every matcher left to right, stopping at the first failure.
    /// Does not restore state; see [`Request::match_all`].
    fn match_each(&self, req: &mut Request) -> bool;

    /// `true` when no matcher was given at all.
    fn is_empty(&self) -> bool {
        false
    }
}

impl Matchers for () {
    fn match_each(&self, _req: &mut Request) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        true
    }
}

macro_rules! single_matchers {
    ($($ty:ty),*) => {
        $(
            impl Matchers for $ty {
                fn match_each(&self, req: &mut Request) -> bool {
                    self.try_match(req)
                }
            }
        )*
    };
}

single_matchers!(&str, String, Term, Segment, bool, Method);

impl<M: Matcher, const N: usize> Matchers for [M; N] {
    fn match_each(&self, req: &mut Request) -> bool {
        self.iter().all(|m| m.try_match(req))
    }

    fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<M: Matcher> Matchers for Vec<M> {
    fn match_each(&self, req: &mut Request) -> bool {
        self.iter().all(|m| m.try_match(req))
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

macro_rules! tuple_matchers {
    ($($name:ident),+) => {
        impl<$($name: Matcher),+> Matchers for ($($name,)+) {
            #[allow(non_snake_case)]
            fn match_each(&self, req: &mut Request) -> bool {
                let ($($name,)+) = self;
                true $(&& $name.try_match(req))+
            }
        }
    };
}

tuple_matchers!(A);
tuple_matchers!(A, B);
tuple_matchers!(A, B, C);
tuple_matchers!(A, B, C, D);
tuple_matchers!(A, B, C, D, E);
tuple_matchers!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;

    fn req(method: &str, path: &str) -> Request {
        Request::new(&Env::new(method, path))
    }

    #[test]
    fn literal_consumes_whole_segments_only() {
        let mut r = req("GET", "/users/42");
        assert!("users".try_match(&mut r));
        assert_eq!(r.remaining_path(), "/42");

        let mut r = req("GET", "/usersx");
        assert!(!"users".try_match(&mut r));
        assert_eq!(r.remaining_path(), "/usersx");
    }

    #[test]
    fn literal_may_span_segments() {
        let mut r = req("GET", "/a/b/c");
        assert!("a/b".try_match(&mut r));
        assert_eq!(r.remaining_path(), "/c");
    }

    #[test]
    fn segment_captures_and_rejects_empty() {
        let mut r = req("GET", "/42/posts");
        assert!(Segment.try_match(&mut r));
        assert_eq!(r.captures(), ["42"]);
        assert_eq!(r.remaining_path(), "/posts");

        let mut r = req("GET", "//x");
        assert!(!Segment.try_match(&mut r));
        assert!(r.captures().is_empty());
    }

    #[test]
    fn bool_and_method_consume_nothing() {
        let mut r = req("POST", "/x");
        assert!(true.try_match(&mut r));
        assert!(!false.try_match(&mut r));
        assert!(Method::Post.try_match(&mut r));
        assert!(!Method::Get.try_match(&mut r));
        assert_eq!(r.remaining_path(), "/x");
    }

    #[test]
    fn emptiness_of_argument_lists() {
        assert!(Matchers::is_empty(&()));
        let none: [&str; 0] = [];
        assert!(Matchers::is_empty(&none));
        assert!(!Matchers::is_empty(&"x"));
        assert!(!Matchers::is_empty(&("x", Segment)));
        assert!(Matchers::is_empty(&Vec::<Segment>::new()));
    }
}

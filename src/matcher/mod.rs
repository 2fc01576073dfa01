//! # Matcher Module
//!
//! Pure path matching for route patterns. No state is kept between calls.
//!
//! ## Pattern syntax
//!
//! - Segments are separated by `/`.
//! - A segment starting with `:` is a named parameter capturing one or more
//!   non-`/` characters (`/users/:id`).
//! - A pattern ending in `/*` is a prefix pattern and accepts any suffix
//!   (`/users/*`). Prefix patterns never report an exact match.
//!
//! ## Matching
//!
//! Both pattern and path are normalised by [`format_path`]: a leading `/#`
//! (hash navigation marker) and a trailing `/*` are stripped, a leading slash
//! is ensured, and the root collapses to the empty string. The pattern is then
//! compiled into an anchored regex. A full match yields `exact = true`; failing
//! that, a prefix match on a segment boundary yields `exact = false`.
//!
//! ```rust
//! use brrtnav::matcher::match_path;
//!
//! let m = match_path("/users/:id", "/users/42").unwrap();
//! assert!(m.exact);
//! assert_eq!(m.params.get("id"), Some("42"));
//! assert_eq!(m.matched_prefix, "/users/42");
//!
//! let m = match_path("/users/*", "/users/42/edit").unwrap();
//! assert!(!m.exact);
//! assert_eq!(m.matched_prefix, "/users");
//! ```

mod pattern;
mod redirect;

pub use pattern::{
    format_path, match_path, CompiledPattern, ParamVec, Params, PathMatch, MAX_INLINE_PARAMS,
    WILDCARD_SUFFIX,
};
pub use redirect::redirect_url;

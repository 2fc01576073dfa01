//! # Location Module
//!
//! The canonical current location and the three navigation backends.
//!
//! ## Modes
//!
//! | Mode      | Virtual url read from             | Written with                  |
//! |-----------|-----------------------------------|-------------------------------|
//! | `history` | `pathname + search + hash`        | `push_state`/`replace_state`  |
//! | `hash`    | fragment after `#` (default `/`)  | `push_state("#" + href)`      |
//! | `memory`  | an in-process string (default `/`)| the string                    |
//!
//! History mode is the default except inside `srcdoc` documents, which start in
//! memory mode. The mode can be switched live; the location is re-dispatched in
//! the new mode.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use brrtnav::host::{Host, SimulatedHost};
//! use brrtnav::location::{LocationStore, NavigationMode};
//!
//! let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("https://app.test/").unwrap());
//! let store = LocationStore::with_mode(host, NavigationMode::Memory);
//! store.go("/users/42?tab=posts#top", false);
//!
//! let loc = store.get();
//! assert_eq!(loc.path, "/users/42");
//! assert_eq!(loc.query.get("tab").and_then(|v| v.as_str()), Some("posts"));
//! assert_eq!(loc.hash, "top");
//! ```

mod methods;
mod mode;
mod query;
mod record;
mod store;


pub use mode::NavigationMode;
pub use query::{make_query, parse_query, Query, QueryValue};
pub use record::{build_href, Location, LocationPatch};
pub use store::{LocationListener, LocationStore, NavigationCause};

//! # brrtnav
//!
//! **brrtnav** is a client-side navigation router: it tracks the current
//! document location, matches it against a tree of route patterns, decides
//! which routes are visible, applies redirects and resolves fallback ("not
//! found") routes. Same-origin link clicks become in-process navigations.
//!
//! ## Overview
//!
//! The router works the same in a browser (feature `web`), embedded in a
//! native application, or in tests: everything it needs from its
//! environment goes through the [`host::Host`] trait, and
//! [`host::SimulatedHost`] provides a complete in-process browser.
//!
//! ## Architecture
//!
//! - **[`matcher`]** - Pattern normalisation, compiled `:param`/wildcard matching, redirect splicing
//! - **[`location`]** - Location records, query codec, history/hash/memory modes, `LocationStore`
//! - **[`host`]** - The browser seam and the simulated browser
//! - **[`intercept`]** - Link click interception
//! - **[`observe`]** - Ordered, synchronous observer registry
//! - **[`settle`]** - Deferred work run at the settle point
//! - **[`route`]** - The route tree: registration, match passes, fallbacks, meta
//! - **[`router`]** - The facade composing all of the above
//! - **[`active`]** - Active-class handling for navigation links
//! - **[`table`]** - Declarative route tables
//! - **[`config`]** / **[`logging`]** - Configuration and `tracing` setup
//! - **[`cli`]** - The `brrtnav` command-line tool
//!
//! ### Navigation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant Host as Host<br/>(browser or SimulatedHost)
//!     participant Store as LocationStore
//!     participant Router as Router facade
//!     participant Node as RouteNode (parent first)
//!     participant Settle as SettleQueue
//!
//!     User->>Host: click / back / forward
//!     Host->>Router: click handler (intercepted href)
//!     Router->>Store: go(href)
//!     Store->>Host: push_state / replace_state
//!     Store->>Router: dispatch(location, cause)
//!     Router->>Node: fan-out in subscription order
//!     Node->>Node: match, redirect?, show/hide
//!     Node->>Settle: schedule fallback resolution
//!     Node->>Router: submit meta
//!     Host->>Settle: settle point
//!     Settle->>Node: resolve fallbacks
//!     Settle->>Router: publish current meta
//! ```
//!
//! ### Key Rules
//!
//! 1. **Parent before child**: a node subscribes before any of its children,
//!    so every pass sees its parent's result for the same location
//! 2. **Registration order**: first-match parents show only the first
//!    matching child in registration order
//! 3. **Redirects are replace navigations** and a chain is bounded by
//!    `max_redirects`
//! 4. **Fallbacks wait for the settle point** so a burst of mounts and
//!    unmounts completes before a "not found" is decided
//!
//! ## Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use brrtnav::host::{Host, SimulatedHost};
//! use brrtnav::route::{CallbackOutlet, RouteOptions};
//! use brrtnav::{Router, RouterConfig};
//!
//! let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("https://app.test/").unwrap());
//! let router = Router::new(host, RouterConfig::default()).unwrap();
//!
//! let home = router
//!     .route(RouteOptions::new("/"), Rc::new(CallbackOutlet::new().on_show(|| println!("home"))))
//!     .unwrap();
//! let missing = router.route(RouteOptions::fallback(), Rc::new(())).unwrap();
//! assert!(home.is_shown());
//!
//! router.goto("/nope", false);
//! router.settle();
//! assert!(missing.is_shown());
//! ```
//!
//! ## Threading
//!
//! A router and everything registered on it live on one thread (`Rc`,
//! `RefCell`). Callbacks run synchronously and may re-enter the router:
//! registering routes from an outlet's `show`, or navigating from a
//! location subscriber, are both supported.

pub mod active;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod intercept;
pub mod location;
pub mod logging;
pub mod matcher;
pub mod observe;
pub mod route;
pub mod router;
pub mod settle;
pub mod table;

pub use config::RouterConfig;
pub use error::RouterError;
pub use location::{Location, LocationStore, NavigationMode, Query, QueryValue};
pub use matcher::{match_path, PathMatch};
pub use route::{meta, Meta, RouteNode, RouteOptions, RouteOutlet};
pub use router::Router;

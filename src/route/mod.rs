//! # Route Module
//!
//! The route tree. Each registered route is a [`RouteNode`] holding its
//! resolved pattern, options, children, fallback children and the set of
//! children currently shown.
//!
//! ## Match pass
//!
//! Every node observes the router's location and re-runs a pass on each
//! change, parents before children:
//!
//! 1. Match the resolved pattern against the path.
//! 2. A matching node with a redirect (non-exact, or matched exactly) issues a
//!    replace navigation and stops; no meta is published.
//! 3. Otherwise the node's [`Meta`] is derived (absent without a match) with
//!    the parent's breadcrumb trail plus this node's label.
//! 4. The node is shown iff it matched, is not a fallback, satisfies its
//!    exactness, and no earlier sibling holds a first-match parent.
//! 5. A matched node schedules fallback resolution for the settle point.
//!
//! ## Nesting rules
//!
//! Only non-exact routes (paths ending in `/*`) that are not fallbacks can
//! have children. Violations are reported by [`RouteNode::register`].
//!
//! ```rust
//! use std::rc::Rc;
//! use brrtnav::host::{Host, SimulatedHost};
//! use brrtnav::route::RouteOptions;
//! use brrtnav::{Router, RouterConfig};
//!
//! let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("https://app.test/users/7").unwrap());
//! let router = Router::new(host, RouterConfig::default()).unwrap();
//!
//! let users = router.route(RouteOptions::new("/users/*").breadcrumb("Users"), Rc::new(())).unwrap();
//! let user = users.register(RouteOptions::new("/:id"), Rc::new(())).unwrap();
//!
//! assert!(user.is_shown());
//! let meta = user.meta().unwrap();
//! assert_eq!(meta.params.get("id"), Some("7"));
//! assert_eq!(meta.breadcrumbs[0].name, "Users");
//! ```

mod meta;
mod node;
mod options;
mod outlet;
mod state;


pub use meta::{Breadcrumb, Meta};
pub use node::{meta, MetaStore, NodeId, RouteNode};
pub use options::RouteOptions;
pub use outlet::{CallbackOutlet, RouteOutlet};
pub use state::NodeState;

//! # Router Module
//!
//! The router facade: one [`Router`] per document (or per test), composing the
//! location store, the click interceptor and the root of the route tree.
//!
//! ## Data flow
//!
//! A navigation (back/forward, [`Router::goto`], an intercepted click or a
//! redirect) reaches the location store, which dispatches the new location to
//! the router. The router publishes it to its subscribers in subscription
//! order, which is parent-before-child for route nodes. Each node re-runs its
//! match pass.
//!
//! A navigation issued while subscribers are still being notified (typically
//! a redirect) does not nest: delivery restarts from the first subscriber with
//! the newest location.
//!
//! ## Redirect chains
//!
//! Every redirect that navigates increments a counter. Any other navigation
//! (`goto`, the location store API, back/forward) resets it. Once it
//! reaches `max_redirects` further redirects are dropped with a warning, so
//! cycles such as `A -> B -> A` terminate.
//!
//! ## Settle point
//!
//! Fallback resolution and current-meta delivery run at the settle point.
//! Hosts with a scheduler trigger it themselves; otherwise call
//! [`Router::settle`] (or `SimulatedHost::tick`).

mod facade;

pub use facade::Router;
pub(crate) use facade::RouterInner;

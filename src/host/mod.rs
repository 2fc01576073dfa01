//! # Host Module
//!
//! The browser seam. Everything the router needs from the environment it runs
//! in goes through the [`Host`] trait: reading the address, writing history
//! entries, receiving back/forward and hash-change events, receiving link
//! clicks, and scheduling the settle point.
//!
//! ## Implementations
//!
//! - [`SimulatedHost`] - an in-process browser with an address, a history
//!   stack and click dispatch. Used for embedding outside a browser, by the CLI
//!   and by the test suite.
//! - `WebHost` (feature `web`) - the real browser window via `web-sys`.
//!
//! Hosts are single-threaded and shared through `Rc<dyn Host>`. Callbacks handed
//! to a host must not be invoked while the host holds any internal borrow,
//! because they re-enter the router synchronously.

mod simulated;
#[cfg(feature = "web")]
mod web;

pub use simulated::SimulatedHost;
#[cfg(feature = "web")]
pub use web::WebHost;

use crate::intercept::LinkClick;
use std::rc::Rc;

/// Callback fired by a host event
pub type HostCallback = Rc<dyn Fn()>;

/// Click handler; returns `true` when the click was handled and the default
/// browser navigation must be suppressed.
pub type ClickHandler = Rc<dyn Fn(&LinkClick) -> bool>;

/// Navigation events a host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Back/forward through the history stack
    PopState,
    /// The fragment part of the address changed
    HashChange,
}

/// Identifier of a registered click listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Environment the router runs in
pub trait Host {
    /// Path part of the address (`/users/42`)
    fn pathname(&self) -> String;

    /// Search part including the leading `?`, or empty
    fn search(&self) -> String;

    /// Fragment including the leading `#`, or empty
    fn hash(&self) -> String;

    /// Scheme, host and port (`https://example.com`)
    fn origin(&self) -> String;

    /// Whether the document is a `srcdoc` iframe, where the address cannot be
    /// written and memory navigation is the only option.
    fn is_srcdoc(&self) -> bool {
        self.pathname() == "srcdoc"
    }

    /// Push a new history entry
    fn push_state(&self, url: &str);

    /// Replace the current history entry
    fn replace_state(&self, url: &str);

    /// Install or clear the single handler for a navigation event
    fn set_navigation_handler(&self, event: HostEvent, handler: Option<HostCallback>);

    /// Listen for clicks at the document root
    fn add_click_listener(&self, handler: ClickHandler) -> ListenerId;

    fn remove_click_listener(&self, id: ListenerId);

    /// Ask the host to call `run` once the current task settles.
    ///
    /// Hosts without a scheduler ignore this; the embedder then drives the
    /// settle point through `Router::settle`.
    fn request_settle(&self, _run: HostCallback) {}
}

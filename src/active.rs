//! # Active Links
//!
//! Keeps an "active" class on navigation links whose `href` matches the
//! current location.
//!
//! A link is configured through three attributes, each also accepted in a
//! `data-` prefixed form (the prefixed form wins when both are present):
//!
//! | Attribute | Meaning |
//! |---|---|
//! | `href` | Pattern to compare with; a leading `/#`, the query, the hash and a trailing slash are ignored |
//! | `exact` | Boolean; only an exact match activates the link |
//! | `active-class` | Class to toggle, `active` by default |
//!
//! `exact` and `active-class` are removed from the element once read.
//!
//! ```
//! use std::rc::Rc;
//! use brrtnav::active::{ActiveLink, SimulatedLink};
//! use brrtnav::host::{Host, SimulatedHost};
//! use brrtnav::{Router, RouterConfig};
//!
//! let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("https://app.test/users/7").unwrap());
//! let router = Router::new(host, RouterConfig::default()).unwrap();
//!
//! let link = Rc::new(SimulatedLink::new().attr("href", "/users").attr("exact", ""));
//! let active = ActiveLink::bind(&router, link.clone());
//! assert!(!active.is_active());
//!
//! router.goto("/users", false);
//! assert!(link.has_class("active"));
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::matcher::match_path;
use crate::observe::Subscription;
use crate::router::Router;

/// Class toggled when no `active-class` is given
pub const DEFAULT_ACTIVE_CLASS: &str = "active";

/// The element side of an active link
pub trait LinkElement {
    /// Attribute value; `Some("")` for a bare boolean attribute
    fn attribute(&self, name: &str) -> Option<String>;

    fn remove_attribute(&self, name: &str);

    /// Add (`on`) or remove a class
    fn toggle_class(&self, class: &str, on: bool);
}

/// Read `name` or `data-{name}`, optionally removing both from the element.
#[must_use]
pub fn read_attr(element: &dyn LinkElement, name: &str, remove: bool) -> Option<String> {
    let mut found = None;
    for candidate in [name.to_string(), format!("data-{name}")] {
        if let Some(value) = element.attribute(&candidate) {
            found = Some(value);
        }
        if remove {
            element.remove_attribute(&candidate);
        }
    }
    found
}

/// Reduce a link `href` to the pattern it is compared with
#[must_use]
pub fn link_pattern(href: &str) -> String {
    let href = href.strip_prefix("/#").unwrap_or(href);
    let href = match href.find(['?', '#']) {
        Some(end) => &href[..end],
        None => href,
    };
    href.strip_suffix('/').unwrap_or(href).to_string()
}

/// Attributes of a link as last read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub pattern: String,
    pub exact: bool,
    pub class: String,
}

impl LinkSettings {
    /// Read settings from an element, stripping `exact` and `active-class`
    pub fn read(element: &dyn LinkElement) -> Self {
        let pattern = link_pattern(&read_attr(element, "href", false).unwrap_or_default());
        let exact = read_attr(element, "exact", true).is_some();
        let class = read_attr(element, "active-class", true)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTIVE_CLASS.to_string());
        Self {
            pattern,
            exact,
            class,
        }
    }

    /// Whether a link with these settings is active at `path`
    #[must_use]
    pub fn is_active_at(&self, path: &str) -> bool {
        match_path(&self.pattern, path).is_some_and(|m| m.exact || !self.exact)
    }
}

struct LinkInner {
    element: Rc<dyn LinkElement>,
    settings: RefCell<LinkSettings>,
    path: RefCell<String>,
    active: RefCell<bool>,
}

impl LinkInner {
    fn apply(&self) {
        let settings = self.settings.borrow().clone();
        let on = settings.is_active_at(&self.path.borrow());
        self.element.toggle_class(&settings.class, on);
        if *self.active.borrow() != on {
            debug!(pattern = %settings.pattern, active = on, "Link state changed");
        }
        *self.active.borrow_mut() = on;
    }
}

/// A link element bound to a router
///
/// The binding lives as long as this value; dropping it unsubscribes.
pub struct ActiveLink {
    inner: Rc<LinkInner>,
    _subscription: Subscription,
}

impl fmt::Debug for ActiveLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveLink")
            .field("settings", &*self.inner.settings.borrow())
            .field("active", &*self.inner.active.borrow())
            .finish()
    }
}

impl ActiveLink {
    /// Read the element's settings and keep its class in sync with the
    /// router's location.
    pub fn bind(router: &Router, element: Rc<dyn LinkElement>) -> Self {
        let settings = LinkSettings::read(element.as_ref());
        let inner = Rc::new(LinkInner {
            element,
            settings: RefCell::new(settings),
            path: RefCell::new(String::new()),
            active: RefCell::new(false),
        });
        let weak: Weak<LinkInner> = Rc::downgrade(&inner);
        let subscription = router.subscribe(move |location| {
            if let Some(inner) = weak.upgrade() {
                *inner.path.borrow_mut() = location.path.clone();
                inner.apply();
            }
        });
        Self {
            inner,
            _subscription: subscription,
        }
    }

    /// Re-read the element's attributes (after the link changed) and
    /// re-apply the class.
    pub fn refresh(&self) {
        let previous = self.inner.settings.borrow().class.clone();
        let settings = LinkSettings::read(self.inner.element.as_ref());
        if settings.class != previous {
            self.inner.element.toggle_class(&previous, false);
        }
        *self.inner.settings.borrow_mut() = settings;
        self.inner.apply();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.inner.active.borrow()
    }

    #[must_use]
    pub fn settings(&self) -> LinkSettings {
        self.inner.settings.borrow().clone()
    }
}

/// In-memory element for embedding without a DOM
#[derive(Debug, Default)]
pub struct SimulatedLink {
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<BTreeSet<String>>,
}

impl SimulatedLink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter
    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().contains_key(name)
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }
}

impl LinkElement for SimulatedLink {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }

    fn toggle_class(&self, class: &str, on: bool) {
        let mut classes = self.classes.borrow_mut();
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::host::{Host, SimulatedHost};

    fn router_at(address: &str) -> Router {
        let host: Rc<dyn Host> = Rc::new(SimulatedHost::new(address).unwrap());
        Router::new(host, RouterConfig::default()).unwrap()
    }

    #[test]
    fn test_link_pattern_stripping() {
        assert_eq!(link_pattern("/#/users/"), "/users");
        assert_eq!(link_pattern("/users?tab=1#top"), "/users");
        assert_eq!(link_pattern("/users#top"), "/users");
        assert_eq!(link_pattern("/"), "");
        assert_eq!(link_pattern(""), "");
    }

    #[test]
    fn test_read_attr_prefers_data_form_and_removes() {
        let link = SimulatedLink::new()
            .attr("active-class", "plain")
            .attr("data-active-class", "prefixed");
        assert_eq!(read_attr(&link, "active-class", true).as_deref(), Some("prefixed"));
        assert!(!link.has_attribute("active-class"));
        assert!(!link.has_attribute("data-active-class"));
        assert_eq!(read_attr(&link, "active-class", false), None);
    }

    #[test]
    fn test_settings_defaults() {
        let link = SimulatedLink::new().attr("href", "/users/");
        let settings = LinkSettings::read(&link);
        assert_eq!(settings.pattern, "/users");
        assert!(!settings.exact);
        assert_eq!(settings.class, DEFAULT_ACTIVE_CLASS);
        assert!(link.has_attribute("href"));
    }

    #[test]
    fn test_exact_and_prefix_activation() {
        let prefix = LinkSettings {
            pattern: "/users".to_string(),
            exact: false,
            class: DEFAULT_ACTIVE_CLASS.to_string(),
        };
        let exact = LinkSettings {
            exact: true,
            ..prefix.clone()
        };
        assert!(prefix.is_active_at("/users/7"));
        assert!(!exact.is_active_at("/users/7"));
        assert!(exact.is_active_at("/users"));
        assert!(!prefix.is_active_at("/teams"));
    }

    #[test]
    fn test_bound_link_follows_location() {
        let router = router_at("https://app.test/users/7");
        let link = Rc::new(
            SimulatedLink::new()
                .attr("href", "/users")
                .attr("data-active-class", "current"),
        );
        let active = ActiveLink::bind(&router, Rc::clone(&link) as Rc<dyn LinkElement>);
        assert!(active.is_active());
        assert!(link.has_class("current"));
        assert!(!link.has_attribute("data-active-class"));

        router.goto("/teams", false);
        assert!(!active.is_active());
        assert!(!link.has_class("current"));
    }

    #[test]
    fn test_refresh_rereads_attributes() {
        let router = router_at("https://app.test/users/7");
        let link = Rc::new(SimulatedLink::new().attr("href", "/users"));
        let active = ActiveLink::bind(&router, Rc::clone(&link) as Rc<dyn LinkElement>);
        assert!(link.has_class("active"));

        link.set_attribute("exact", "");
        link.set_attribute("active-class", "on");
        active.refresh();
        assert!(!active.is_active());
        assert!(!link.has_class("active"));
        assert!(!link.has_class("on"));
        assert!(active.settings().exact);
    }

    #[test]
    fn test_dropping_binding_stops_updates() {
        let router = router_at("https://app.test/");
        let link = Rc::new(SimulatedLink::new().attr("href", "/users"));
        let active = ActiveLink::bind(&router, Rc::clone(&link) as Rc<dyn LinkElement>);
        drop(active);
        assert!(!router.is_started());
        router.goto("/users", false);
        assert!(!link.has_class("active"));
    }
}

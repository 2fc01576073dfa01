//! # Click Interception
//!
//! Turns same-origin link clicks into in-process navigations.
//!
//! A click is intercepted when all of the following hold:
//!
//! - the click happened inside an anchor with an `href`;
//! - the anchor targets the same window (`target` absent or `_self`);
//! - the anchor does not carry the opt-out attribute ([`IGNORE_ATTR`] or its
//!   `data-` form);
//! - no modifier key (ctrl/meta/alt/shift) was held, since browsers use them to
//!   open new tabs and windows;
//! - the href is not external: not protocol-qualified (`https:`, `mailto:`),
//!   not fragment-only (`#top`), not protocol-relative (`//cdn.test`).
//!
//! The navigation target is the raw attribute when it is root-relative,
//! otherwise the resolved href with the current origin stripped.

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::host::{ClickHandler, Host, ListenerId};

/// Reserved boolean attribute that opts an anchor out of interception
pub const IGNORE_ATTR: &str = "nav-ignore";

/// Keyboard modifiers held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    #[must_use]
    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }
}

/// The nearest `a[href]` around a click target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute
    pub href: String,
    /// `href` resolved against the document address
    pub resolved: String,
    /// `target` attribute, if any
    pub target: Option<String>,
    /// The opt-out attribute is present
    pub ignore: bool,
}

impl Anchor {
    #[must_use]
    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// A click as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// `None` when the click was not inside a link
    pub anchor: Option<Anchor>,
    pub modifiers: Modifiers,
}

impl LinkClick {
    #[must_use]
    pub fn on(anchor: Anchor) -> Self {
        Self {
            anchor: Some(anchor),
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Decide whether a click becomes an in-process navigation.
///
/// Returns the href to navigate to, or `None` to leave the click to the
/// browser.
#[must_use]
pub fn intercept_href(click: &LinkClick, origin: &str) -> Option<String> {
    let anchor = click.anchor.as_ref()?;
    let target = anchor.target.as_deref().unwrap_or("_self");
    if target != "_self" || anchor.ignore || click.modifiers.any() {
        return None;
    }

    let href = anchor.href.strip_prefix("/#").unwrap_or(&anchor.href);
    if is_external(href) {
        return None;
    }

    if href.starts_with('/') {
        Some(href.to_string())
    } else {
        let resolved = anchor
            .resolved
            .strip_prefix(origin)
            .unwrap_or(&anchor.resolved);
        Some(resolved.to_string())
    }
}

fn is_external(href: &str) -> bool {
    if href.starts_with("//") || href.starts_with('#') {
        return true;
    }
    match href.split_once(':') {
        Some((scheme, _)) => !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}

/// Document-level click listener feeding a navigation function
///
/// Detaches itself when dropped.
pub struct ClickInterceptor {
    host: Weak<dyn Host>,
    id: Option<ListenerId>,
}

impl ClickInterceptor {
    /// Start listening for clicks on `host`; intercepted hrefs go to `go`.
    pub fn attach(host: &Rc<dyn Host>, go: Rc<dyn Fn(&str)>) -> Self {
        let weak_host = Rc::downgrade(host);
        let handler_host = Weak::clone(&weak_host);
        let handler: ClickHandler = Rc::new(move |click| {
            let Some(host) = handler_host.upgrade() else {
                return false;
            };
            match intercept_href(click, &host.origin()) {
                Some(href) => {
                    debug!(href = %href, "Link click intercepted");
                    go(&href);
                    true
                }
                None => false,
            }
        });
        let id = host.add_click_listener(handler);
        Self {
            host: weak_host,
            id: Some(id),
        }
    }

    /// Stop listening
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let (Some(id), Some(host)) = (self.id.take(), self.host.upgrade()) {
            host.remove_click_listener(id);
        }
    }
}

impl Drop for ClickInterceptor {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://app.test";

    fn anchor(href: &str, resolved: &str) -> Anchor {
        Anchor {
            href: href.to_string(),
            resolved: resolved.to_string(),
            target: None,
            ignore: false,
        }
    }

    #[test]
    fn test_root_relative_uses_raw_attribute() {
        let click = LinkClick::on(anchor("/users/1?x=1", "https://app.test/users/1?x=1"));
        assert_eq!(intercept_href(&click, ORIGIN).as_deref(), Some("/users/1?x=1"));
    }

    #[test]
    fn test_relative_uses_resolved_without_origin() {
        let click = LinkClick::on(anchor("edit", "https://app.test/users/edit"));
        assert_eq!(intercept_href(&click, ORIGIN).as_deref(), Some("/users/edit"));
    }

    #[test]
    fn test_hash_prefixed_href() {
        let click = LinkClick::on(anchor("/#/users", "https://app.test/#/users"));
        assert_eq!(intercept_href(&click, ORIGIN).as_deref(), Some("/users"));
    }

    #[test]
    fn test_external_hrefs_are_left_alone() {
        for href in ["https://other.test/", "mailto:a@b.c", "#top", "//cdn.test/x.js"] {
            let click = LinkClick::on(anchor(href, href));
            assert_eq!(intercept_href(&click, ORIGIN), None, "{href} was intercepted");
        }
    }

    #[test]
    fn test_target_ignore_and_modifiers() {
        let base = anchor("/a", "https://app.test/a");
        assert!(intercept_href(&LinkClick::on(base.clone().target("_blank")), ORIGIN).is_none());
        assert!(intercept_href(&LinkClick::on(base.clone().target("_self")), ORIGIN).is_some());
        assert!(intercept_href(&LinkClick::on(base.clone().ignored()), ORIGIN).is_none());

        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        let click = LinkClick::on(base).with_modifiers(shift);
        assert!(intercept_href(&click, ORIGIN).is_none());
    }

    #[test]
    fn test_click_outside_links() {
        assert!(intercept_href(&LinkClick::default(), ORIGIN).is_none());
    }
}

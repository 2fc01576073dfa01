use std::cell::{Cell, RefCell};

use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlAnchorElement, MouseEvent, Window};

use super::{ClickHandler, Host, HostCallback, HostEvent, ListenerId};
use crate::active::LinkElement;
use crate::intercept::{Anchor, LinkClick, Modifiers, IGNORE_ATTR};

type Listener = Closure<dyn FnMut(Event)>;

/// The real browser window
///
/// Event closures are owned by the host and removed from the window when
/// replaced or when the host is dropped.
pub struct WebHost {
    window: Window,
    popstate: RefCell<Option<Listener>>,
    hashchange: RefCell<Option<Listener>>,
    clicks: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

fn js_error(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn event_name(event: HostEvent) -> &'static str {
    match event {
        HostEvent::PopState => "popstate",
        HostEvent::HashChange => "hashchange",
    }
}

/// The enclosing `a[href]` of a click target, as the interceptor sees it
fn anchor_of(event: &Event) -> Option<Anchor> {
    let target: Element = event.target()?.dyn_into().ok()?;
    let anchor: HtmlAnchorElement = target.closest("a[href]").ok()??.dyn_into().ok()?;
    let ignore = anchor.has_attribute(IGNORE_ATTR)
        || anchor.has_attribute(&format!("data-{IGNORE_ATTR}"));
    Some(Anchor {
        href: anchor.get_attribute("href")?,
        resolved: anchor.href(),
        target: anchor.get_attribute("target").filter(|t| !t.is_empty()),
        ignore,
    })
}

impl WebHost {
    /// Host for the current window; `None` outside a browser main thread.
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        Some(Self {
            window,
            popstate: RefCell::new(None),
            hashchange: RefCell::new(None),
            clicks: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        })
    }

    fn slot(&self, event: HostEvent) -> &RefCell<Option<Listener>> {
        match event {
            HostEvent::PopState => &self.popstate,
            HostEvent::HashChange => &self.hashchange,
        }
    }

    fn click_target(&self) -> Option<EventTarget> {
        self.window.document().map(EventTarget::from)
    }

    fn remove_listener(target: &EventTarget, name: &str, listener: &Listener) {
        if let Err(e) =
            target.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
        {
            warn!(event = name, error = %js_error(&e), "Failed to remove listener");
        }
    }
}

impl Host for WebHost {
    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn hash(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }

    fn origin(&self) -> String {
        self.window.location().origin().unwrap_or_default()
    }

    fn push_state(&self, url: &str) {
        let result = self
            .window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(url)));
        if let Err(e) = result {
            warn!(url = %url, error = %js_error(&e), "pushState failed");
        }
    }

    fn replace_state(&self, url: &str) {
        let result = self
            .window
            .history()
            .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(url)));
        if let Err(e) = result {
            warn!(url = %url, error = %js_error(&e), "replaceState failed");
        }
    }

    fn set_navigation_handler(&self, event: HostEvent, handler: Option<HostCallback>) {
        let name = event_name(event);
        let slot = self.slot(event);
        if let Some(old) = slot.borrow_mut().take() {
            Self::remove_listener(&self.window, name, &old);
        }
        let Some(handler) = handler else {
            return;
        };
        let closure = Closure::wrap(Box::new(move |_: Event| handler()) as Box<dyn FnMut(Event)>);
        if let Err(e) = self
            .window
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        {
            warn!(event = name, error = %js_error(&e), "Failed to add listener");
            return;
        }
        *slot.borrow_mut() = Some(closure);
    }

    fn add_click_listener(&self, handler: ClickHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let click = LinkClick {
                anchor: anchor_of(&event),
                modifiers: Modifiers {
                    ctrl: mouse.ctrl_key(),
                    meta: mouse.meta_key(),
                    alt: mouse.alt_key(),
                    shift: mouse.shift_key(),
                },
            };
            if handler(&click) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);

        match self.click_target() {
            Some(target) => {
                if let Err(e) =
                    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                {
                    warn!(error = %js_error(&e), "Failed to add click listener");
                }
            }
            None => warn!("No document; link clicks will not be intercepted"),
        }
        self.clicks.borrow_mut().push((id, closure));
        id
    }

    fn remove_click_listener(&self, id: ListenerId) {
        let removed: Vec<(ListenerId, Listener)> = {
            let mut clicks = self.clicks.borrow_mut();
            let (gone, kept) = clicks.drain(..).partition(|(i, _)| *i == id);
            *clicks = kept;
            gone
        };
        if let Some(target) = self.click_target() {
            for (_, listener) in &removed {
                Self::remove_listener(&target, "click", listener);
            }
        }
    }

    /// Settle points run as a microtask: after the current task, before the
    /// next render.
    fn request_settle(&self, run: HostCallback) {
        let callback = Closure::once_into_js(move || run());
        self.window
            .queue_microtask(callback.unchecked_ref::<js_sys::Function>());
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        for event in [HostEvent::PopState, HostEvent::HashChange] {
            if let Some(listener) = self.slot(event).borrow_mut().take() {
                Self::remove_listener(&self.window, event_name(event), &listener);
            }
        }
        let clicks = std::mem::take(&mut *self.clicks.borrow_mut());
        if let Some(target) = self.click_target() {
            for (_, listener) in &clicks {
                Self::remove_listener(&target, "click", listener);
            }
        }
    }
}

impl LinkElement for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(e) = Element::remove_attribute(self, name) {
            warn!(attribute = name, error = %js_error(&e), "Failed to remove attribute");
        }
    }

    fn toggle_class(&self, class: &str, on: bool) {
        if let Err(e) = self.class_list().toggle_with_force(class, on) {
            warn!(class = class, error = %js_error(&e), "Failed to toggle class");
        }
    }
}

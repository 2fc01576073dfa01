use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use url::Url;

use super::{ClickHandler, Host, HostCallback, HostEvent, ListenerId};
use crate::intercept::{Anchor, LinkClick};

/// In-process browser
///
/// Keeps an address, a history stack and the registered event handlers.
/// `push_state`/`replace_state` behave like the History API: they change the
/// address without firing any event. [`back`](Self::back),
/// [`forward`](Self::forward) and [`set_hash`](Self::set_hash) behave like
/// user actions and fire `popstate`/`hashchange`.
pub struct SimulatedHost {
    state: RefCell<SimState>,
}

struct SimState {
    entries: Vec<Url>,
    index: usize,
    popstate: Option<HostCallback>,
    hashchange: Option<HostCallback>,
    clicks: Vec<(ListenerId, ClickHandler)>,
    next_listener: u64,
    settle: Vec<HostCallback>,
}

impl SimulatedHost {
    /// Create a host whose document is at `address`
    /// (e.g. `https://app.test/` or `about:srcdoc`).
    pub fn new(address: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(address)?;
        Ok(Self {
            state: RefCell::new(SimState {
                entries: vec![url],
                index: 0,
                popstate: None,
                hashchange: None,
                clicks: Vec::new(),
                next_listener: 0,
                settle: Vec::new(),
            }),
        })
    }

    /// Full current address
    #[must_use]
    pub fn address(&self) -> String {
        self.current().to_string()
    }

    /// Number of entries in the history stack
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Position in the history stack
    #[must_use]
    pub fn history_index(&self) -> usize {
        self.state.borrow().index
    }

    /// Go one entry back, firing `popstate` (and `hashchange` when only the
    /// fragment differs). Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Go one entry forward. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Change the fragment the way `location.hash = ...` does: a new history
    /// entry followed by `popstate` and `hashchange`.
    pub fn set_hash(&self, hash: &str) {
        let mut url = self.current();
        url.set_fragment(Some(hash.trim_start_matches('#')));
        self.push_entry(url);
        self.fire(HostEvent::PopState);
        self.fire(HostEvent::HashChange);
    }

    /// Build the anchor a document would report for `href`, resolving it
    /// against the current address.
    #[must_use]
    pub fn anchor(&self, href: &str) -> Anchor {
        let resolved = self
            .current()
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string());
        Anchor {
            href: href.to_string(),
            resolved,
            target: None,
            ignore: false,
        }
    }

    /// Dispatch a click to every listener. Returns `true` when a listener
    /// suppressed the default navigation.
    pub fn click(&self, click: &LinkClick) -> bool {
        let handlers: Vec<ClickHandler> = self
            .state
            .borrow()
            .clicks
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        let mut prevented = false;
        for handler in handlers {
            prevented |= handler(click);
        }
        if !prevented {
            if let Some(anchor) = &click.anchor {
                debug!(href = %anchor.href, "Click not intercepted; default navigation");
            }
        }
        prevented
    }

    /// Number of settle requests waiting for [`tick`](Self::tick)
    #[must_use]
    pub fn pending_settles(&self) -> usize {
        self.state.borrow().settle.len()
    }

    /// Run settle callbacks requested so far, like the end of a browser task.
    /// Returns how many ran.
    pub fn tick(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch = std::mem::take(&mut self.state.borrow_mut().settle);
            if batch.is_empty() {
                return ran;
            }
            for run in batch {
                run();
                ran += 1;
            }
        }
    }

    fn current(&self) -> Url {
        let state = self.state.borrow();
        state.entries[state.index].clone()
    }

    fn resolve(&self, url: &str) -> Option<Url> {
        match self.current().join(url) {
            Ok(u) => Some(u),
            Err(e) => {
                warn!(url = %url, error = %e, "Simulated host cannot resolve url");
                None
            }
        }
    }

    fn push_entry(&self, url: Url) {
        let mut state = self.state.borrow_mut();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(url);
        state.index = keep;
    }

    fn traverse(&self, delta: isize) -> bool {
        let (before, after) = {
            let mut state = self.state.borrow_mut();
            let Some(next) = state.index.checked_add_signed(delta) else {
                return false;
            };
            if next >= state.entries.len() {
                return false;
            }
            let before = state.entries[state.index].clone();
            state.index = next;
            (before, state.entries[next].clone())
        };
        self.fire(HostEvent::PopState);
        if before.fragment() != after.fragment() {
            self.fire(HostEvent::HashChange);
        }
        true
    }

    fn fire(&self, event: HostEvent) {
        let handler = {
            let state = self.state.borrow();
            match event {
                HostEvent::PopState => state.popstate.clone(),
                HostEvent::HashChange => state.hashchange.clone(),
            }
        };
        if let Some(handler) = handler {
            handler();
        }
    }
}

impl Host for SimulatedHost {
    fn pathname(&self) -> String {
        self.current().path().to_string()
    }

    fn search(&self) -> String {
        match self.current().query() {
            Some(q) if !q.is_empty() => format!("?{q}"),
            _ => String::new(),
        }
    }

    fn hash(&self) -> String {
        match self.current().fragment() {
            Some(f) if !f.is_empty() => format!("#{f}"),
            _ => String::new(),
        }
    }

    fn origin(&self) -> String {
        self.current().origin().ascii_serialization()
    }

    fn push_state(&self, url: &str) {
        if let Some(url) = self.resolve(url) {
            self.push_entry(url);
        }
    }

    fn replace_state(&self, url: &str) {
        if let Some(url) = self.resolve(url) {
            let mut state = self.state.borrow_mut();
            let index = state.index;
            state.entries[index] = url;
        }
    }

    fn set_navigation_handler(&self, event: HostEvent, handler: Option<HostCallback>) {
        let mut state = self.state.borrow_mut();
        match event {
            HostEvent::PopState => state.popstate = handler,
            HostEvent::HashChange => state.hashchange = handler,
        }
    }

    fn add_click_listener(&self, handler: ClickHandler) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.clicks.push((id, handler));
        id
    }

    fn remove_click_listener(&self, id: ListenerId) {
        self.state.borrow_mut().clicks.retain(|(i, _)| *i != id);
    }

    fn request_settle(&self, run: HostCallback) {
        self.state.borrow_mut().settle.push(run);
    }
}

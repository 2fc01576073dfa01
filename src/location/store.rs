use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use super::mode::NavigationMode;
use super::record::{build_href, Location, LocationPatch};
use crate::host::{Host, HostCallback, HostEvent};

/// Why a location was dispatched to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCause {
    /// `start` delivered the initial location
    Start,
    /// The navigation mode was switched
    ModeSwitch,
    /// Back/forward or a fragment change reported by the host
    HostEvent,
    /// `go` pushed a new entry
    Push,
    /// `go` replaced the current entry
    Replace,
}

/// Listener registered with [`LocationStore::start`]
pub type LocationListener = Rc<dyn Fn(Rc<Location>, NavigationCause)>;

struct StoreState {
    mode: NavigationMode,
    /// Mode to restore when restarting after `stop`
    resume_mode: NavigationMode,
    base: String,
    memo_url: Option<String>,
    from: Option<String>,
    /// Url of the most recent read
    last: Option<String>,
    /// Href of the most recent write; cleared by host events
    last_written: Option<String>,
    cached: Option<Rc<Location>>,
    listener: Option<LocationListener>,
}

struct StoreInner {
    host: Rc<dyn Host>,
    state: RefCell<StoreState>,
}

/// Owner of the canonical location
///
/// One instance per router; clones share state. The store reads the address
/// through its [`Host`] according to the active [`NavigationMode`], writes
/// navigations back to it, and notifies a single listener synchronously.
#[derive(Clone)]
pub struct LocationStore {
    inner: Rc<StoreInner>,
}

impl std::fmt::Debug for LocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("LocationStore")
            .field("mode", &st.mode)
            .field("base", &st.base)
            .field("last", &st.last)
            .finish()
    }
}

impl LocationStore {
    /// Create a store in the host's default mode
    pub fn new(host: Rc<dyn Host>) -> Self {
        let mode = NavigationMode::default_for(host.as_ref());
        Self::with_mode(host, mode)
    }

    pub fn with_mode(host: Rc<dyn Host>, mode: NavigationMode) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                host,
                state: RefCell::new(StoreState {
                    mode,
                    resume_mode: mode,
                    base: String::new(),
                    memo_url: None,
                    from: None,
                    last: None,
                    last_written: None,
                    cached: None,
                    listener: None,
                }),
            }),
        }
    }

    #[must_use]
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.inner.host
    }

    #[must_use]
    pub fn mode(&self) -> NavigationMode {
        self.inner.state.borrow().mode
    }

    #[must_use]
    pub fn base(&self) -> String {
        self.inner.state.borrow().base.clone()
    }

    /// Set the path prefix the app is served under (history mode only).
    /// A trailing slash is dropped.
    pub fn set_base(&self, base: &str) {
        let base = base.trim_end_matches('/').to_string();
        debug!(base = %base, "Base prefix set");
        let mut st = self.inner.state.borrow_mut();
        st.base = base;
        st.cached = None;
    }

    /// Register the listener and wire the current mode's host events.
    /// The current location is dispatched immediately.
    pub fn start(&self, listener: impl Fn(Rc<Location>, NavigationCause) + 'static) {
        let resume = {
            let mut st = self.inner.state.borrow_mut();
            st.listener = Some(Rc::new(listener));
            (st.mode == NavigationMode::Off).then_some(st.resume_mode)
        };
        self.apply_mode(resume, NavigationCause::Start);
    }

    /// Drop the listener and unwire host events
    pub fn stop(&self) {
        self.inner.state.borrow_mut().listener = None;
        self.apply_mode(Some(NavigationMode::Off), NavigationCause::ModeSwitch);
    }

    /// Switch modes live; the location in the new mode is re-dispatched.
    pub fn set_mode(&self, mode: NavigationMode) {
        self.apply_mode(Some(mode), NavigationCause::ModeSwitch);
    }

    fn apply_mode(&self, mode: Option<NavigationMode>, cause: NavigationCause) {
        let previous_url = self.get().url.clone();
        let mode = {
            let mut st = self.inner.state.borrow_mut();
            if let Some(next) = mode {
                if next == NavigationMode::Memory
                    && matches!(st.mode, NavigationMode::History | NavigationMode::Hash)
                {
                    st.memo_url = Some(previous_url);
                }
                if next != NavigationMode::Off {
                    st.resume_mode = next;
                }
                st.mode = next;
            }
            st.last_written = None;
            st.mode
        };

        let host = &self.inner.host;
        host.set_navigation_handler(HostEvent::PopState, None);
        host.set_navigation_handler(HostEvent::HashChange, None);
        match mode {
            NavigationMode::History => {
                host.set_navigation_handler(HostEvent::PopState, Some(self.event_handler()));
            }
            NavigationMode::Hash => {
                host.set_navigation_handler(HostEvent::HashChange, Some(self.event_handler()));
            }
            NavigationMode::Memory | NavigationMode::Off => {}
        }

        info!(mode = %mode, cause = ?cause, "Navigation mode applied");
        if mode != NavigationMode::Off {
            self.dispatch(cause);
        }
    }

    fn event_handler(&self) -> HostCallback {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                LocationStore { inner }.on_host_event();
            }
        })
    }

    fn on_host_event(&self) {
        {
            let mut st = self.inner.state.borrow_mut();
            st.last_written = None;
            st.from = st.last.clone();
        }
        debug!("Host navigation event");
        self.dispatch(NavigationCause::HostEvent);
    }

    /// Current location.
    ///
    /// Reads are cached by raw url: an unchanged address returns the same
    /// `Rc` without re-parsing.
    #[must_use]
    pub fn get(&self) -> Rc<Location> {
        let url = self.read_url();
        let mut st = self.inner.state.borrow_mut();
        if let Some(cached) = &st.cached {
            if cached.url == url {
                return Rc::clone(cached);
            }
        }
        let location = Rc::new(Location::parse(&url, st.from.clone()));
        debug!(url = %url, path = %location.path, "Location parsed");
        st.last = Some(url);
        st.cached = Some(Rc::clone(&location));
        location
    }

    fn read_url(&self) -> String {
        let (mode, base, memo) = {
            let st = self.inner.state.borrow();
            (st.mode, st.base.clone(), st.memo_url.clone())
        };
        let host = &self.inner.host;
        match mode {
            NavigationMode::History => {
                let pathname = host.pathname();
                // the base only applies on a segment boundary
                let path = match pathname.strip_prefix(base.as_str()) {
                    _ if base.is_empty() => pathname.as_str(),
                    Some("") => "/",
                    Some(rest) if rest.starts_with('/') => rest,
                    _ => pathname.as_str(),
                };
                format!("{}{}{}", path, host.search(), host.hash())
            }
            NavigationMode::Hash => {
                let hash = host.hash();
                match hash.strip_prefix('#') {
                    Some(v) if !v.is_empty() => v.to_string(),
                    _ => "/".to_string(),
                }
            }
            NavigationMode::Memory | NavigationMode::Off => {
                memo.unwrap_or_else(|| "/".to_string())
            }
        }
    }

    /// Navigate to `href`.
    ///
    /// A no-op (returning `false`) when `href` is the current url or the href
    /// that was just written. Otherwise the address is written through the
    /// active backend and the listener is notified synchronously.
    pub fn go(&self, href: &str, replace: bool) -> bool {
        let current = self.get();
        if current.url == href {
            debug!(href = %href, "Already at location");
            return false;
        }
        if self.inner.state.borrow().last_written.as_deref() == Some(href) {
            debug!(href = %href, "Duplicate navigation suppressed");
            return false;
        }

        self.write(href, replace);
        self.dispatch(if replace {
            NavigationCause::Replace
        } else {
            NavigationCause::Push
        });
        true
    }

    fn write(&self, href: &str, replace: bool) {
        let (mode, base) = {
            let mut st = self.inner.state.borrow_mut();
            st.last_written = Some(href.to_string());
            if !replace {
                st.from = st.last.clone();
            }
            if matches!(st.mode, NavigationMode::Memory | NavigationMode::Off) {
                st.memo_url = Some(href.to_string());
            }
            (st.mode, st.base.clone())
        };

        let host = &self.inner.host;
        let url = match mode {
            NavigationMode::History => format!("{base}{href}"),
            NavigationMode::Hash => format!("#{href}"),
            NavigationMode::Memory | NavigationMode::Off => String::new(),
        };
        if !url.is_empty() {
            if replace {
                host.replace_state(&url);
            } else {
                host.push_state(&url);
            }
        }
        info!(href = %href, replace, mode = %mode, "Navigation written");
    }

    /// Merge `patch` onto the current location and navigate there.
    ///
    /// Patches without a `path` replace the current entry.
    pub fn set(&self, patch: LocationPatch) -> bool {
        let current = self.get();
        let replace = patch.path.is_none();
        let path = patch.path.unwrap_or_else(|| current.path.clone());
        let query = patch.query.unwrap_or_else(|| current.query.clone());
        let hash = patch.hash.unwrap_or_else(|| current.hash.clone());
        self.go(&build_href(&path, &query, &hash), replace)
    }

    fn dispatch(&self, cause: NavigationCause) {
        let listener = self.inner.state.borrow().listener.clone();
        if let Some(listener) = listener {
            listener(self.get(), cause);
        }
    }
}

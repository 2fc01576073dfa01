use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::host::Host;
use crate::intercept::ClickInterceptor;
use crate::location::{Location, LocationStore, NavigationCause, NavigationMode};
use crate::observe::{Observable, Subscription};
use crate::route::{Breadcrumb, Meta, NodeId, RouteNode, RouteOptions, RouteOutlet};
use crate::settle::{SettleKey, SettleQueue};

pub(crate) struct RouterInner {
    config: RouterConfig,
    host: Rc<dyn Host>,
    location: LocationStore,
    current: Observable<Rc<Location>>,
    root: RouteNode,
    settle: SettleQueue,
    /// Redirects issued since the last user navigation
    redirects: Cell<usize>,
    /// Set while `redirect` writes its own navigation
    redirecting: Cell<bool>,
    breadcrumbs: Observable<Vec<Breadcrumb>>,
    current_meta: Observable<Option<Rc<Meta>>>,
    /// Meta waiting for the settle point; the outer `Option` is "anything pending"
    pending_meta: RefCell<Option<Option<Rc<Meta>>>>,
    next_node: Cell<u64>,
    interceptor: RefCell<Option<ClickInterceptor>>,
    started: Cell<bool>,
}

/// The subscribable entry point every route observes
///
/// Composes a [`LocationStore`] and a [`ClickInterceptor`]. The location store
/// is started when the first subscriber arrives and stopped when the last one
/// leaves. Clones share one router.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("mode", &self.inner.location.mode())
            .field("started", &self.inner.started.get())
            .field("subscribers", &self.inner.current.subscriber_count())
            .finish()
    }
}

impl Router {
    /// Create a router over `host`.
    ///
    /// # Errors
    ///
    /// Only fails if the root pattern cannot be compiled.
    pub fn new(host: Rc<dyn Host>, config: RouterConfig) -> Result<Self, RouterError> {
        let location = match config.mode {
            Some(mode) => LocationStore::with_mode(Rc::clone(&host), mode),
            None => LocationStore::new(Rc::clone(&host)),
        };
        if !config.base.is_empty() {
            location.set_base(&config.base);
        }
        let initial = location.get();
        let root_matcher = RouteNode::root_matcher()?;

        let inner = Rc::new_cyclic(|weak: &Weak<RouterInner>| {
            let current = Observable::new(initial);
            let idle = Weak::clone(weak);
            current.on_idle(Rc::new(move || {
                if let Some(inner) = idle.upgrade() {
                    Router { inner }.stop();
                }
            }));
            RouterInner {
                config,
                host,
                location,
                current,
                root: RouteNode::root(Weak::clone(weak), root_matcher),
                settle: SettleQueue::new(),
                redirects: Cell::new(0),
                redirecting: Cell::new(false),
                breadcrumbs: Observable::new(Vec::new()),
                current_meta: Observable::new(None),
                pending_meta: RefCell::new(None),
                next_node: Cell::new(1),
                interceptor: RefCell::new(None),
                started: Cell::new(false),
            }
        });

        info!(
            mode = %inner.location.mode(),
            base = %inner.location.base(),
            intercept_clicks = inner.config.intercept_clicks,
            "Router created"
        );
        Ok(Router { inner })
    }

    pub(crate) fn upgrade(weak: &Weak<RouterInner>) -> Option<Router> {
        weak.upgrade().map(|inner| Router { inner })
    }

    fn downgrade(&self) -> Weak<RouterInner> {
        Rc::downgrade(&self.inner)
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.inner.host
    }

    /// The location store, including the query/hash helpers
    #[must_use]
    pub fn location(&self) -> &LocationStore {
        &self.inner.location
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Root of the route tree
    #[must_use]
    pub fn root(&self) -> RouteNode {
        self.inner.root.clone()
    }

    /// Register a top-level route
    ///
    /// # Errors
    ///
    /// See [`RouteNode::register`].
    pub fn route(
        &self,
        options: RouteOptions,
        outlet: Rc<dyn RouteOutlet>,
    ) -> Result<RouteNode, RouterError> {
        self.inner.root.register(options, outlet)
    }

    /// Observe the location. The listener is called right away with the
    /// current location; the first subscriber starts the router.
    pub fn subscribe(&self, listener: impl Fn(&Rc<Location>) + 'static) -> Subscription {
        self.start();
        self.inner.current.subscribe(listener)
    }

    /// Current location as last dispatched to subscribers
    #[must_use]
    pub fn current_location(&self) -> Rc<Location> {
        if self.inner.started.get() {
            self.inner.current.get()
        } else {
            self.inner.location.get()
        }
    }

    /// Start listening to the host; a no-op when already started
    pub fn start(&self) {
        if self.inner.started.replace(true) {
            return;
        }
        let weak = self.downgrade();
        self.inner.location.start(move |location, cause| {
            if let Some(router) = Router::upgrade(&weak) {
                router.dispatch(location, cause);
            }
        });

        if self.inner.config.intercept_clicks {
            let weak = self.downgrade();
            let go: Rc<dyn Fn(&str)> = Rc::new(move |href: &str| {
                if let Some(router) = Router::upgrade(&weak) {
                    router.goto(href, false);
                }
            });
            let interceptor = ClickInterceptor::attach(&self.inner.host, go);
            *self.inner.interceptor.borrow_mut() = Some(interceptor);
        }
        info!(mode = %self.inner.location.mode(), "Router started");
    }

    /// Stop listening to the host and detach the click interceptor
    pub fn stop(&self) {
        if !self.inner.started.replace(false) {
            return;
        }
        self.inner.location.stop();
        let interceptor = self.inner.interceptor.borrow_mut().take();
        drop(interceptor);
        info!("Router stopped");
    }

    fn dispatch(&self, location: Rc<Location>, cause: NavigationCause) {
        // any navigation not written by `redirect` starts a new chain
        if !self.inner.redirecting.get() {
            self.inner.redirects.set(0);
        }
        debug!(url = %location.url, cause = ?cause, "Location dispatched");
        self.inner.current.set(location);
    }

    /// Navigate to `href`; returns `false` when the navigation was a no-op.
    ///
    /// Starts a new redirect chain.
    pub fn goto(&self, href: &str, replace: bool) -> bool {
        self.inner.redirects.set(0);
        info!(href = %href, replace, "Navigation requested");
        self.inner.location.go(href, replace)
    }

    /// Replace navigation issued by a redirecting route.
    ///
    /// Suppressed once the chain reaches `max_redirects`. Only redirects
    /// that actually navigate count towards the limit.
    pub fn redirect(&self, href: &str) -> bool {
        let count = self.inner.redirects.get();
        if count >= self.inner.config.max_redirects {
            warn!(
                href = %href,
                count,
                limit = self.inner.config.max_redirects,
                "Redirect chain limit reached; redirect suppressed"
            );
            return false;
        }
        self.inner.redirects.set(count + 1);
        let outer = self.inner.redirecting.replace(true);
        let moved = self.inner.location.go(href, true);
        self.inner.redirecting.set(outer);
        if !moved {
            self.inner.redirects.set(count);
        }
        moved
    }

    /// Redirects issued since the last user navigation
    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.inner.redirects.get()
    }

    pub fn mode_hash(&self) {
        self.inner.location.set_mode(NavigationMode::Hash);
    }

    pub fn mode_history(&self) {
        self.inner.location.set_mode(NavigationMode::History);
    }

    pub fn mode_memory(&self) {
        self.inner.location.set_mode(NavigationMode::Memory);
    }

    #[must_use]
    pub fn mode(&self) -> NavigationMode {
        self.inner.location.mode()
    }

    /// Set the history-mode path prefix; a running router re-dispatches.
    pub fn set_base(&self, prefix: &str) {
        self.inner.location.set_base(prefix);
        if self.inner.started.get() {
            self.inner.location.set_mode(self.inner.location.mode());
        }
    }

    /// Breadcrumb trail of the most recently shown route
    #[must_use]
    pub fn breadcrumbs(&self) -> Observable<Vec<Breadcrumb>> {
        self.inner.breadcrumbs.clone()
    }

    /// Meta of the deepest shown route, delivered at the settle point
    #[must_use]
    pub fn current_meta(&self) -> Observable<Option<Rc<Meta>>> {
        self.inner.current_meta.clone()
    }

    /// Run deferred work (fallback resolution, meta delivery) now.
    ///
    /// Hosts with a scheduler call this on their own; returns the number of
    /// tasks run.
    pub fn settle(&self) -> usize {
        self.inner.settle.run()
    }

    /// Whether deferred work is waiting for the settle point
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.settle.is_empty()
    }

    pub(crate) fn next_node_id(&self) -> NodeId {
        let id = self.inner.next_node.get();
        self.inner.next_node.set(id + 1);
        NodeId(id)
    }

    pub(crate) fn schedule(&self, key: SettleKey, task: Rc<dyn Fn()>) {
        if self.inner.settle.schedule(key, task) {
            let weak = self.downgrade();
            self.inner.host.request_settle(Rc::new(move || {
                if let Some(router) = Router::upgrade(&weak) {
                    router.settle();
                }
            }));
        }
    }

    /// A shown route publishes its breadcrumb trail and submits its meta
    pub(crate) fn announce(&self, meta: &Rc<Meta>) {
        self.inner.breadcrumbs.set_if_changed(meta.breadcrumbs.clone());
        self.submit_meta(Some(Rc::clone(meta)));
    }

    /// Queue meta for delivery at the settle point. The last submission
    /// wins, except that an absent one never replaces a pending present one.
    pub(crate) fn submit_meta(&self, meta: Option<Rc<Meta>>) {
        {
            let mut pending = self.inner.pending_meta.borrow_mut();
            if meta.is_none() && matches!(*pending, Some(Some(_))) {
                return;
            }
            *pending = Some(meta);
        }
        let weak = self.downgrade();
        self.schedule(
            SettleKey::Meta,
            Rc::new(move || {
                if let Some(router) = Router::upgrade(&weak) {
                    router.flush_meta();
                }
            }),
        );
    }

    fn flush_meta(&self) {
        let pending = self.inner.pending_meta.borrow_mut().take();
        if let Some(meta) = pending {
            if self.inner.current_meta.set_if_changed(meta) {
                debug!("Current meta published");
            }
        }
    }
}

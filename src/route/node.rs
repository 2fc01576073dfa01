use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use super::meta::{Breadcrumb, Meta};
use super::options::RouteOptions;
use super::outlet::RouteOutlet;
use super::state::{NodeState, PassGuard, PassState};
use crate::error::RouterError;
use crate::location::Location;
use crate::matcher::{redirect_url, CompiledPattern, PathMatch};
use crate::observe::{Observable, Subscription};
use crate::router::{Router, RouterInner};
use crate::settle::SettleKey;

/// Identity of a route node within one router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Store carrying a node's meta; `None` while the node does not match
pub type MetaStore = Observable<Option<Rc<Meta>>>;

struct NodeInner {
    id: NodeId,
    router: Weak<RouterInner>,
    parent: Option<Weak<RefCell<NodeInner>>>,
    options: RouteOptions,
    matcher: CompiledPattern,
    outlet: Rc<dyn RouteOutlet>,
    /// Non-fallback children in registration order
    children: Vec<RouteNode>,
    fallbacks: Vec<RouteNode>,
    /// Children currently shown
    active: Vec<NodeId>,
    state: NodeState,
    meta: MetaStore,
    subscription: Option<Subscription>,
    match_pass: Rc<Cell<PassState>>,
    fallback_pass: Rc<Cell<PassState>>,
    root: bool,
    detached: bool,
}

/// A node of the route tree
///
/// Handles are cheap clones of one shared node. A parent owns its children;
/// children only hold a weak back-reference, so dropping the router drops the
/// whole tree.
#[derive(Clone)]
pub struct RouteNode(Rc<RefCell<NodeInner>>);

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => f
                .debug_struct("RouteNode")
                .field("id", &inner.id)
                .field("pattern", &inner.matcher.pattern())
                .field("state", &inner.state)
                .field("children", &inner.children.len())
                .field("fallbacks", &inner.fallbacks.len())
                .finish(),
            Err(_) => f.write_str("RouteNode(<busy>)"),
        }
    }
}

/// Resolve a route path against its parent's pattern
fn join_pattern(parent: &str, path: &str) -> String {
    let joined = format!("{}/{}", parent, path.trim_start_matches('/'));
    joined.trim_end_matches('/').to_string()
}

fn compile(raw: &str) -> Result<CompiledPattern, RouterError> {
    CompiledPattern::new(raw)
        .map_err(|e| RouterError::InvalidConfig(format!("route pattern '{raw}': {e}")))
}

impl RouteNode {
    /// Pattern of the root sentinel: empty and non-exact
    pub(crate) fn root_matcher() -> Result<CompiledPattern, RouterError> {
        compile(&join_pattern("", &RouteOptions::default().path))
    }

    /// Root sentinel, always matched
    pub(crate) fn root(router: Weak<RouterInner>, matcher: CompiledPattern) -> Self {
        Self::from_parts(
            NodeId(0),
            router,
            None,
            RouteOptions::default(),
            matcher,
            Rc::new(()),
            true,
        )
    }

    fn from_parts(
        id: NodeId,
        router: Weak<RouterInner>,
        parent: Option<Weak<RefCell<NodeInner>>>,
        options: RouteOptions,
        matcher: CompiledPattern,
        outlet: Rc<dyn RouteOutlet>,
        root: bool,
    ) -> Self {
        Self(Rc::new(RefCell::new(NodeInner {
            id,
            router,
            parent,
            options,
            matcher,
            outlet,
            children: Vec::new(),
            fallbacks: Vec::new(),
            active: Vec::new(),
            state: NodeState::Unmatched,
            meta: Observable::new(None),
            subscription: None,
            match_pass: Rc::new(Cell::new(PassState::Idle)),
            fallback_pass: Rc::new(Cell::new(PassState::Idle)),
            root,
            detached: false,
        })))
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.0.borrow().id
    }

    /// Resolved, normalised pattern (`/users/:id`, root is `""`)
    #[must_use]
    pub fn pattern(&self) -> String {
        self.0.borrow().matcher.pattern().to_string()
    }

    #[must_use]
    pub fn options(&self) -> RouteOptions {
        self.0.borrow().options.clone()
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        let inner = self.0.borrow();
        !inner.root && inner.options.is_exact()
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.0.borrow().options.fallback
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.borrow().root
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.0.borrow().detached
    }

    #[must_use]
    pub fn state(&self) -> NodeState {
        self.0.borrow().state
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.state().is_shown()
    }

    #[must_use]
    pub fn parent(&self) -> Option<RouteNode> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(RouteNode)
    }

    #[must_use]
    pub fn children(&self) -> Vec<RouteNode> {
        self.0.borrow().children.clone()
    }

    #[must_use]
    pub fn fallbacks(&self) -> Vec<RouteNode> {
        self.0.borrow().fallbacks.clone()
    }

    /// Children currently shown, in registration order
    #[must_use]
    pub fn active_children(&self) -> Vec<RouteNode> {
        let inner = self.0.borrow();
        inner
            .children
            .iter()
            .filter(|c| inner.active.contains(&c.id()))
            .cloned()
            .collect()
    }

    /// Current meta, `None` when the node does not match
    #[must_use]
    pub fn meta(&self) -> Option<Rc<Meta>> {
        self.0.borrow().meta.get()
    }

    #[must_use]
    pub fn meta_store(&self) -> MetaStore {
        self.0.borrow().meta.clone()
    }

    /// Observe this node's meta; called right away and on every change,
    /// including the transition to absent.
    pub fn subscribe_meta(&self, listener: impl Fn(Option<&Meta>) + 'static) -> Subscription {
        self.meta_store()
            .subscribe(move |meta: &Option<Rc<Meta>>| listener(meta.as_deref()))
    }

    fn router(&self) -> Option<Router> {
        Router::upgrade(&self.0.borrow().router)
    }

    fn same(&self, other: &RouteNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Register a child route.
    ///
    /// The child is attached to `children` or `fallbacks` according to
    /// `options.fallback` and matched right away.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when this node is exact, is a fallback,
    /// or has been unregistered.
    pub fn register(
        &self,
        options: RouteOptions,
        outlet: Rc<dyn RouteOutlet>,
    ) -> Result<RouteNode, RouterError> {
        let (router_ref, raw, subscribed) = {
            let inner = self.0.borrow();
            let parent = inner.matcher.pattern().to_string();
            if inner.detached {
                return Err(RouterError::Detached { pattern: parent });
            }
            if !inner.root && inner.options.fallback {
                return Err(RouterError::NestedUnderFallback {
                    parent,
                    child: options.path,
                });
            }
            if !inner.root && inner.options.is_exact() {
                return Err(RouterError::NestedUnderExact {
                    parent,
                    child: options.path,
                });
            }
            (
                Weak::clone(&inner.router),
                join_pattern(&parent, &options.path),
                inner.subscription.is_some(),
            )
        };
        let router = Router::upgrade(&router_ref).ok_or_else(|| RouterError::Detached {
            pattern: raw.clone(),
        })?;
        let matcher = compile(&raw)?;

        // Parents subscribe before children so fan-out stays parent-first
        if !subscribed {
            self.match_location();
        }

        let fallback = options.fallback;
        let node = RouteNode::from_parts(
            router.next_node_id(),
            router_ref,
            Some(Rc::downgrade(&self.0)),
            options,
            matcher,
            outlet,
            false,
        );
        {
            let mut inner = self.0.borrow_mut();
            if fallback {
                inner.fallbacks.push(node.clone());
            } else {
                inner.children.push(node.clone());
            }
        }
        info!(
            id = %node.id(),
            pattern = %node.pattern(),
            fallback,
            "Route registered"
        );

        node.match_location();
        self.schedule_fallbacks(&router);
        Ok(node)
    }

    /// Run a match pass against the router's current location.
    ///
    /// A call made while a pass is already running on this node returns
    /// immediately; the running pass repeats once if the location moved in
    /// the meantime.
    pub fn match_location(&self) {
        let cell = {
            let inner = self.0.borrow();
            if inner.detached {
                return;
            }
            Rc::clone(&inner.match_pass)
        };
        let Some(guard) = PassGuard::enter(&cell) else {
            debug!(id = %self.id(), "Match pass already running");
            return;
        };
        let Some(router) = self.router() else {
            return;
        };

        self.ensure_subscribed(&router);
        loop {
            let location = router.current_location();
            self.run_pass(&router, &location);
            if !guard.take_rerun() || Rc::ptr_eq(&location, &router.current_location()) {
                break;
            }
        }
    }

    fn ensure_subscribed(&self, router: &Router) {
        if self.0.borrow().subscription.is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.0);
        let subscription = router.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                RouteNode(inner).match_location();
            }
        });
        self.0.borrow_mut().subscription = Some(subscription);
    }

    fn run_pass(&self, router: &Router, location: &Rc<Location>) {
        let parent = self.parent();
        let (root, fallback, exact, redirect, label, pattern, matched, outlet) = {
            let inner = self.0.borrow();
            if inner.detached {
                return;
            }
            (
                inner.root,
                inner.options.fallback,
                !inner.root && inner.options.is_exact(),
                inner.options.redirect.clone(),
                inner.options.breadcrumb.clone(),
                inner.matcher.pattern().to_string(),
                inner.matcher.match_path(&location.path),
                Rc::clone(&inner.outlet),
            )
        };
        debug!(
            pattern = %pattern,
            path = %location.path,
            matched = matched.is_some(),
            "Route match attempt"
        );

        if let (Some(m), Some(slug), false) = (&matched, &redirect, fallback || root) {
            if !exact || m.exact {
                let parent_pattern = parent.as_ref().map(RouteNode::pattern);
                let target = redirect_url(&location.path, parent_pattern.as_deref(), slug);
                info!(pattern = %pattern, from = %location.url, to = %target, "Route redirect");
                router.redirect(&target);
                return;
            }
        }

        let is_match = matched.is_some();
        let eligible = matched
            .as_ref()
            .is_some_and(|m| !fallback && (!exact || m.exact));
        let visible = eligible && !self.preceded_by_shown_sibling(parent.as_ref());

        let meta = matched.map(|m| Rc::new(build_meta(m, location, parent.as_ref(), label.as_deref(), pattern)));
        let changed = self.meta_store().set_if_changed(meta.clone());

        if root {
            self.0.borrow_mut().state = if is_match {
                NodeState::MatchedShown
            } else {
                NodeState::Unmatched
            };
            self.schedule_fallbacks(router);
            return;
        }

        if visible {
            let newly = self.show();
            if changed && !newly {
                if let Some(meta) = &meta {
                    outlet.meta(meta);
                }
            }
        } else {
            self.hide();
            router.submit_meta(None);
        }

        if is_match && !fallback {
            self.schedule_fallbacks(router);
        }
    }

    /// First-match parents show only their first matching child. Earlier
    /// siblings have already run for the current location because siblings
    /// are notified in registration order.
    fn preceded_by_shown_sibling(&self, parent: Option<&RouteNode>) -> bool {
        let Some(parent) = parent else {
            return false;
        };
        let p = parent.0.borrow();
        if !p.options.firstmatch {
            return false;
        }
        for sibling in &p.children {
            if sibling.same(self) {
                return false;
            }
            if sibling.0.borrow().state.is_shown() {
                return true;
            }
        }
        false
    }

    /// Make the node visible.
    ///
    /// Registers it among the parent's active children (unless it is a
    /// fallback) and announces its meta to the router. The outlet's `show`
    /// only runs on the transition; returns whether one happened.
    pub fn show(&self) -> bool {
        let (was, outlet, fallback, id, meta) = {
            let mut inner = self.0.borrow_mut();
            if inner.detached || inner.root {
                return false;
            }
            let was = inner.state;
            inner.state = NodeState::MatchedShown;
            (
                was,
                Rc::clone(&inner.outlet),
                inner.options.fallback,
                inner.id,
                inner.meta.get(),
            )
        };
        if !fallback {
            if let Some(parent) = self.parent() {
                let mut p = parent.0.borrow_mut();
                if !p.active.contains(&id) {
                    p.active.push(id);
                }
            }
        }
        if let (Some(router), Some(meta)) = (self.router(), &meta) {
            router.announce(meta);
        }
        if was.is_shown() {
            return false;
        }

        debug!(id = %id, "Route shown");
        outlet.show();
        if let Some(meta) = &meta {
            outlet.meta(meta);
        }
        true
    }

    /// Make the node invisible; returns whether it was shown before
    pub fn hide(&self) -> bool {
        let (was, outlet, id) = {
            let mut inner = self.0.borrow_mut();
            if inner.root {
                return false;
            }
            let was = inner.state;
            inner.state = if inner.meta.get().is_some() {
                NodeState::MatchedHidden
            } else {
                NodeState::Unmatched
            };
            (was, Rc::clone(&inner.outlet), inner.id)
        };
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().active.retain(|a| *a != id);
        }
        if !was.is_shown() {
            return false;
        }

        debug!(id = %id, "Route hidden");
        outlet.hide();
        true
    }

    fn schedule_fallbacks(&self, router: &Router) {
        let weak = Rc::downgrade(&self.0);
        router.schedule(
            SettleKey::Fallback(self.id()),
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    RouteNode(inner).resolve_fallbacks();
                }
            }),
        );
    }

    /// Decide whether this node needs a fallback and show it.
    ///
    /// Normally run at the settle point after a pass matched this node. When
    /// the node has children but none is active, or has only fallback
    /// children, the nearest node upward with fallback children supplies
    /// them: the first redirect fallback navigates and suppresses the rest,
    /// otherwise every plain fallback is shown.
    pub fn resolve_fallbacks(&self) {
        if !self.needs_fallback() {
            self.release_fallbacks();
            return;
        }
        let cell = Rc::clone(&self.0.borrow().fallback_pass);
        let Some(_guard) = PassGuard::enter(&cell) else {
            return;
        };
        let Some(router) = self.router() else {
            return;
        };
        let location = router.current_location();

        let mut holder = self.clone();
        while holder.0.borrow().fallbacks.is_empty() {
            match holder.parent() {
                Some(parent) => holder = parent,
                None => {
                    warn!(path = %location.path, "No route matched and no fallback is configured");
                    return;
                }
            }
        }

        let fallbacks = holder.fallbacks();
        let redirect = fallbacks
            .iter()
            .find_map(|fb| fb.0.borrow().options.redirect.clone());
        if let Some(slug) = redirect {
            let holder_pattern = holder.pattern();
            let target = redirect_url(&location.path, Some(&holder_pattern), &slug);
            info!(path = %location.path, to = %target, "Fallback redirect");
            router.redirect(&target);
            return;
        }

        for fallback in fallbacks {
            info!(path = %location.path, pattern = %fallback.pattern(), "Fallback shown");
            fallback.show();
        }
    }

    fn needs_fallback(&self) -> bool {
        let inner = self.0.borrow();
        if inner.detached || inner.options.fallback || !inner.state.is_matched() {
            return false;
        }
        (!inner.children.is_empty() && inner.active.is_empty())
            || (inner.children.is_empty() && !inner.fallbacks.is_empty())
    }

    /// Whether a matched descendant without fallbacks of its own relies on
    /// this node's fallbacks
    fn borrows_fallbacks(&self) -> bool {
        self.children().iter().any(|child| {
            let (matched, own) = {
                let c = child.0.borrow();
                (c.state.is_matched(), !c.fallbacks.is_empty())
            };
            matched && !own && (child.needs_fallback() || child.borrows_fallbacks())
        })
    }

    /// Hide the fallbacks this node would draw on once nothing needs them,
    /// e.g. after a matching route was registered late.
    fn release_fallbacks(&self) {
        let mut holder = self.clone();
        while holder.0.borrow().fallbacks.is_empty() {
            match holder.parent() {
                Some(parent) => holder = parent,
                None => return,
            }
        }
        if holder.needs_fallback() || holder.borrows_fallbacks() {
            return;
        }
        for fallback in holder.fallbacks() {
            if fallback.hide() {
                info!(pattern = %fallback.pattern(), "Fallback hidden");
            }
        }
    }

    /// Remove this node and its subtree.
    ///
    /// The node is hidden, its meta becomes absent and its location
    /// subscription is released. The parent and the remaining siblings are
    /// re-matched immediately.
    pub fn unregister(&self) {
        self.detach(true);
    }

    fn detach(&self, rematch_parent: bool) {
        let subtree: Vec<RouteNode> = {
            let inner = self.0.borrow();
            if inner.detached || inner.root {
                return;
            }
            inner
                .children
                .iter()
                .chain(inner.fallbacks.iter())
                .cloned()
                .collect()
        };
        for child in subtree {
            child.detach(false);
        }

        self.meta_store().set_if_changed(None);
        self.hide();

        let parent = self.parent();
        let (subscription, id) = {
            let mut inner = self.0.borrow_mut();
            inner.detached = true;
            inner.children.clear();
            inner.fallbacks.clear();
            inner.active.clear();
            (inner.subscription.take(), inner.id)
        };
        drop(subscription);
        info!(id = %id, pattern = %self.pattern(), "Route unregistered");

        let Some(parent) = parent else {
            return;
        };
        {
            let mut p = parent.0.borrow_mut();
            p.children.retain(|c| !c.same(self));
            p.fallbacks.retain(|c| !c.same(self));
            p.active.retain(|a| *a != id);
        }
        if !rematch_parent {
            return;
        }

        parent.match_location();
        for sibling in parent.children().into_iter().chain(parent.fallbacks()) {
            sibling.match_location();
        }
        if let Some(router) = self.router() {
            parent.schedule_fallbacks(&router);
        }
    }

    /// Replace the options of a registered node and re-match it.
    ///
    /// Descendant patterns are re-resolved against the new pattern.
    ///
    /// # Errors
    ///
    /// Fails when the node is detached or is the root, or when the new
    /// options make a node with children exact or a fallback.
    pub fn update(&self, options: RouteOptions) -> Result<(), RouterError> {
        let parent = {
            let inner = self.0.borrow();
            let pattern = inner.matcher.pattern().to_string();
            if inner.detached {
                return Err(RouterError::Detached { pattern });
            }
            if inner.root {
                return Err(RouterError::InvalidConfig(
                    "the root route cannot be updated".to_string(),
                ));
            }
            let first_child = inner
                .children
                .iter()
                .chain(inner.fallbacks.iter())
                .next()
                .map(|c| c.0.borrow().options.path.clone());
            if let Some(child) = first_child {
                if options.fallback {
                    return Err(RouterError::NestedUnderFallback {
                        parent: pattern,
                        child,
                    });
                }
                if options.is_exact() {
                    return Err(RouterError::NestedUnderExact {
                        parent: pattern,
                        child,
                    });
                }
            }
            inner.parent.as_ref().and_then(Weak::upgrade).map(RouteNode)
        };

        let parent_pattern = parent.as_ref().map(RouteNode::pattern).unwrap_or_default();
        let matcher = compile(&join_pattern(&parent_pattern, &options.path))?;
        let moved = {
            let mut inner = self.0.borrow_mut();
            let moved = inner.options.fallback != options.fallback;
            inner.options = options;
            inner.matcher = matcher;
            moved
        };
        if let (true, Some(parent)) = (moved, &parent) {
            let mut p = parent.0.borrow_mut();
            p.children.retain(|c| !c.same(self));
            p.fallbacks.retain(|c| !c.same(self));
            if self.0.borrow().options.fallback {
                p.fallbacks.push(self.clone());
            } else {
                p.children.push(self.clone());
            }
        }
        debug!(id = %self.id(), pattern = %self.pattern(), "Route updated");

        self.match_location();
        self.refresh_subtree()
    }

    fn refresh_subtree(&self) -> Result<(), RouterError> {
        let pattern = self.pattern();
        for child in self.children().into_iter().chain(self.fallbacks()) {
            let raw = join_pattern(&pattern, &child.0.borrow().options.path);
            let matcher = compile(&raw)?;
            child.0.borrow_mut().matcher = matcher;
            child.match_location();
            child.refresh_subtree()?;
        }
        Ok(())
    }
}

fn build_meta(
    m: PathMatch,
    location: &Location,
    parent: Option<&RouteNode>,
    label: Option<&str>,
    pattern: String,
) -> Meta {
    let mut breadcrumbs = parent
        .and_then(RouteNode::meta)
        .map(|pm| pm.breadcrumbs.clone())
        .unwrap_or_default();
    if let Some(name) = label {
        breadcrumbs.push(Breadcrumb {
            name: name.to_string(),
            path: m.matched_prefix.clone(),
        });
    }
    Meta {
        from: location.from.clone(),
        url: location.url.clone(),
        query: location.query.clone(),
        matched: m.matched_prefix,
        pattern,
        breadcrumbs,
        params: m.params,
    }
}

/// Meta store of the route enclosing the caller.
///
/// `scope` is the route the caller was rendered by, if any.
///
/// # Errors
///
/// [`RouterError::OutsideRoute`] when there is no enclosing route.
pub fn meta(scope: Option<&RouteNode>) -> Result<MetaStore, RouterError> {
    scope
        .map(RouteNode::meta_store)
        .ok_or(RouterError::OutsideRoute)
}

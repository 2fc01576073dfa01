use std::fmt;
use std::rc::Rc;

use super::meta::Meta;

/// Rendering side of a route, owned by the UI binding layer
///
/// All hooks default to no-ops. `show` and `hide` are only called on
/// visibility transitions. `meta` is called when the route becomes visible and
/// whenever its meta changes while visible.
pub trait RouteOutlet {
    fn show(&self) {}
    fn hide(&self) {}
    fn meta(&self, _meta: &Meta) {}
}

/// Outlet for routes nobody renders (the root sentinel, table mounts)
impl RouteOutlet for () {}

type Hook = Rc<dyn Fn()>;
type MetaHook = Rc<dyn Fn(&Meta)>;

/// Outlet built from closures
///
/// ```rust
/// use brrtnav::route::CallbackOutlet;
///
/// let outlet = CallbackOutlet::new()
///     .on_show(|| println!("shown"))
///     .on_hide(|| println!("hidden"));
/// ```
#[derive(Default, Clone)]
pub struct CallbackOutlet {
    show: Option<Hook>,
    hide: Option<Hook>,
    meta: Option<MetaHook>,
}

impl CallbackOutlet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_show(mut self, f: impl Fn() + 'static) -> Self {
        self.show = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_hide(mut self, f: impl Fn() + 'static) -> Self {
        self.hide = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_meta(mut self, f: impl Fn(&Meta) + 'static) -> Self {
        self.meta = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for CallbackOutlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackOutlet")
            .field("show", &self.show.is_some())
            .field("hide", &self.hide.is_some())
            .field("meta", &self.meta.is_some())
            .finish()
    }
}

impl RouteOutlet for CallbackOutlet {
    fn show(&self) {
        if let Some(f) = &self.show {
            f();
        }
    }

    fn hide(&self) {
        if let Some(f) = &self.hide {
            f();
        }
    }

    fn meta(&self, meta: &Meta) {
        if let Some(f) = &self.meta {
            f(meta);
        }
    }
}

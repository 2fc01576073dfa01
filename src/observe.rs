//! # Observer Registry
//!
//! A single-threaded value cell with ordered, synchronous fan-out.
//!
//! - [`Observable::subscribe`] calls the listener immediately with the current
//!   value and returns a [`Subscription`] that unsubscribes when dropped.
//! - Listeners are notified in subscription order.
//! - A `set` issued from inside a listener does not nest: the running fan-out
//!   notices the newer value and restarts delivery from the first listener, so
//!   every listener ends on the newest value and nobody sees a stale one after
//!   a fresh one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    value: T,
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
    generation: u64,
    notifying: bool,
    on_idle: Option<Rc<dyn Fn()>>,
}

/// Shared observable value; clones share the same registry
pub struct Observable<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &reg.value)
            .field("listeners", &reg.listeners.len())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                value,
                listeners: Vec::new(),
                next_id: 0,
                generation: 0,
                notifying: false,
                on_idle: None,
            })),
        }
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Hook called whenever the last subscriber goes away
    pub fn on_idle(&self, hook: Rc<dyn Fn()>) {
        self.inner.borrow_mut().on_idle = Some(hook);
    }

    /// Register a listener; it is called right away with the current value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(listener);
        let (id, value) = {
            let mut reg = self.inner.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.listeners.push((id, Rc::clone(&listener)));
            (id, reg.value.clone())
        };
        listener(&value);

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let hook = {
                        let mut reg = inner.borrow_mut();
                        reg.listeners.retain(|(i, _)| *i != id);
                        if reg.listeners.is_empty() {
                            reg.on_idle.clone()
                        } else {
                            None
                        }
                    };
                    if let Some(hook) = hook {
                        hook();
                    }
                }
            })),
        }
    }

    /// Replace the value and notify every listener
    pub fn set(&self, value: T) {
        {
            let mut reg = self.inner.borrow_mut();
            reg.value = value;
            reg.generation += 1;
            if reg.notifying {
                return;
            }
            reg.notifying = true;
        }

        loop {
            let (listeners, generation) = {
                let reg = self.inner.borrow();
                (reg.listeners.clone(), reg.generation)
            };

            for (id, listener) in listeners {
                let value = {
                    let reg = self.inner.borrow();
                    if reg.generation != generation {
                        break;
                    }
                    if !reg.listeners.iter().any(|(i, _)| *i == id) {
                        continue;
                    }
                    reg.value.clone()
                };
                listener(&value);
            }

            let mut reg = self.inner.borrow_mut();
            if reg.generation == generation {
                reg.notifying = false;
                return;
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Replace the value only if it differs; returns whether listeners ran
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.inner.borrow().value == value {
            return false;
        }
        self.set(value);
        true
    }
}

/// Handle returned by `subscribe`; unsubscribes on drop
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_subscribe_receives_current_value() {
        let obs = Observable::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| s.borrow_mut().push(*v));
        obs.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_drop_unsubscribes_and_fires_idle() {
        let obs = Observable::new(0);
        let idle = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&idle);
        obs.on_idle(Rc::new(move || *flag.borrow_mut() = true));

        let sub = obs.subscribe(|_| {});
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        assert_eq!(obs.subscriber_count(), 0);
        assert!(*idle.borrow());
    }

    #[test]
    fn test_nested_set_restarts_fan_out() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = obs.subscribe(move |v| l1.borrow_mut().push(("a", *v)));

        let inner = obs.clone();
        let l2 = Rc::clone(&log);
        let _b = obs.subscribe(move |v| {
            l2.borrow_mut().push(("b", *v));
            if *v == 1 {
                inner.set(2);
            }
        });

        let l3 = Rc::clone(&log);
        let _c = obs.subscribe(move |v| l3.borrow_mut().push(("c", *v)));

        log.borrow_mut().clear();
        obs.set(1);

        // "c" never sees the superseded value 1
        assert_eq!(
            *log.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2), ("c", 2)]
        );
    }

    #[test]
    fn test_set_if_changed() {
        let obs = Observable::new("x".to_string());
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let _sub = obs.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(!obs.set_if_changed("x".to_string()));
        assert!(obs.set_if_changed("y".to_string()));
        assert_eq!(*count.borrow(), 2);
    }
}

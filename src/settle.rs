//! # Settle Point
//!
//! Deferred work that must wait until a burst of synchronous changes (sibling
//! mounts, a location fan-out) has finished: fallback resolution and batched
//! meta delivery.
//!
//! Tasks are keyed. Scheduling a key that is already pending replaces the
//! pending task in place instead of stacking a second one, so redundant
//! fallback checks collapse into one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::route::NodeId;

/// Upper bound on tasks run by one `run` call; protects against a task that
/// keeps rescheduling itself.
pub const MAX_SETTLE_TASKS: usize = 4096;

/// Identity of a deferred task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleKey {
    /// Fallback resolution for one route node
    Fallback(NodeId),
    /// Delivery of the router-level current meta
    Meta,
}

type Task = Rc<dyn Fn()>;

/// FIFO of keyed deferred tasks
#[derive(Default)]
pub struct SettleQueue {
    tasks: RefCell<Vec<(SettleKey, Task)>>,
    running: Cell<bool>,
}

impl SettleQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` under `key`.
    ///
    /// Returns `true` when the queue went from empty to non-empty, i.e. when
    /// the caller should ask its host for a settle callback.
    pub fn schedule(&self, key: SettleKey, task: Task) -> bool {
        let mut tasks = self.tasks.borrow_mut();
        let was_empty = tasks.is_empty();
        match tasks.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => {
                debug!(key = ?key, "Settle task superseded");
                slot.1 = task;
            }
            None => tasks.push((key, task)),
        }
        was_empty && !self.running.get()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run pending tasks, including tasks scheduled while running, until the
    /// queue is empty. Re-entrant calls return 0.
    pub fn run(&self) -> usize {
        if self.running.replace(true) {
            return 0;
        }
        let mut ran = 0;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                if tasks.is_empty() {
                    None
                } else {
                    Some(tasks.remove(0))
                }
            };
            let Some((key, task)) = next else {
                break;
            };
            if ran >= MAX_SETTLE_TASKS {
                warn!(
                    ran,
                    pending = self.len() + 1,
                    "Settle queue did not drain; dropping remaining tasks"
                );
                self.tasks.borrow_mut().clear();
                break;
            }
            debug!(key = ?key, "Running settle task");
            task();
            ran += 1;
        }
        self.running.set(false);
        ran
    }
}

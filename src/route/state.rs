use std::cell::Cell;
use std::rc::Rc;

/// Visibility of a route node after its latest pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// The location does not match the node's pattern
    #[default]
    Unmatched,
    /// The pattern matches but the node is suppressed (exactness, an earlier
    /// first-match sibling, or it is a fallback waiting for resolution)
    MatchedHidden,
    /// Active; the outlet was told to render
    MatchedShown,
}

impl NodeState {
    #[must_use]
    pub fn is_shown(self) -> bool {
        self == NodeState::MatchedShown
    }

    #[must_use]
    pub fn is_matched(self) -> bool {
        self != NodeState::Unmatched
    }
}

/// Whether a pass (match or fallback resolution) is running on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PassState {
    #[default]
    Idle,
    /// `rerun` records that another pass was requested while this one ran
    Running { rerun: bool },
}

/// RAII token for a running pass
///
/// Only one guard per cell can exist. A second `enter` while a guard is
/// alive returns `None` and flags the running pass for a rerun.
pub(crate) struct PassGuard {
    cell: Rc<Cell<PassState>>,
}

impl PassGuard {
    pub(crate) fn enter(cell: &Rc<Cell<PassState>>) -> Option<Self> {
        match cell.get() {
            PassState::Idle => {
                cell.set(PassState::Running { rerun: false });
                Some(Self {
                    cell: Rc::clone(cell),
                })
            }
            PassState::Running { .. } => {
                cell.set(PassState::Running { rerun: true });
                None
            }
        }
    }

    /// Consume a pending rerun request
    pub(crate) fn take_rerun(&self) -> bool {
        let rerun = matches!(self.cell.get(), PassState::Running { rerun: true });
        self.cell.set(PassState::Running { rerun: false });
        rerun
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.cell.set(PassState::Idle);
    }
}

//! Session events and the observer list.
//!
//! Observers are plain callbacks that receive the event and the session.
//! They run synchronously at the point the event fires, in subscription
//! order, and may freely mutate the session (request stops, move windows,
//! subscribe more observers).
//!
//! Ordering guarantees:
//! - `Layout(Started(c))` precedes `Layout(Completed(c))` within a pass
//! - `WindowReady(w)` precedes `WindowClosed { window: w, .. }`
//! - `AllChildrenClosed` directly follows the `WindowClosed` that caused it

use std::collections::HashSet;

use crate::engine::ElementId;
use crate::layout::LayoutEvent;

use super::session::Session;

/// Something that happened while the session iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Layout(LayoutEvent),
    /// First iteration after the window was run.
    WindowReady(ElementId),
    /// Once per iteration, after stopping windows move to the top and before
    /// any of them are evicted.
    Iteration,
    WindowClosed {
        window: ElementId,
        /// Invoker, redirect target, or overlapped container.
        notify: Option<ElementId>,
    },
    /// The last child of the overlapped container closed.
    AllChildrenClosed,
}

/// Handle returned by [`Session::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) type Callback = Box<dyn FnMut(&SessionEvent, &mut Session)>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    list: Vec<(SubscriptionId, Callback)>,
    /// Subscribed and not yet removed, whether in `list` or out for dispatch.
    live: HashSet<SubscriptionId>,
    /// Unsubscribed while their list was taken out for dispatch.
    removed: Vec<SubscriptionId>,
}

impl Observers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.list.push((id, callback));
        self.live.insert(id);
        id
    }

    /// Returns `false` for ids that are unknown or already removed.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        if !self.live.remove(&id) {
            return false;
        }
        let before = self.list.len();
        self.list.retain(|(sid, _)| *sid != id);
        if self.list.len() == before {
            self.removed.push(id);
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    /// Take the list out for dispatch.
    pub(crate) fn take(&mut self) -> Vec<(SubscriptionId, Callback)> {
        std::mem::take(&mut self.list)
    }

    /// Put a dispatched list back, keeping observers added meanwhile after
    /// it and dropping those removed meanwhile.
    pub(crate) fn restore(&mut self, mut dispatched: Vec<(SubscriptionId, Callback)>) {
        dispatched.append(&mut self.list);
        self.list = dispatched;
        if !self.removed.is_empty() {
            let removed = std::mem::take(&mut self.removed);
            self.list.retain(|(id, _)| !removed.contains(id));
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.list.len())
            .finish()
    }
}

//! Window Stack - Overlapped top-level windows
//!
//! Tracks every running top-level window, which one is current, and the
//! single overlapped container that owns the non-modal children:
//! - Run/stop lifecycle (`Created → Running → Stopping → Closed`)
//! - Reordering of stopping windows before eviction
//! - Next/previous cycling with wrap, trapped while a modal is current
//! - Closed-notification routing (invoker, redirect target, container)
//!
//! The stack is plain state. [`Session`](crate::pipeline::Session) drives it
//! once per iteration and turns its results into events.
//!
//! # Example
//!
//! ```ignore
//! let mut stack = WindowStack::new();
//! stack.push(&tree, container, None)?;
//! stack.push(&tree, editor, None)?;
//! stack.move_next(&tree);
//! ```

use std::collections::HashSet;

use tracing::debug;

use crate::engine::{ElementId, ElementTree};
use crate::error::StackError;

// =============================================================================
// Window State
// =============================================================================

/// Lifecycle of a window on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// Run, but not yet announced as ready.
    Created,
    Running,
    /// Stop requested; evicted at a later iteration boundary.
    Stopping,
    /// Evicted from the stack.
    Closed,
}

impl WindowState {
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, WindowState::Created | WindowState::Running)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    window: ElementId,
    state: WindowState,
    /// Window that was current when this one was run.
    invoker: Option<ElementId>,
    /// Explicit recipient of the closed notification.
    close_target: Option<ElementId>,
    /// Ready event delivered.
    announced: bool,
}

/// Result of evicting a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed {
    pub window: ElementId,
    /// Who should hear about it.
    pub notify: Option<ElementId>,
    /// True when only the overlapped container is left on the stack.
    pub last_child: bool,
}

// =============================================================================
// Window Stack
// =============================================================================

/// Ordered stack of top-level windows, top first.
#[derive(Debug, Clone, Default)]
pub struct WindowStack {
    entries: Vec<Entry>,
    container: Option<ElementId>,
    current: Option<ElementId>,
    closed: HashSet<ElementId>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current(&self) -> Option<ElementId> {
        self.current
    }

    /// The active overlapped container, if any.
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// Every window on the stack, top first.
    pub fn windows(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.window).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, window: ElementId) -> bool {
        self.position(window).is_some()
    }

    /// `None` for windows that were never run.
    pub fn state(&self, window: ElementId) -> Option<WindowState> {
        match self.position(window) {
            Some(i) => Some(self.entries[i].state),
            None if self.closed.contains(&window) => Some(WindowState::Closed),
            None => None,
        }
    }

    pub fn is_running(&self, window: ElementId) -> bool {
        self.state(window).is_some_and(WindowState::is_running)
    }

    /// Non-modal windows that belong to the active container, top first.
    /// Empty when no container is active.
    pub fn overlapped_children(&self, tree: &ElementTree) -> Vec<ElementId> {
        let Some(container) = self.container else {
            return Vec::new();
        };
        self.entries
            .iter()
            .map(|e| e.window)
            .filter(|&w| w != container && tree.contains(w) && !tree.is_modal(w))
            .collect()
    }

    /// Windows run but not yet announced, bottom first.
    pub(crate) fn pending_ready(&self) -> Vec<ElementId> {
        self.entries
            .iter()
            .rev()
            .filter(|e| !e.announced)
            .map(|e| e.window)
            .collect()
    }

    fn position(&self, window: ElementId) -> Option<usize> {
        self.entries.iter().position(|e| e.window == window)
    }

    fn entry_mut(&mut self, window: ElementId) -> Result<&mut Entry, StackError> {
        self.entries
            .iter_mut()
            .find(|e| e.window == window)
            .ok_or(StackError::InvalidWindow(window))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Put `window` on top of the stack. A visible window becomes current; a
    /// hidden one leaves the current window as it was.
    ///
    /// `invoker` defaults to the window that was current before the call.
    /// Running a second overlapped container while one is active fails and
    /// leaves the stack untouched.
    pub fn push(
        &mut self,
        tree: &ElementTree,
        window: ElementId,
        invoker: Option<ElementId>,
    ) -> Result<(), StackError> {
        if !tree.contains(window) {
            return Err(StackError::InvalidWindow(window));
        }
        if self.contains(window) {
            return Err(StackError::AlreadyRunning(tree.display_name(window)));
        }
        if tree.is_overlapped(window) {
            if let Some(active) = self.container {
                return Err(StackError::ContainerAlreadyActive {
                    active: tree.display_name(active),
                    requested: tree.display_name(window),
                });
            }
            self.container = Some(window);
        }

        let invoker = invoker.or(self.current);
        self.entries.insert(
            0,
            Entry {
                window,
                state: WindowState::Created,
                invoker,
                close_target: None,
                announced: false,
            },
        );
        self.closed.remove(&window);
        if tree.is_visible(window) {
            self.current = Some(window);
        }
        debug!(window = %tree.display_name(window), depth = self.entries.len(), "window pushed");
        Ok(())
    }

    /// Announce a window as ready: `Created → Running`. A window stopped
    /// before its first iteration is still announced, but stays stopping.
    pub(crate) fn mark_ready(&mut self, window: ElementId) {
        if let Ok(entry) = self.entry_mut(window) {
            entry.announced = true;
            if entry.state == WindowState::Created {
                entry.state = WindowState::Running;
            }
        }
    }

    /// Redirect `window`'s closed notification to `target`.
    pub fn set_close_target(
        &mut self,
        window: ElementId,
        target: Option<ElementId>,
    ) -> Result<(), StackError> {
        self.entry_mut(window)?.close_target = target;
        Ok(())
    }

    /// Ask a window to stop. Nothing moves until the next [`reorder`]; the
    /// window stays current and visible until then.
    ///
    /// Stopping the overlapped container stops all of its running children
    /// too. Returns `false` if the window was already stopping.
    ///
    /// [`reorder`]: Self::reorder
    pub fn request_stop(&mut self, window: ElementId) -> Result<bool, StackError> {
        let entry = self.entry_mut(window)?;
        if !entry.state.is_running() {
            return Ok(false);
        }
        entry.state = WindowState::Stopping;

        if self.container == Some(window) {
            for entry in &mut self.entries {
                if entry.state.is_running() {
                    entry.state = WindowState::Stopping;
                }
            }
        }
        Ok(true)
    }

    /// Move stopping windows to the top: the current one first, then the
    /// other visible stopping windows, then the hidden ones, then the running
    /// ones, each group keeping its relative order. The top stopping window
    /// becomes current if it is visible.
    ///
    /// Returns the stopping window now current, if any.
    pub fn reorder(&mut self, tree: &ElementTree) -> Option<ElementId> {
        let current = self.current;

        let mut ordered = Vec::with_capacity(self.entries.len());
        let (stopping, running): (Vec<Entry>, Vec<Entry>) = self
            .entries
            .drain(..)
            .partition(|e| e.state == WindowState::Stopping);
        let (mut visible, hidden): (Vec<Entry>, Vec<Entry>) =
            stopping.into_iter().partition(|e| tree.is_visible(e.window));
        if let Some(i) = visible.iter().position(|e| Some(e.window) == current) {
            ordered.push(visible.remove(i));
        }
        ordered.append(&mut visible);
        ordered.extend(hidden);
        ordered.extend(running);
        self.entries = ordered;

        let top = self
            .entries
            .first()
            .filter(|e| e.state == WindowState::Stopping && tree.is_visible(e.window))
            .map(|e| e.window);
        if top.is_some() {
            self.current = top;
        }
        top
    }

    /// Remove a stopping window. Fails for running windows and unknown
    /// handles.
    pub fn evict(&mut self, tree: &ElementTree, window: ElementId) -> Result<Closed, StackError> {
        let i = self.position(window).ok_or(StackError::InvalidWindow(window))?;
        if self.entries[i].state != WindowState::Stopping {
            return Err(StackError::InvalidWindow(window));
        }
        let entry = self.entries.remove(i);
        self.closed.insert(window);

        let notify = match self.container {
            Some(container) if container != window && !tree.is_modal(window) => {
                entry.close_target.or(Some(container))
            }
            _ => entry.close_target.or(entry.invoker),
        };

        if self.container == Some(window) {
            self.container = None;
        }
        if self.current == Some(window) {
            self.current = None;
        }

        let last_child = self.container.is_some_and(|c| {
            c != window && self.entries.len() == 1 && self.entries[0].window == c
        });

        debug!(window = %tree.display_name(window), ?notify, "window evicted");
        Ok(Closed {
            window,
            notify,
            last_child,
        })
    }

    /// Drop entries whose element was released while on the stack. A
    /// released container stops its running children first.
    pub fn evict_released(&mut self, tree: &ElementTree) -> Vec<Closed> {
        let released: Vec<ElementId> = self
            .entries
            .iter()
            .map(|e| e.window)
            .filter(|&w| !tree.contains(w))
            .collect();

        let mut closed = Vec::with_capacity(released.len());
        for window in released {
            if self.container == Some(window) {
                for entry in &mut self.entries {
                    if entry.state.is_running() {
                        entry.state = WindowState::Stopping;
                    }
                }
            }
            if let Ok(entry) = self.entry_mut(window) {
                entry.state = WindowState::Stopping;
            }
            if let Ok(c) = self.evict(tree, window) {
                closed.push(c);
            }
        }
        closed
    }

    /// Stopping windows that are not visible; they are evicted without
    /// becoming current first.
    pub fn stopping_invisible(&self, tree: &ElementTree) -> Vec<ElementId> {
        self.entries
            .iter()
            .filter(|e| e.state == WindowState::Stopping && !tree.is_visible(e.window))
            .map(|e| e.window)
            .collect()
    }

    /// Make the top-most visible window current.
    pub fn select_current(&mut self, tree: &ElementTree) -> Option<ElementId> {
        self.current = self.top_visible(tree);
        self.current
    }

    fn top_visible(&self, tree: &ElementTree) -> Option<ElementId> {
        self.entries
            .iter()
            .map(|e| e.window)
            .find(|&w| tree.is_visible(w))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Activate the next overlapped child, wrapping around.
    pub fn move_next(&mut self, tree: &ElementTree) -> bool {
        self.cycle(tree, true)
    }

    /// Activate the previous overlapped child, wrapping around.
    pub fn move_previous(&mut self, tree: &ElementTree) -> bool {
        self.cycle(tree, false)
    }

    fn cycle(&mut self, tree: &ElementTree, forward: bool) -> bool {
        let Some(container) = self.container else {
            return false;
        };
        if self.current.is_some_and(|c| tree.is_modal(c)) {
            return false;
        }

        let slots: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.window != container
                    && e.state.is_running()
                    && tree.is_visible(e.window)
                    && !tree.is_modal(e.window)
            })
            .map(|(i, _)| i)
            .collect();

        // Only the container is left: settle on whatever is on top.
        if slots.is_empty() {
            let top = self.top_visible(tree);
            let changed = top != self.current;
            self.current = top;
            return changed;
        }

        let mut windows: Vec<Entry> = slots.iter().map(|&i| self.entries[i].clone()).collect();
        if forward {
            windows.rotate_left(1);
        } else {
            windows.rotate_right(1);
        }
        for (&i, entry) in slots.iter().zip(windows) {
            self.entries[i] = entry;
        }

        let next = self.entries[slots[0]].window;
        let changed = self.current != Some(next);
        self.current = Some(next);
        debug!(window = %tree.display_name(next), forward, "cycled current window");
        changed
    }

    /// Bring `window` to the top and make it current.
    ///
    /// Returns `false` without changing anything when the window is hidden or
    /// another modal window is current.
    pub fn move_to(&mut self, tree: &ElementTree, window: ElementId) -> Result<bool, StackError> {
        let i = self.position(window).ok_or(StackError::InvalidWindow(window))?;
        if !tree.is_visible(window) {
            return Ok(false);
        }
        if self.current.is_some_and(|c| c != window && tree.is_modal(c)) {
            return Ok(false);
        }

        let entry = self.entries.remove(i);
        self.entries.insert(0, entry);
        self.current = Some(window);
        Ok(true)
    }
}

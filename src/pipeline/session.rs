//! Session - Application lifecycle and the iteration loop.
//!
//! A [`Session`] owns everything one application run needs: the element
//! tree, the window stack, the screen, observers, and the queue of requests
//! posted from other threads. Nothing is global; create one session per run
//! and drop it to tear down.
//!
//! # Example
//!
//! ```ignore
//! use spark_layout::pipeline::{Session, SessionEvent, SessionOptions};
//!
//! let mut session = Session::new(SessionOptions::default());
//! let window = session.tree_mut().create(ElementProps::default());
//! session.subscribe(|event, _session| {
//!     if let SessionEvent::WindowReady(w) = event {
//!         println!("ready: {w}");
//!     }
//! });
//! session.run(window)?;
//!
//! // Tick from your own loop
//! while session.iterate()? {
//!     // input handling, rendering
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::engine::{ElementId, ElementTree};
use crate::error::{Result, StackError};
use crate::layout::{self, LayoutEvent};
use crate::state::{Closed, WindowStack, WindowState};

use super::events::{Observers, SessionEvent, SubscriptionId};
use super::terminal::{detect_terminal_size, Screen};

// =============================================================================
// Options
// =============================================================================

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Screen size used when detection is off or fails.
    pub screen_width: u16,
    pub screen_height: u16,
    /// Query the real terminal size on creation.
    pub detect_terminal: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            screen_width: 80,
            screen_height: 24,
            detect_terminal: false,
        }
    }
}

// =============================================================================
// Cross-thread Requests
// =============================================================================

/// Stack change posted from outside the session's thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackRequest {
    Stop(ElementId),
    MoveNext,
    MovePrevious,
    MoveTo(ElementId),
}

/// Cloneable, `Send` handle for posting [`StackRequest`]s. Requests are
/// applied in order at the start of the next iteration.
#[derive(Debug, Clone, Default)]
pub struct RequestHandle {
    queue: Arc<Mutex<Vec<StackRequest>>>,
}

impl RequestHandle {
    pub fn send(&self, request: StackRequest) {
        self.queue.lock().push(request);
    }

    pub fn request_stop(&self, window: ElementId) {
        self.send(StackRequest::Stop(window));
    }

    pub fn move_next(&self) {
        self.send(StackRequest::MoveNext);
    }

    pub fn move_previous(&self) {
        self.send(StackRequest::MovePrevious);
    }

    pub fn move_to(&self, window: ElementId) {
        self.send(StackRequest::MoveTo(window));
    }

    fn drain(&self) -> Vec<StackRequest> {
        std::mem::take(&mut *self.queue.lock())
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug)]
pub struct Session {
    tree: ElementTree,
    stack: WindowStack,
    screen: Screen,
    observers: Observers,
    requests: RequestHandle,
    iterations: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let (width, height) = if options.detect_terminal {
            detect_terminal_size().unwrap_or((options.screen_width, options.screen_height))
        } else {
            (options.screen_width, options.screen_height)
        };
        debug!(width, height, "session created");

        Self {
            tree: ElementTree::new(),
            stack: WindowStack::new(),
            screen: Screen::new(width, height),
            observers: Observers::default(),
            requests: RequestHandle::default(),
            iterations: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn stack(&self) -> &WindowStack {
        &self.stack
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn request_handle(&self) -> RequestHandle {
        self.requests.clone()
    }

    pub fn current(&self) -> Option<ElementId> {
        self.stack.current()
    }

    pub fn is_running(&self, window: ElementId) -> bool {
        self.stack.is_running(window)
    }

    pub fn window_state(&self, window: ElementId) -> Option<WindowState> {
        self.stack.state(window)
    }

    /// Non-modal children of the active overlapped container, top first.
    pub fn overlapped_children(&self) -> Vec<ElementId> {
        self.stack.overlapped_children(&self.tree)
    }

    /// Resize the screen. Every window on the stack re-resolves on the next
    /// iteration.
    pub fn set_screen_size(&mut self, width: u16, height: u16) {
        if !self.screen.set_size(width, height) {
            return;
        }
        debug!(width, height, "screen resized");
        for window in self.stack.windows() {
            self.tree.mark_needs_layout(window);
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&SessionEvent, &mut Session) + 'static,
    ) -> SubscriptionId {
        self.observers.add(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    fn emit(&mut self, event: SessionEvent) {
        let mut observers = self.observers.take();
        for (_, callback) in observers.iter_mut() {
            callback(&event, self);
        }
        self.observers.restore(observers);
    }

    fn emit_layout(&mut self, events: Vec<LayoutEvent>) {
        for event in events {
            self.emit(SessionEvent::Layout(event));
        }
    }

    fn emit_closed(&mut self, closed: Closed) {
        self.emit(SessionEvent::WindowClosed {
            window: closed.window,
            notify: closed.notify,
        });
        if closed.last_child {
            self.emit(SessionEvent::AllChildrenClosed);
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Full layout pass over one subtree, emitting layout events. A failed
    /// pass still emits the events it recorded before returning the error.
    pub fn resolve(&mut self, element: ElementId) -> Result<()> {
        let mut events = Vec::new();
        let result = layout::layout_subviews(&mut self.tree, element, &mut events);
        self.emit_layout(events);
        Ok(result?)
    }

    pub fn mark_needs_layout(&mut self, element: ElementId) {
        self.tree.mark_needs_layout(element);
    }

    fn layout_windows(&mut self) -> Result<()> {
        let screen = self.screen.size();
        let pending: Vec<ElementId> = self
            .stack
            .windows()
            .into_iter()
            .rev()
            .filter(|&w| self.tree.is_visible(w) && self.tree.needs_layout(w))
            .collect();

        for window in pending {
            let mut events = Vec::new();
            let result =
                layout::resolve_toplevel_into(&mut self.tree, window, screen, &mut events);
            self.emit_layout(events);
            result?;
        }
        Ok(())
    }

    // =========================================================================
    // Window Lifecycle
    // =========================================================================

    /// Run `window` on top of the stack. It is initialized if needed and
    /// announced as ready on the next iteration.
    pub fn run(&mut self, window: ElementId) -> Result<()> {
        self.start(window, None)
    }

    /// Like [`run`](Self::run), with an explicit invoker to notify when the
    /// window closes.
    pub fn run_invoked_by(&mut self, window: ElementId, invoker: ElementId) -> Result<()> {
        if !self.tree.contains(invoker) {
            return Err(StackError::InvalidWindow(invoker).into());
        }
        self.start(window, Some(invoker))
    }

    fn start(&mut self, window: ElementId, invoker: Option<ElementId>) -> Result<()> {
        self.stack.push(&self.tree, window, invoker)?;
        if !self.tree.is_initialized(window) {
            self.tree.initialize(window)?;
        }
        self.tree.mark_needs_layout(window);
        debug!(window = %self.tree.display_name(window), "window run");
        Ok(())
    }

    /// Send `window`'s closed notification to `target` instead of its
    /// invoker or the container.
    pub fn set_close_target(&mut self, window: ElementId, target: ElementId) -> Result<()> {
        if !self.tree.contains(target) {
            return Err(StackError::InvalidWindow(target).into());
        }
        self.stack.set_close_target(window, Some(target))?;
        Ok(())
    }

    /// Ask `window` to stop. It stays on the stack until the next iteration.
    pub fn request_stop(&mut self, window: ElementId) -> Result<bool> {
        Ok(self.stack.request_stop(window)?)
    }

    pub fn move_next(&mut self) -> bool {
        self.stack.move_next(&self.tree)
    }

    pub fn move_previous(&mut self) -> bool {
        self.stack.move_previous(&self.tree)
    }

    pub fn move_to(&mut self, window: ElementId) -> Result<bool> {
        Ok(self.stack.move_to(&self.tree, window)?)
    }

    fn apply_requests(&mut self) -> Result<()> {
        for request in self.requests.drain() {
            match request {
                StackRequest::Stop(window) => {
                    if self.stack.state(window) == Some(WindowState::Closed) {
                        debug!(%window, "stop requested for a closed window");
                        continue;
                    }
                    self.request_stop(window)?;
                }
                StackRequest::MoveNext => {
                    self.move_next();
                }
                StackRequest::MovePrevious => {
                    self.move_previous();
                }
                StackRequest::MoveTo(window) => {
                    if !self.move_to(window)? {
                        warn!(%window, "move request refused");
                    }
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// One pass of the run loop.
    ///
    /// 1. Apply queued cross-thread requests
    /// 2. Evict windows whose element was released (`WindowClosed`)
    /// 3. Announce windows run since the last pass (`WindowReady`)
    /// 4. Move stopping windows to the top; the top visible one becomes
    ///    current
    /// 5. `Iteration`
    /// 6. Lay out visible windows that need it
    /// 7. Evict the current stopping window (`WindowClosed`)
    /// 8. Evict hidden stopping windows
    /// 9. Make the top-most visible window current
    ///
    /// Returns whether any window is left on the stack.
    #[instrument(level = "debug", skip_all, fields(iteration = self.iterations))]
    pub fn iterate(&mut self) -> Result<bool> {
        self.apply_requests()?;

        for closed in self.stack.evict_released(&self.tree) {
            warn!(window = %closed.window, "window released while on the stack");
            self.emit_closed(closed);
        }

        for window in self.stack.pending_ready() {
            self.stack.mark_ready(window);
            self.emit(SessionEvent::WindowReady(window));
        }

        let stopping = self.stack.reorder(&self.tree);

        self.emit(SessionEvent::Iteration);

        self.layout_windows()?;

        // An observer may already have moved things; only evict what is
        // still stopping.
        if let Some(window) = stopping {
            if self.stack.state(window) == Some(WindowState::Stopping) {
                let closed = self.stack.evict(&self.tree, window)?;
                self.emit_closed(closed);
            }
        }

        for window in self.stack.stopping_invisible(&self.tree) {
            let closed = self.stack.evict(&self.tree, window)?;
            self.emit_closed(closed);
        }

        self.stack.select_current(&self.tree);
        self.iterations += 1;
        Ok(!self.stack.is_empty())
    }

    /// Iterate until no window is waiting to be announced or stopped.
    ///
    /// Returns the number of iterations run (at least one).
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut count = 0;
        loop {
            self.iterate()?;
            count += 1;
            let busy = self.stack.windows().into_iter().any(|w| {
                matches!(
                    self.stack.state(w),
                    Some(WindowState::Created | WindowState::Stopping)
                )
            }) || !self.requests.queue.lock().is_empty();
            if !busy {
                return Ok(count);
            }
        }
    }
}

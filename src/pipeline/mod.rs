//! Session Pipeline
//!
//! Connects the element tree, the layout resolver and the window stack into
//! one run loop.
//!
//! # Iteration
//!
//! ```text
//! requests → WindowReady → reorder → Iteration → layout → evict → select current
//! ```
//!
//! ## Key Design Principles
//!
//! - **Explicit state**: a [`Session`] owns the tree, the stack and the screen
//! - **Synchronous observers**: events are delivered in order, at the point
//!   they happen, with mutable access to the session
//! - **Deferred requests**: stop and move requests from other threads queue
//!   behind a lock and apply at the next iteration boundary

pub mod events;
pub mod session;
pub mod terminal;

// Re-exports
pub use events::{SessionEvent, SubscriptionId};
pub use session::{RequestHandle, Session, SessionOptions, StackRequest};
pub use terminal::{detect_terminal_size, Screen};

//! Error types.
//!
//! Two families that callers can match on separately:
//! - [`LayoutError`]: a malformed expression graph or element hierarchy.
//! - [`StackError`]: misuse of the overlapped window stack.
//!
//! Soft conditions (moving to an invisible window, navigating with no
//! overlapped container) are reported as `bool`, never as errors.

use crate::engine::ElementId;

/// Configuration errors raised while building or resolving a layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A handle that was never allocated or has been released.
    #[error("element {0} does not exist")]
    InvalidElement(ElementId),

    /// A relative expression references an element that is neither a sibling
    /// nor an ancestor of the dependent element.
    #[error(
        "layout of \"{container}\": \"{dependent}\" references \"{target}\", which was not found; \
         did you forget to add it to \"{container}\"?"
    )]
    UnresolvedReference {
        container: String,
        target: String,
        dependent: String,
    },

    /// A relative expression references one of the element's own subviews.
    #[error("layout of \"{container}\": \"{dependent}\" references its own subview \"{target}\"")]
    ReferencesSubview {
        container: String,
        target: String,
        dependent: String,
    },

    /// Tried to make an element a child of itself or of one of its descendants.
    #[error("cannot add \"{child}\" to \"{parent}\": it would create a cycle in the hierarchy")]
    Hierarchy { parent: String, child: String },
}

/// Usage errors raised by the overlapped window stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// Only one overlapped container may be active at a time.
    #[error("overlapped container \"{active}\" is already running; cannot run \"{requested}\"")]
    ContainerAlreadyActive { active: String, requested: String },

    /// The handle is not a live element, or not a window on the stack.
    #[error("{0} is not a window on the stack")]
    InvalidWindow(ElementId),

    /// `run` was called on a window that is already on the stack.
    #[error("window \"{0}\" is already running")]
    AlreadyRunning(String),
}

/// Any failure surfaced by a [`Session`](crate::pipeline::Session).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Stack(#[from] StackError),
}

/// A specialized Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # spark-layout
//!
//! Expression-based layout and overlapped window management for terminal UIs.
//!
//! ## Architecture
//!
//! Elements live in an arena ([`ElementTree`]) and refer to each other through
//! generational handles ([`ElementId`]). Each element's position and size are
//! symbolic expressions ([`Pos`], [`Dim`]) that the resolver turns into
//! concrete frames, in dependency order:
//! ```text
//! expressions → LayoutGraph → topological_sort → set_relative_layout → frames
//! ```
//!
//! Top-level windows run on a [`WindowStack`] driven by a [`Session`], which
//! owns all state for one application run and reports what happens through
//! [`SessionEvent`]s.
//!
//! ## Modules
//!
//! - [`types`] - Geometry (Rect, Size, Thickness, Side, Axis)
//! - [`error`] - Configuration and usage errors
//! - [`engine`] - Element arena, flags, dirty-state propagation
//! - [`layout`] - Expressions, dependency graph, scheduler, resolver
//! - [`state`] - Window stack
//! - [`pipeline`] - Session, events, screen signals

pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, LayoutError, Result, StackError};

pub use engine::{Element, ElementFlags, ElementId, ElementProps, ElementTree};

pub use layout::{
    auto_size_hint, measure_text, resolve, resolve_toplevel, set_relative_layout,
    string_width, topological_sort, Dim, LayoutEvent, LayoutGraph, Op, Pos,
};

pub use state::{WindowStack, WindowState};

pub use pipeline::{
    RequestHandle, Screen, Session, SessionEvent, SessionOptions, StackRequest, SubscriptionId,
};

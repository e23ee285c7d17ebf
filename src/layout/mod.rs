//! Layout Module
//!
//! Constraint-based layout for terminal UI elements.
//!
//! # Architecture
//!
//! Every element carries four expressions: [`Pos`] for `x`/`y` and [`Dim`]
//! for `width`/`height`. Expressions are relative to the container's content
//! area, or to a sibling's resolved frame. A pass over one container:
//!
//! 1. Builds a [`LayoutGraph`] of sibling references
//! 2. Orders children with [`topological_sort`]
//! 3. Resolves each child's frame ([`set_relative_layout`])
//! 4. Recurses into children that still need layout
//!
//! # Example
//!
//! ```ignore
//! use spark_layout::engine::{ElementProps, ElementTree};
//! use spark_layout::layout::{resolve, Dim, Pos};
//!
//! let mut tree = ElementTree::new();
//! let root = tree.create(ElementProps::default());
//! let label = tree.create(ElementProps {
//!     x: Some(Pos::center()),
//!     width: Some(Dim::percent(50.0)),
//!     ..Default::default()
//! });
//! tree.add_child(root, label)?;
//! tree.initialize(root)?;
//! resolve(&mut tree, root)?;
//! ```

mod dim;
mod graph;
mod pos;
mod resolver;
mod schedule;
mod text_measure;

pub use dim::Dim;
pub use graph::{Edge, LayoutGraph};
pub use pos::{Op, Pos};
pub use resolver::{
    auto_size_hint, layout_subviews, resolve, resolve_toplevel, resolve_toplevel_into,
    set_relative_layout, LayoutEvent,
};
pub use schedule::topological_sort;
pub use text_measure::{measure_text, string_width};

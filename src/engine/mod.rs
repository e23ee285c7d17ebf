//! Layout Engine - Element arena.
//!
//! The engine manages the core data structures:
//! - Registry: generational handles, free-slot reuse, parent/child links
//! - Element: expressions, resolved frame, adornments and state flags
//!
//! # Architecture
//!
//! Elements are NOT reference-counted objects pointing at each other. They
//! live in one arena and refer to each other by [`ElementId`]:
//!
//! ```text
//! #0 root   (parent=-, children=[#1, #2])
//! #1 label  (parent=#0, x=Center,      width=Absolute(10))
//! #2 input  (parent=#0, x=Right(#1)+1, width=Fill(0))
//! ```
//!
//! Expressions that reference siblings hold handles too, so a cycle in the
//! layout graph never becomes a cycle in ownership.

mod element;
mod registry;

pub use element::*;
pub use registry::*;

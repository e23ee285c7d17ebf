//! Layout resolver.
//!
//! Turns position/dimension expressions into frames.
//!
//! # Algorithm
//!
//! For one container:
//! 1. **Graph**: collect sibling references ([`LayoutGraph`])
//! 2. **Order**: topological sort ([`topological_sort`])
//! 3. **Resolve**: evaluate each child's expressions against the container's
//!    content area, in order ([`set_relative_layout`])
//! 4. **Recurse**: lay out every child that still needs layout
//!
//! A frame that changes marks its element for redraw and re-layout, so
//! children re-resolve against the new content area.

use tracing::{debug, instrument, trace};

use crate::engine::{Element, ElementId, ElementTree};
use crate::error::LayoutError;
use crate::types::{Rect, Size};

use super::dim::Dim;
use super::graph::LayoutGraph;
use super::pos::{Op, Pos};
use super::schedule::topological_sort;
use super::text_measure::measure_text;

// =============================================================================
// Events
// =============================================================================

/// Recorded around each container's pass. `Started(c)` always precedes
/// `Completed(c)`; a pass that fails records its `Started` events but no
/// `Completed` for the containers it was inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    Started(ElementId),
    Completed(ElementId),
}

// =============================================================================
// Single Element
// =============================================================================

/// Size needed to show the element's text plus its adornments.
pub fn auto_size_hint(element: &Element) -> Size {
    let text = measure_text(element.text());
    let adornment = element.adornment();
    Size::new(
        text.width + adornment.horizontal(),
        text.height + adornment.vertical(),
    )
}

/// Resolve one axis: returns `(location, size)`.
fn location_and_dimension(
    tree: &ElementTree,
    pos: &Pos,
    dim: &Dim,
    container: i32,
    hint: Option<i32>,
    offset: i32,
) -> Result<(i32, i32), LayoutError> {
    match pos {
        Pos::Center => {
            // Size at offset 0 first, center that, then re-size at the real
            // location (Fill-style dimensions depend on it).
            let candidate = dim.resolve(container, 0, hint, tree)?;
            let location = container.saturating_sub(candidate).div_euclid(2);
            let size = dim.resolve(container, location, hint, tree)?;
            Ok((location, size))
        }
        Pos::Combine(left, right, op) => {
            let (l, _) = location_and_dimension(tree, left, dim, container, hint, offset)?;
            let right_offset = match op {
                Op::Add => offset.saturating_add(l),
                Op::Subtract => offset,
            };
            let (r, _) = location_and_dimension(tree, right, dim, container, hint, right_offset)?;
            let location = op.apply(l, r);
            let size = dim.resolve(container, location, hint, tree)?.max(0);
            Ok((location, size))
        }
        _ => {
            let location = pos.resolve(container, offset, tree)?;
            let size = dim.resolve(container, location, hint, tree)?.max(0);
            Ok((location, size))
        }
    }
}

/// Compute an element's frame inside a container content area of size
/// `container` and store it.
///
/// Returns whether the frame changed.
pub fn set_relative_layout(
    tree: &mut ElementTree,
    id: ElementId,
    container: Size,
) -> Result<bool, LayoutError> {
    let element = tree.require(id)?;
    let hint = element.is_auto_size().then(|| auto_size_hint(element));

    let (x, mut width) = location_and_dimension(
        tree,
        element.x(),
        element.width(),
        container.width,
        hint.map(|h| h.width),
        0,
    )?;
    let (y, mut height) = location_and_dimension(
        tree,
        element.y(),
        element.height(),
        container.height,
        hint.map(|h| h.height),
        0,
    )?;

    // An auto-sized axis with nothing to show collapses to zero outright.
    if let Some(hint) = hint {
        if hint.width == 0 {
            width = 0;
        }
        if hint.height == 0 {
            height = 0;
        }
    }

    let frame = Rect::new(x, y, width, height);
    let changed = tree.store_frame(id, frame);
    if changed {
        trace!(element = %tree.display_name(id), ?frame, "frame changed");
    }
    Ok(changed)
}

// =============================================================================
// Subtree Passes
// =============================================================================

/// Lay out the children of `container` against its content area, then
/// recurse into every child that still needs layout.
///
/// Uninitialized containers and children are skipped and stay flagged.
#[instrument(level = "debug", skip_all, fields(container = %container))]
pub fn layout_subviews(
    tree: &mut ElementTree,
    container: ElementId,
    events: &mut Vec<LayoutEvent>,
) -> Result<(), LayoutError> {
    if !tree.require(container)?.is_initialized() {
        debug!("container not initialized, skipping");
        return Ok(());
    }

    events.push(LayoutEvent::Started(container));

    let content = tree.require(container)?.content_size();
    let graph = LayoutGraph::build(tree, container)?;
    let order = topological_sort(tree, container, graph)?;

    for &child in &order {
        if tree.is_initialized(child) {
            set_relative_layout(tree, child, content)?;
        }
    }

    for &child in &order {
        if tree.needs_layout(child) {
            layout_subviews(tree, child, events)?;
        }
    }

    tree.clear_needs_layout(container);
    events.push(LayoutEvent::Completed(container));
    Ok(())
}

/// Full layout pass for the subtree under `root`. The root's own frame is
/// left alone; its children resolve against its current content area.
pub fn resolve(tree: &mut ElementTree, root: ElementId) -> Result<Vec<LayoutEvent>, LayoutError> {
    let mut events = Vec::new();
    layout_subviews(tree, root, &mut events)?;
    Ok(events)
}

/// Layout pass for a top-level element: its own frame resolves against the
/// screen first, then its subtree.
pub fn resolve_toplevel(
    tree: &mut ElementTree,
    root: ElementId,
    screen: Size,
) -> Result<Vec<LayoutEvent>, LayoutError> {
    let mut events = Vec::new();
    resolve_toplevel_into(tree, root, screen, &mut events)?;
    Ok(events)
}

/// [`resolve_toplevel`] recording into `events`, which keeps what was
/// recorded before a failure.
pub fn resolve_toplevel_into(
    tree: &mut ElementTree,
    root: ElementId,
    screen: Size,
    events: &mut Vec<LayoutEvent>,
) -> Result<(), LayoutError> {
    if tree.require(root)?.is_initialized() {
        set_relative_layout(tree, root, screen)?;
    }
    layout_subviews(tree, root, events)
}

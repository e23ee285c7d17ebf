//! Element - A layout participant.
//!
//! Each element owns four expressions (x, y, width, height), the frame they
//! last resolved to, its adornments, and its place in the hierarchy. The
//! parent link is a plain handle: the tree owns every element, elements only
//! name each other.

use crate::layout::{Dim, Pos};
use crate::types::{Rect, Size, Thickness};

use super::ElementId;

// =============================================================================
// Flags
// =============================================================================

bitflags::bitflags! {
    /// Per-element state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u16 {
        const VISIBLE = 1 << 0;
        const MODAL = 1 << 1;
        const INITIALIZED = 1 << 2;
        const AUTO_SIZE = 1 << 3;
        /// Expressions, content or container size changed since the last pass.
        const NEEDS_LAYOUT = 1 << 4;
        const NEEDS_REDRAW = 1 << 5;
        /// Some descendant needs redraw.
        const CHILD_NEEDS_REDRAW = 1 << 6;
        /// Root of an overlapped (window-stacking) session.
        const OVERLAPPED = 1 << 7;
    }
}

// =============================================================================
// Props
// =============================================================================

/// Construction properties for [`ElementTree::create`](super::ElementTree::create).
///
/// Every field is optional; unset fields keep the element defaults
/// (`Pos::Absolute(0)`, `Dim::Absolute(0)`, visible, not modal).
///
/// ```ignore
/// let label = tree.create(ElementProps {
///     name: Some("label".into()),
///     x: Some(Pos::center()),
///     text: Some("Hello".into()),
///     auto_size: Some(true),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    pub name: Option<String>,
    pub x: Option<Pos>,
    pub y: Option<Pos>,
    pub width: Option<Dim>,
    pub height: Option<Dim>,
    pub text: Option<String>,
    pub auto_size: Option<bool>,
    pub visible: Option<bool>,
    pub modal: Option<bool>,
    pub overlapped: Option<bool>,
    pub margin: Option<Thickness>,
    pub border: Option<Thickness>,
    pub padding: Option<Thickness>,
}

// =============================================================================
// Element
// =============================================================================

#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,

    pub(crate) x: Pos,
    pub(crate) y: Pos,
    pub(crate) width: Dim,
    pub(crate) height: Dim,

    /// Last resolved rectangle, relative to the parent's content area.
    pub(crate) frame: Rect,

    pub(crate) margin: Thickness,
    pub(crate) border: Thickness,
    pub(crate) padding: Thickness,

    /// Content measured when auto-size is on.
    pub(crate) text: String,

    pub(crate) flags: ElementFlags,
}

impl Element {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            x: Pos::Absolute(0),
            y: Pos::Absolute(0),
            width: Dim::Absolute(0),
            height: Dim::Absolute(0),
            frame: Rect::ZERO,
            margin: Thickness::ZERO,
            border: Thickness::ZERO,
            padding: Thickness::ZERO,
            text: String::new(),
            flags: ElementFlags::VISIBLE | ElementFlags::NEEDS_LAYOUT,
        }
    }

    pub(crate) fn apply(&mut self, props: ElementProps) {
        if let Some(x) = props.x {
            self.x = x;
        }
        if let Some(y) = props.y {
            self.y = y;
        }
        if let Some(width) = props.width {
            self.width = width;
        }
        if let Some(height) = props.height {
            self.height = height;
        }
        if let Some(text) = props.text {
            self.text = text;
        }
        if let Some(margin) = props.margin {
            self.margin = margin;
        }
        if let Some(border) = props.border {
            self.border = border;
        }
        if let Some(padding) = props.padding {
            self.padding = padding;
        }
        let toggles = [
            (props.auto_size, ElementFlags::AUTO_SIZE),
            (props.visible, ElementFlags::VISIBLE),
            (props.modal, ElementFlags::MODAL),
            (props.overlapped, ElementFlags::OVERLAPPED),
        ];
        for (value, flag) in toggles {
            if let Some(on) = value {
                self.flags.set(flag, on);
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn x(&self) -> &Pos {
        &self.x
    }

    pub fn y(&self) -> &Pos {
        &self.y
    }

    pub fn width(&self) -> &Dim {
        &self.width
    }

    pub fn height(&self) -> &Dim {
        &self.height
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    /// Combined margin + border + padding.
    pub fn adornment(&self) -> Thickness {
        self.margin + self.border + self.padding
    }

    /// Interior of the frame after adornments, never negative.
    pub fn content_size(&self) -> Size {
        let adornment = self.adornment();
        Size::new(
            self.frame.width - adornment.horizontal(),
            self.frame.height - adornment.vertical(),
        )
    }

    /// True when every expression is a plain `Absolute`. Fixed elements add no
    /// edges to the layout graph.
    pub fn is_fixed(&self) -> bool {
        self.x.is_absolute()
            && self.y.is_absolute()
            && self.width.is_absolute()
            && self.height.is_absolute()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    #[inline]
    pub fn is_modal(&self) -> bool {
        self.flags.contains(ElementFlags::MODAL)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.flags.contains(ElementFlags::INITIALIZED)
    }

    #[inline]
    pub fn is_auto_size(&self) -> bool {
        self.flags.contains(ElementFlags::AUTO_SIZE)
    }

    #[inline]
    pub fn is_overlapped(&self) -> bool {
        self.flags.contains(ElementFlags::OVERLAPPED)
    }

    #[inline]
    pub fn needs_layout(&self) -> bool {
        self.flags.contains(ElementFlags::NEEDS_LAYOUT)
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.flags.contains(ElementFlags::NEEDS_REDRAW)
    }
}

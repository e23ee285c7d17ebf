//! Element Registry - Arena of layout participants.
//!
//! Manages the lifecycle of elements:
//! - Generational handles (`ElementId`) so stale references are detected
//! - Free slot pool for O(1) reuse
//! - Parent/child links stored as handles, never as owning pointers
//! - Dirty-state propagation (needs-layout, needs-redraw)

use std::fmt;

use crate::error::LayoutError;
use crate::layout::{Dim, Pos};
use crate::types::{Rect, Size, Thickness};

use super::element::{Element, ElementFlags, ElementProps};

// =============================================================================
// ElementId
// =============================================================================

/// Stable handle to an element in an [`ElementTree`].
///
/// A released slot bumps its generation, so a handle kept past `release()`
/// no longer resolves instead of silently aliasing a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// Slot index (stable for the element's lifetime).
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Tree State
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Owns every element. All cross-element references go through handles.
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    slots: Vec<Slot>,
    /// Pool of freed slots for reuse.
    free: Vec<u32>,
    /// Counter for generating unique names.
    name_counter: usize,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Create a detached element.
    ///
    /// A name is generated (`e0`, `e1`, ...) when `props.name` is unset.
    pub fn create(&mut self, mut props: ElementProps) -> ElementId {
        let name = match props.name.take() {
            Some(name) => name,
            None => {
                let name = format!("e{}", self.name_counter);
                self.name_counter += 1;
                name
            }
        };

        let mut element = Element::new(name);
        element.apply(props);

        // Reuse free slot or allocate new
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            ElementId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            ElementId {
                index,
                generation: 0,
            }
        }
    }

    /// Release an element and, recursively, all of its children.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn release(&mut self, id: ElementId) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        let children = element.children.clone();
        let parent = element.parent;

        // FIRST: release all children
        for child in children {
            self.release(child);
        }

        if let Some(parent) = parent {
            if let Some(parent_el) = self.get_mut(parent) {
                parent_el.children.retain(|c| *c != id);
            }
            self.mark_needs_layout(parent);
        }

        let slot = &mut self.slots[id.index as usize];
        slot.element = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        true
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Like [`get`](Self::get), but a stale handle is an error.
    pub fn require(&self, id: ElementId) -> Result<&Element, LayoutError> {
        self.get(id).ok_or(LayoutError::InvalidElement(id))
    }

    fn require_mut(&mut self, id: ElementId) -> Result<&mut Element, LayoutError> {
        self.get_mut(id).ok_or(LayoutError::InvalidElement(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live handles, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.element.as_ref().map(|_| ElementId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.ids().find(|id| self.get(*id).is_some_and(|el| el.name == name))
    }

    /// Name for diagnostics; falls back to the handle for released elements.
    pub fn display_name(&self, id: ElementId) -> String {
        match self.get(id) {
            Some(el) => el.name.clone(),
            None => id.to_string(),
        }
    }

    pub fn frame(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(Element::frame)
    }

    pub fn content_size(&self, id: ElementId) -> Option<Size> {
        self.get(id).map(Element::content_size)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(Element::parent)
    }

    /// Children in insertion order; empty for stale handles.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::is_visible)
    }

    pub fn is_modal(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::is_modal)
    }

    pub fn is_overlapped(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::is_overlapped)
    }

    pub fn is_initialized(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::is_initialized)
    }

    pub fn needs_layout(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::needs_layout)
    }

    pub fn needs_redraw(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::needs_redraw)
    }

    /// True if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Make `child` a subview of `parent`, detaching it from any previous
    /// parent. A child added to an initialized parent is initialized at once.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), LayoutError> {
        self.require(parent)?;
        self.require(child)?;

        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(LayoutError::Hierarchy {
                parent: self.display_name(parent),
                child: self.display_name(child),
            });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        self.require_mut(parent)?.children.push(child);
        self.require_mut(child)?.parent = Some(parent);

        if self.is_initialized(parent) {
            self.initialize(child)?;
        }
        self.mark_needs_layout(parent);
        Ok(())
    }

    /// Detach `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<bool, LayoutError> {
        let parent_el = self.require_mut(parent)?;
        let before = parent_el.children.len();
        parent_el.children.retain(|c| *c != child);
        if parent_el.children.len() == before {
            return Ok(false);
        }

        if let Some(child_el) = self.get_mut(child) {
            child_el.parent = None;
        }
        self.mark_needs_layout(parent);
        Ok(true)
    }

    /// Mark an element and its whole subtree initialized. Layout skips
    /// uninitialized elements: their expressions are not yet meaningful.
    pub fn initialize(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let element = self.require_mut(id)?;
        element.flags.insert(ElementFlags::INITIALIZED | ElementFlags::NEEDS_LAYOUT);
        let children = element.children.clone();
        for child in children {
            self.initialize(child)?;
        }
        Ok(())
    }

    // =========================================================================
    // Property Setters (each invalidates layout)
    // =========================================================================

    pub fn set_x(&mut self, id: ElementId, x: Pos) -> Result<(), LayoutError> {
        self.update(id, |el| el.x = x)
    }

    pub fn set_y(&mut self, id: ElementId, y: Pos) -> Result<(), LayoutError> {
        self.update(id, |el| el.y = y)
    }

    pub fn set_width(&mut self, id: ElementId, width: Dim) -> Result<(), LayoutError> {
        self.update(id, |el| el.width = width)
    }

    pub fn set_height(&mut self, id: ElementId, height: Dim) -> Result<(), LayoutError> {
        self.update(id, |el| el.height = height)
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), LayoutError> {
        let text = text.into();
        self.update(id, |el| el.text = text)
    }

    pub fn set_auto_size(&mut self, id: ElementId, on: bool) -> Result<(), LayoutError> {
        self.update(id, |el| el.flags.set(ElementFlags::AUTO_SIZE, on))
    }

    pub fn set_adornments(
        &mut self,
        id: ElementId,
        margin: Thickness,
        border: Thickness,
        padding: Thickness,
    ) -> Result<(), LayoutError> {
        self.update(id, |el| {
            el.margin = margin;
            el.border = border;
            el.padding = padding;
        })
    }

    /// Place an element at a fixed rectangle. Replaces all four expressions
    /// with `Absolute` values.
    pub fn set_frame(&mut self, id: ElementId, frame: Rect) -> Result<(), LayoutError> {
        self.update(id, |el| {
            el.x = Pos::Absolute(frame.x);
            el.y = Pos::Absolute(frame.y);
            el.width = Dim::Absolute(frame.width);
            el.height = Dim::Absolute(frame.height);
        })
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<(), LayoutError> {
        let element = self.require_mut(id)?;
        if element.is_visible() == visible {
            return Ok(());
        }
        element.flags.set(ElementFlags::VISIBLE, visible);
        self.mark_needs_redraw(id);
        if let Some(parent) = self.parent(id) {
            self.mark_needs_redraw(parent);
        }
        Ok(())
    }

    pub fn set_modal(&mut self, id: ElementId, modal: bool) -> Result<(), LayoutError> {
        self.require_mut(id)?.flags.set(ElementFlags::MODAL, modal);
        Ok(())
    }

    pub fn set_overlapped(&mut self, id: ElementId, overlapped: bool) -> Result<(), LayoutError> {
        self.require_mut(id)?.flags.set(ElementFlags::OVERLAPPED, overlapped);
        Ok(())
    }

    fn update(&mut self, id: ElementId, f: impl FnOnce(&mut Element)) -> Result<(), LayoutError> {
        f(self.require_mut(id)?);
        self.mark_needs_layout(id);
        Ok(())
    }

    // =========================================================================
    // Dirty State
    // =========================================================================

    /// Invalidate an element: itself, every descendant (their content area may
    /// change) and every ancestor (siblings may depend on it).
    pub fn mark_needs_layout(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(el) = self.get_mut(current) {
                el.flags.insert(ElementFlags::NEEDS_LAYOUT);
                stack.extend(el.children.iter().copied());
            }
        }

        let mut ancestor = self.parent(id);
        while let Some(p) = ancestor {
            if let Some(el) = self.get_mut(p) {
                el.flags.insert(ElementFlags::NEEDS_LAYOUT);
            }
            ancestor = self.parent(p);
        }
    }

    /// Flag an element for repaint and tell its ancestors a child needs it.
    pub fn mark_needs_redraw(&mut self, id: ElementId) {
        let Some(el) = self.get_mut(id) else { return };
        el.flags.insert(ElementFlags::NEEDS_REDRAW);

        let mut ancestor = self.parent(id);
        while let Some(p) = ancestor {
            if let Some(el) = self.get_mut(p) {
                el.flags.insert(ElementFlags::CHILD_NEEDS_REDRAW);
            }
            ancestor = self.parent(p);
        }
    }

    pub(crate) fn clear_needs_layout(&mut self, id: ElementId) {
        if let Some(el) = self.get_mut(id) {
            el.flags.remove(ElementFlags::NEEDS_LAYOUT);
        }
    }

    /// Drain every element that needs redraw, clearing the redraw flags.
    /// This is the renderer's side of the dirty-state contract.
    pub fn take_redraw(&mut self) -> Vec<ElementId> {
        let mut dirty = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(el) = slot.element.as_mut() else { continue };
            if el.flags.contains(ElementFlags::NEEDS_REDRAW) {
                dirty.push(ElementId {
                    index: index as u32,
                    generation: slot.generation,
                });
            }
            el.flags
                .remove(ElementFlags::NEEDS_REDRAW | ElementFlags::CHILD_NEEDS_REDRAW);
        }
        dirty
    }

    /// Store a newly resolved frame. When it differs from the old one the
    /// element is marked for redraw and re-layout (children re-resolve against
    /// the new content area, the parent chain learns a sibling moved).
    ///
    /// Returns whether the frame changed.
    pub(crate) fn store_frame(&mut self, id: ElementId, frame: Rect) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        if el.frame == frame {
            return false;
        }
        el.frame = frame;
        self.mark_needs_redraw(id);
        self.mark_needs_layout(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(tree: &mut ElementTree, name: &str) -> ElementId {
        tree.create(ElementProps {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_create_generates_names() {
        let mut tree = ElementTree::new();
        let a = tree.create(ElementProps::default());
        let b = tree.create(ElementProps::default());
        let c = named(&mut tree, "my_box");

        assert_eq!(tree.display_name(a), "e0");
        assert_eq!(tree.display_name(b), "e1");
        assert_eq!(tree.display_name(c), "my_box");
        assert_eq!(tree.find_by_name("my_box"), Some(c));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_release_and_reuse() {
        let mut tree = ElementTree::new();
        let a = named(&mut tree, "a");
        let _b = named(&mut tree, "b");

        assert!(tree.release(a));
        assert!(!tree.contains(a));
        assert!(!tree.release(a));

        // Slot is reused, but the stale handle stays dead
        let c = named(&mut tree, "c");
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(tree.get(a).is_none());
        assert_eq!(tree.require(a).unwrap_err(), LayoutError::InvalidElement(a));
    }

    #[test]
    fn test_release_is_recursive() {
        let mut tree = ElementTree::new();
        let root = named(&mut tree, "root");
        let child = named(&mut tree, "child");
        let grandchild = named(&mut tree, "grandchild");
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();

        tree.release(child);
        assert!(tree.contains(root));
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_add_child_reparents() {
        let mut tree = ElementTree::new();
        let p1 = named(&mut tree, "p1");
        let p2 = named(&mut tree, "p2");
        let c = named(&mut tree, "c");

        tree.add_child(p1, c).unwrap();
        tree.add_child(p2, c).unwrap();
        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.children(p2), &[c]);
        assert_eq!(tree.parent(c), Some(p2));
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut tree = ElementTree::new();
        let root = named(&mut tree, "root");
        let child = named(&mut tree, "child");
        tree.add_child(root, child).unwrap();

        let err = tree.add_child(child, root).unwrap_err();
        assert!(matches!(err, LayoutError::Hierarchy { .. }));
        assert!(tree.add_child(root, root).is_err());
    }

    #[test]
    fn test_add_child_initializes_under_initialized_parent() {
        let mut tree = ElementTree::new();
        let root = named(&mut tree, "root");
        let early = named(&mut tree, "early");
        tree.add_child(root, early).unwrap();
        assert!(!tree.is_initialized(early));

        tree.initialize(root).unwrap();
        assert!(tree.is_initialized(early));

        let late = named(&mut tree, "late");
        tree.add_child(root, late).unwrap();
        assert!(tree.is_initialized(late));
    }

    #[test]
    fn test_mark_needs_layout_propagates_both_ways() {
        let mut tree = ElementTree::new();
        let root = named(&mut tree, "root");
        let mid = named(&mut tree, "mid");
        let leaf = named(&mut tree, "leaf");
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        for id in [root, mid, leaf] {
            tree.clear_needs_layout(id);
        }

        tree.set_x(mid, Pos::Absolute(3)).unwrap();
        assert!(tree.needs_layout(root));
        assert!(tree.needs_layout(mid));
        assert!(tree.needs_layout(leaf));
    }

    #[test]
    fn test_take_redraw_drains() {
        let mut tree = ElementTree::new();
        let root = named(&mut tree, "root");
        let child = named(&mut tree, "child");
        tree.add_child(root, child).unwrap();

        assert!(tree.store_frame(child, Rect::new(0, 0, 5, 1)));
        assert!(!tree.store_frame(child, Rect::new(0, 0, 5, 1)));
        assert!(tree.get(root).unwrap().flags().contains(ElementFlags::CHILD_NEEDS_REDRAW));

        assert_eq!(tree.take_redraw(), vec![child]);
        assert!(tree.take_redraw().is_empty());
        assert!(!tree.get(root).unwrap().flags().contains(ElementFlags::CHILD_NEEDS_REDRAW));
    }

    #[test]
    fn test_set_frame_makes_fixed() {
        let mut tree = ElementTree::new();
        let a = tree.create(ElementProps {
            x: Some(Pos::center()),
            ..Default::default()
        });
        assert!(!tree.get(a).unwrap().is_fixed());

        tree.set_frame(a, Rect::new(1, 2, 3, 4)).unwrap();
        assert!(tree.get(a).unwrap().is_fixed());
        assert_eq!(tree.get(a).unwrap().width(), &Dim::Absolute(3));
    }
}

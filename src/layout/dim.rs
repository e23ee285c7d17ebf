//! Dimension expressions.
//!
//! A [`Dim`] describes how large an element is along one axis. Unlike a
//! position, a dimension may depend on where the element ends up: `Fill`
//! and remaining-space percentages measure from the element's location to
//! the container edge.

use std::ops::{Add, Sub};

use crate::engine::{ElementId, ElementTree};
use crate::error::LayoutError;
use crate::types::Axis;

use super::pos::{percent_of, Op};

/// Dimension expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Dim {
    /// Fixed size.
    Absolute(i32),
    /// Everything from the element's location to the container edge, minus
    /// `margin`.
    Fill(i32),
    /// Percentage (0-100) of the container extent. With `from_remaining`, of
    /// the extent left after the element's location.
    Percent { percent: f32, from_remaining: bool },
    /// Width or height of another element's resolved frame.
    Relative { target: ElementId, axis: Axis },
    Combine(Box<Dim>, Box<Dim>, Op),
}

impl Default for Dim {
    fn default() -> Self {
        Dim::Absolute(0)
    }
}

impl From<i32> for Dim {
    fn from(value: i32) -> Self {
        Dim::Absolute(value)
    }
}

impl Dim {
    pub const fn sized(n: i32) -> Self {
        Dim::Absolute(n)
    }

    pub const fn fill(margin: i32) -> Self {
        Dim::Fill(margin)
    }

    pub const fn percent(percent: f32) -> Self {
        Dim::Percent {
            percent,
            from_remaining: false,
        }
    }

    pub const fn percent_of_remaining(percent: f32) -> Self {
        Dim::Percent {
            percent,
            from_remaining: true,
        }
    }

    pub const fn width_of(target: ElementId) -> Self {
        Dim::Relative {
            target,
            axis: Axis::Horizontal,
        }
    }

    pub const fn height_of(target: ElementId) -> Self {
        Dim::Relative {
            target,
            axis: Axis::Vertical,
        }
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        matches!(self, Dim::Absolute(_))
    }

    /// Raw value of the expression for a container extent, ignoring location.
    fn anchor(&self, container: i32, tree: &ElementTree) -> Result<i32, LayoutError> {
        Ok(match self {
            Dim::Absolute(n) => *n,
            Dim::Fill(margin) => container.saturating_sub(*margin),
            Dim::Percent { percent, .. } => percent_of(container, *percent),
            Dim::Relative { target, axis } => tree.require(*target)?.frame().size().along(*axis),
            Dim::Combine(left, right, op) => {
                op.apply(left.anchor(container, tree)?, right.anchor(container, tree)?)
            }
        })
    }

    /// Evaluate for an element placed at `location` inside a container of
    /// extent `container`.
    ///
    /// `auto_size` is the content-fit hint when the element auto-sizes; it
    /// applies once, to the whole expression, and the result is never smaller
    /// than it. Combined results are not clamped here, so `Fill(0) - 3` can
    /// shrink below a sub-expression's floor; the resolver clamps the final
    /// size at zero.
    pub fn resolve(
        &self,
        container: i32,
        location: i32,
        auto_size: Option<i32>,
        tree: &ElementTree,
    ) -> Result<i32, LayoutError> {
        let size = self.measure(container, location, tree)?;
        Ok(match auto_size {
            Some(hint) if hint > size => hint,
            _ => size,
        })
    }

    fn measure(&self, container: i32, location: i32, tree: &ElementTree) -> Result<i32, LayoutError> {
        Ok(match self {
            Dim::Combine(left, right, op) => op.apply(
                left.measure(container, location, tree)?,
                right.measure(container, location, tree)?,
            ),
            Dim::Percent {
                from_remaining: false,
                ..
            } => self.anchor(container, tree)?,
            Dim::Fill(_)
            | Dim::Percent {
                from_remaining: true,
                ..
            } => self.anchor(container.saturating_sub(location), tree)?.max(0),
            Dim::Absolute(_) | Dim::Relative { .. } => self.anchor(container, tree)?.max(0),
        })
    }

    /// Collect every element this expression reads, recursing into `Combine`.
    pub fn collect_references(&self, out: &mut Vec<ElementId>) {
        match self {
            Dim::Relative { target, .. } => out.push(*target),
            Dim::Combine(left, right, _) => {
                left.collect_references(out);
                right.collect_references(out);
            }
            Dim::Absolute(_) | Dim::Fill(_) | Dim::Percent { .. } => {}
        }
    }
}

impl Add for Dim {
    type Output = Dim;

    fn add(self, rhs: Dim) -> Dim {
        Dim::Combine(Box::new(self), Box::new(rhs), Op::Add)
    }
}

impl Sub for Dim {
    type Output = Dim;

    fn sub(self, rhs: Dim) -> Dim {
        Dim::Combine(Box::new(self), Box::new(rhs), Op::Subtract)
    }
}

impl Add<i32> for Dim {
    type Output = Dim;

    fn add(self, rhs: i32) -> Dim {
        self + Dim::Absolute(rhs)
    }
}

impl Sub<i32> for Dim {
    type Output = Dim;

    fn sub(self, rhs: i32) -> Dim {
        self - Dim::Absolute(rhs)
    }
}
